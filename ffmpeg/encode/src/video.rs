/*!
    Video encoder implementation.
*/

use ffmpeg_next::{
    Dictionary,
    codec::{self, encoder::Video as VideoEncoderFFmpeg},
    ffi,
};

use ffmpeg_types::{Error, Packet, Rational, Result, VideoFrame};

use ffmpeg_native::convert::{
    codec_id_to_native, duration_from_native, error_from_native, pixel_to_native,
    pts_from_native, rational_to_native,
};
use ffmpeg_native::frame::to_native;

use crate::config::{RateControl, VideoEncoderConfig};

/**
    Video encoder.

    Encodes raw video frames into compressed packets. Frames must match the
    configured size and pixel format; use `ffmpeg-transform` to convert them
    first.
*/
pub struct VideoEncoder {
    encoder: VideoEncoderFFmpeg,
    config: VideoEncoderConfig,
    encoder_name: String,
    time_base: Rational,
    frame_count: u64,
    last_pts: Option<i64>,
    /// Packets drained before a failed send, returned by the next call.
    pending: Vec<Packet>,
}

impl VideoEncoder {
    /**
        Find an encoder for the configured codec and open it.
    */
    pub fn new(config: VideoEncoderConfig) -> Result<Self> {
        ffmpeg_next::init().map_err(error_from_native)?;

        if config.width == 0 || config.height == 0 {
            return Err(Error::invalid_data("encoder dimensions must be non-zero"));
        }
        if !config.frame_rate.is_valid() || config.frame_rate.to_f64() <= 0.0 {
            return Err(Error::invalid_data(format!(
                "invalid frame rate {}",
                config.frame_rate
            )));
        }

        let codec = ffmpeg_next::encoder::find(codec_id_to_native(config.codec)).ok_or_else(|| {
            Error::unsupported_format(format!("no encoder available for {}", config.codec.name()))
        })?;
        let encoder_name = codec.name().to_string();

        let mut encoder = codec::context::Context::new_with_codec(codec)
            .encoder()
            .video()
            .map_err(error_from_native)?;

        let time_base = config.time_base();
        encoder.set_width(config.width);
        encoder.set_height(config.height);
        encoder.set_format(pixel_to_native(config.pixel_format)?);
        encoder.set_frame_rate(Some(rational_to_native(config.frame_rate)));
        encoder.set_time_base(rational_to_native(time_base));
        encoder.set_gop(config.gop_size());
        if let Some(frames) = config.max_b_frames {
            encoder.set_max_b_frames(frames as usize);
        }

        let mut opts = Dictionary::new();
        opts.set("preset", config.preset.as_str());

        match config.rate_control {
            RateControl::Crf(crf) => {
                opts.set("crf", &crf.to_string());
            }
            RateControl::Cbr(bitrate) => {
                encoder.set_bit_rate(bitrate as usize);
                encoder.set_max_bit_rate(bitrate as usize);
                unsafe {
                    (*encoder.as_mut_ptr()).rc_buffer_size =
                        i32::try_from(bitrate).unwrap_or(i32::MAX);
                }
            }
            RateControl::Vbr(bitrate) => {
                encoder.set_bit_rate(bitrate as usize);
            }
        }

        let encoder = encoder
            .open_with(opts)
            .map_err(|e| Error::codec(format!("failed to open encoder {encoder_name}: {e}")))?;

        tracing::debug!(
            encoder = %encoder_name,
            width = config.width,
            height = config.height,
            frame_rate = %config.frame_rate,
            preset = %config.preset,
            "opened video encoder"
        );

        Ok(Self {
            encoder,
            config,
            encoder_name,
            time_base,
            frame_count: 0,
            last_pts: None,
            pending: Vec::new(),
        })
    }

    /**
        Name of the native encoder implementation, e.g. "libx264".
    */
    pub fn encoder_name(&self) -> &str {
        &self.encoder_name
    }

    pub fn config(&self) -> &VideoEncoderConfig {
        &self.config
    }

    /**
        Get the time base for encoded packets.
    */
    pub fn time_base(&self) -> Rational {
        self.time_base
    }

    /**
        Number of frames submitted so far.
    */
    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    /**
        Encode a video frame, returning encoded packets.

        The frame's pts is rescaled from its own time base into the
        encoder's. Frames without a pts, and frames whose pts would not move
        forward, get the tick after the previous frame. May return zero, one,
        or multiple packets depending on encoder buffering.
    */
    pub fn encode(&mut self, frame: &VideoFrame) -> Result<Vec<Packet>> {
        if frame.width != self.config.width || frame.height != self.config.height {
            return Err(Error::invalid_data(format!(
                "frame dimensions {}x{} don't match encoder {}x{}",
                frame.width, frame.height, self.config.width, self.config.height
            )));
        }
        if frame.format != self.config.pixel_format {
            return Err(Error::invalid_data(format!(
                "frame format {} doesn't match encoder input {}",
                frame.format, self.config.pixel_format
            )));
        }

        let mut native = to_native(frame)?;
        let pts = self.next_pts(frame);
        native.set_pts(Some(pts));

        let mut drained = Vec::new();
        match self.encoder.send_frame(&native) {
            Ok(()) => {}
            Err(ffmpeg_next::Error::Other { errno }) if errno == ffi::EAGAIN => {
                drained = self.receive_packets()?;
                if let Err(e) = self.encoder.send_frame(&native) {
                    self.pending.extend(drained);
                    return Err(error_from_native(e));
                }
            }
            Err(e) => return Err(error_from_native(e)),
        }
        self.last_pts = Some(pts);
        self.frame_count += 1;

        let mut packets = std::mem::take(&mut self.pending);
        packets.extend(drained);
        packets.extend(self.receive_packets()?);
        Ok(packets)
    }

    fn next_pts(&self, frame: &VideoFrame) -> i64 {
        let next = self.last_pts.map_or(0, |last| last + 1);
        let Some(pts) = frame.pts else {
            return next;
        };

        let rescaled = if frame.time_base.is_valid() {
            pts.rescale(frame.time_base, self.time_base).0
        } else {
            pts.0
        };
        if rescaled < next {
            tracing::trace!(pts = rescaled, next, "pts does not advance, using next tick");
        }
        rescaled.max(next)
    }

    /**
        Flush the encoder to get any remaining buffered packets.

        Call this at end of stream.
    */
    pub fn flush(&mut self) -> Result<Vec<Packet>> {
        match self.encoder.send_eof() {
            Ok(()) | Err(ffmpeg_next::Error::Eof) => {}
            Err(e) => return Err(error_from_native(e)),
        }

        let mut packets = std::mem::take(&mut self.pending);
        packets.extend(self.receive_packets()?);
        Ok(packets)
    }

    fn receive_packets(&mut self) -> Result<Vec<Packet>> {
        let mut packets = Vec::new();
        let mut encoded = ffmpeg_next::Packet::empty();

        loop {
            match self.encoder.receive_packet(&mut encoded) {
                Ok(()) => packets.push(self.convert_packet(&encoded)),
                Err(ffmpeg_next::Error::Other { errno }) if errno == ffi::EAGAIN => break,
                Err(ffmpeg_next::Error::Eof) => break,
                Err(e) => return Err(error_from_native(e)),
            }
        }

        Ok(packets)
    }

    fn convert_packet(&self, pkt: &ffmpeg_next::Packet) -> Packet {
        Packet {
            data: pkt.data().map(|d| d.to_vec()).unwrap_or_default(),
            pts: pts_from_native(pkt.pts()),
            dts: pts_from_native(pkt.dts()),
            duration: duration_from_native(pkt.duration()),
            time_base: self.time_base,
            is_keyframe: pkt.is_key(),
            stream_index: 0,
        }
    }
}

impl std::fmt::Debug for VideoEncoder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VideoEncoder")
            .field("encoder", &self.encoder_name)
            .field("width", &self.config.width)
            .field("height", &self.config.height)
            .field("time_base", &self.time_base)
            .field("frame_count", &self.frame_count)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ffmpeg_types::{CodecId, PixelFormat, Pts};

    fn frame(index: u8) -> VideoFrame {
        let size = PixelFormat::Yuv420p.buffer_size(16, 16).unwrap();
        VideoFrame::new(
            vec![index * 30; size],
            16,
            16,
            PixelFormat::Yuv420p,
            None,
            Rational::new(1, 25),
        )
    }

    fn mpeg4_encoder() -> VideoEncoder {
        let config = VideoEncoderConfig::new(CodecId::Mpeg4, 16, 16, Rational::fps(25))
            .with_keyframe_interval(10)
            .with_max_b_frames(0);
        VideoEncoder::new(config).unwrap()
    }

    #[test]
    fn encodes_frames_with_counter_pts() {
        let mut encoder = mpeg4_encoder();
        assert_eq!(encoder.encoder_name(), "mpeg4");
        assert_eq!(encoder.time_base(), Rational::new(1, 25));

        let mut packets = Vec::new();
        for index in 0..3 {
            packets.extend(encoder.encode(&frame(index)).unwrap());
        }
        packets.extend(encoder.flush().unwrap());

        assert_eq!(encoder.frame_count(), 3);
        assert_eq!(packets.len(), 3);
        assert!(packets[0].is_keyframe);
        assert!(packets.iter().all(|p| !p.is_empty()));
        let pts: Vec<_> = packets.iter().map(|p| p.pts).collect();
        assert_eq!(pts, vec![Some(Pts(0)), Some(Pts(1)), Some(Pts(2))]);
    }

    #[test]
    fn frame_pts_takes_precedence() {
        let mut encoder = mpeg4_encoder();
        let mut packets = encoder
            .encode(&frame(0).with_pts(Pts(7), Rational::new(1, 25)))
            .unwrap();
        packets.extend(encoder.flush().unwrap());
        assert_eq!(packets[0].pts, Some(Pts(7)));
    }

    #[test]
    fn rejects_mismatched_frames() {
        let mut encoder = mpeg4_encoder();

        let mut small = frame(0);
        small.width = 8;
        assert!(encoder.encode(&small).is_err());

        let rgb = VideoFrame::new(
            vec![0; 16 * 16 * 3],
            16,
            16,
            PixelFormat::Rgb24,
            None,
            Rational::new(1, 25),
        );
        assert!(encoder.encode(&rgb).is_err());
    }

    #[test]
    fn rejects_invalid_config() {
        assert!(VideoEncoder::new(VideoEncoderConfig::h264(0, 16, Rational::fps(25))).is_err());
        assert!(VideoEncoder::new(VideoEncoderConfig::h264(16, 16, Rational::new(0, 1))).is_err());
    }

    #[test]
    fn frame_pts_is_rescaled_into_encoder_time_base() {
        let mut encoder = mpeg4_encoder();
        let millis = Rational::new(1, 1000);

        let mut packets = Vec::new();
        for ms in [0, 40, 80, 120] {
            packets.extend(encoder.encode(&frame(0).with_pts(Pts(ms), millis)).unwrap());
        }
        packets.extend(encoder.flush().unwrap());

        let pts: Vec<_> = packets.iter().map(|p| p.pts).collect();
        assert_eq!(pts, vec![Some(Pts(0)), Some(Pts(1)), Some(Pts(2)), Some(Pts(3))]);
    }

    #[test]
    fn mixed_pts_stays_monotonic() {
        let mut encoder = mpeg4_encoder();
        let tb = Rational::new(1, 25);

        let mut packets = Vec::new();
        packets.extend(encoder.encode(&frame(0).with_pts(Pts(1), tb)).unwrap());
        packets.extend(encoder.encode(&frame(1)).unwrap());
        packets.extend(encoder.encode(&frame(2).with_pts(Pts(1), tb)).unwrap());
        packets.extend(encoder.flush().unwrap());

        let pts: Vec<_> = packets.iter().map(|p| p.pts).collect();
        assert_eq!(pts, vec![Some(Pts(1)), Some(Pts(2)), Some(Pts(3))]);
    }

    #[test]
    fn failed_send_does_not_count() {
        let mut encoder = mpeg4_encoder();
        encoder.encode(&frame(0)).unwrap();
        encoder.flush().unwrap();

        assert!(encoder.encode(&frame(1)).is_err());
        assert_eq!(encoder.frame_count(), 1);
    }
}
