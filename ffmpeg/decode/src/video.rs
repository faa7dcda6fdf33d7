/*!
    Video decoder implementation.
*/

use ffmpeg_next::{
    codec::{self, decoder::Video as VideoDecoderFFmpeg},
    ffi,
    util::frame::video::Video as VideoFrameFFmpeg,
};

use ffmpeg_source::CodecConfig;
use ffmpeg_types::{
    HwDeviceType, Packet, PixelFormat, Rational, Result, VideoFrame, decoded_pixel_format,
};

use ffmpeg_native::convert::{error_from_native, pixel_from_native, system_fallback};
use ffmpeg_native::frame::from_native;

use crate::config::VideoDecoderConfig;
use crate::hw::{HwDeviceContext, available_hw_devices, is_hw_frame, transfer_hw_frame};
use crate::normalize::FormatNormalizer;

/**
    Video decoder.

    Decodes video packets into frames in system memory. When configured with
    a hardware device, decoding happens on the device and frames are
    downloaded before they are returned. Frames in a native format that has
    no [`PixelFormat`] counterpart are converted to the closest one that does.
*/
pub struct VideoDecoder {
    decoder: VideoDecoderFFmpeg,
    codec_name: &'static str,
    time_base: Rational,
    normalizer: FormatNormalizer,
    /**
        Kept alive to prevent the hardware device context from being dropped
        while the decoder is using it. Not accessed directly after initialization.
    */
    hw_context: Option<HwDeviceContext>,
}

impl VideoDecoder {
    /**
        Create a new video decoder from codec configuration.

        # Arguments

        * `codec_config` - Codec configuration from the source
        * `time_base` - Time base for the video stream
        * `config` - Decoder configuration (hardware acceleration, etc.)

        A hardware device that fails to open is logged and decoding falls
        back to software.
    */
    pub fn new(
        codec_config: CodecConfig,
        time_base: Rational,
        config: VideoDecoderConfig,
    ) -> Result<Self> {
        ffmpeg_next::init().map_err(error_from_native)?;

        let codec_name = codec_config.codec_name();
        let decoder_ctx = codec::context::Context::from_parameters(codec_config.into_parameters())
            .map_err(error_from_native)?;

        let mut decoder = decoder_ctx.decoder().video().map_err(error_from_native)?;

        let hw_context = if config.prefer_hw {
            let device = config
                .hw_device
                .or_else(|| HwDeviceType::preferred(&available_hw_devices()));
            match device.map(HwDeviceContext::create) {
                Some(Ok(hw_ctx)) => {
                    unsafe {
                        (*decoder.as_mut_ptr()).hw_device_ctx = hw_ctx.create_ref();
                    }
                    tracing::debug!(device = %hw_ctx.device(), codec = codec_name, "hardware decoding enabled");
                    Some(hw_ctx)
                }
                Some(Err(e)) => {
                    tracing::warn!(error = %e, ?device, "hardware device unavailable, decoding in software");
                    None
                }
                None => {
                    tracing::warn!("no hardware devices available, decoding in software");
                    None
                }
            }
        } else {
            None
        };

        Ok(Self {
            decoder,
            codec_name,
            time_base,
            normalizer: FormatNormalizer::default(),
            hw_context,
        })
    }

    /**
        Short name of the stream's codec, e.g. "h264".
    */
    pub fn codec_name(&self) -> &'static str {
        self.codec_name
    }

    /**
        Coded frame size as (width, height).
    */
    pub fn frame_size(&self) -> (u32, u32) {
        (self.decoder.width(), self.decoder.height())
    }

    /**
        Pixel format frames come out of the decoder in.

        With a hardware device this is the device's surface format, which is
        what a scaler would see before the frames are downloaded. A native
        format without a counterpart reports the format frames are converted to.
    */
    pub fn pixel_format(&self) -> Option<PixelFormat> {
        let native = self.decoder.format();
        let software = pixel_from_native(native).or_else(|| system_fallback(native))?;
        decoded_pixel_format(self.hw_device(), software)
    }

    pub fn hw_device(&self) -> Option<HwDeviceType> {
        self.hw_context.as_ref().map(HwDeviceContext::device)
    }

    /**
        Check if hardware acceleration is active.
    */
    pub fn is_hw_accelerated(&self) -> bool {
        self.hw_context.is_some()
    }

    pub fn time_base(&self) -> Rational {
        self.time_base
    }

    /**
        Decode a packet, returning decoded frames.

        May return zero, one, or multiple frames depending on codec buffering.
    */
    pub fn decode(&mut self, packet: &Packet) -> Result<Vec<VideoFrame>> {
        let mut ffmpeg_pkt = if packet.data.is_empty() {
            ffmpeg_next::Packet::empty()
        } else {
            ffmpeg_next::Packet::copy(&packet.data)
        };
        ffmpeg_pkt.set_pts(packet.pts.map(|pts| pts.0));
        ffmpeg_pkt.set_dts(packet.dts.map(|dts| dts.0));
        ffmpeg_pkt.set_duration(packet.duration.0);

        // EAGAIN means the decoder is full: drain it, then retry once
        match self.decoder.send_packet(&ffmpeg_pkt) {
            Ok(()) => {}
            Err(ffmpeg_next::Error::Other { errno }) if errno == ffi::EAGAIN => {
                let mut all_frames = self.receive_frames()?;
                match self.decoder.send_packet(&ffmpeg_pkt) {
                    Ok(()) => all_frames.extend(self.receive_frames()?),
                    Err(ffmpeg_next::Error::Other { errno }) if errno == ffi::EAGAIN => {
                        tracing::warn!("decoder still full after draining, packet dropped");
                    }
                    Err(e) => return Err(error_from_native(e)),
                }
                return Ok(all_frames);
            }
            Err(e) => return Err(error_from_native(e)),
        }

        self.receive_frames()
    }

    /**
        Flush the decoder to get any remaining buffered frames.

        Call this at end of stream.
    */
    pub fn flush(&mut self) -> Result<Vec<VideoFrame>> {
        let mut all_frames = self.receive_frames()?;

        match self.decoder.send_eof() {
            Ok(()) | Err(ffmpeg_next::Error::Eof) => {}
            Err(ffmpeg_next::Error::Other { errno }) if errno == ffi::EAGAIN => {
                all_frames.extend(self.receive_frames()?);
                if let Err(e) = self.decoder.send_eof() {
                    tracing::debug!(error = %e, "second end of stream signal failed");
                }
            }
            Err(e) => return Err(error_from_native(e)),
        }

        all_frames.extend(self.receive_frames()?);
        Ok(all_frames)
    }

    /**
        Reset the decoder after a seek, discarding buffered frames.
    */
    pub fn reset(&mut self) {
        self.decoder.flush();
    }

    fn receive_frames(&mut self) -> Result<Vec<VideoFrame>> {
        let mut frames = Vec::new();
        let mut decoded_frame = VideoFrameFFmpeg::empty();

        loop {
            match self.decoder.receive_frame(&mut decoded_frame) {
                Ok(()) => frames.push(self.convert_frame(&decoded_frame)?),
                Err(ffmpeg_next::Error::Other { errno }) if errno == ffi::EAGAIN => break,
                Err(ffmpeg_next::Error::Eof) => break,
                Err(e) => {
                    // Keep what was decoded before the failure
                    if frames.is_empty() {
                        return Err(error_from_native(e));
                    }
                    tracing::warn!(error = %e, "decoder error after {} frames", frames.len());
                    break;
                }
            }
        }

        Ok(frames)
    }

    fn convert_frame(&mut self, frame: &VideoFrameFFmpeg) -> Result<VideoFrame> {
        let transferred;
        let frame = if is_hw_frame(frame) {
            transferred = transfer_hw_frame(frame)?;
            &transferred
        } else {
            frame
        };

        let has_layout = pixel_from_native(frame.format()).is_some_and(|f| !f.is_hardware());
        if has_layout {
            from_native(frame, self.time_base)
        } else {
            self.normalizer.convert(frame, self.time_base)
        }
    }
}

impl std::fmt::Debug for VideoDecoder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VideoDecoder")
            .field("codec", &self.codec_name)
            .field("time_base", &self.time_base)
            .field("hw_device", &self.hw_device())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ffmpeg_source::Source;
    use ffmpeg_source::test_media::{write_y4m, write_y4m_as};
    use ffmpeg_types::Pts;
    use std::path::Path;

    fn decode_all(source: &mut Source, decoder: &mut VideoDecoder) -> Vec<VideoFrame> {
        let mut frames = Vec::new();
        while let Some(packet) = source.next_packet().unwrap() {
            frames.extend(decoder.decode(&packet).unwrap());
        }
        frames.extend(decoder.flush().unwrap());
        frames
    }

    fn open_with(path: &Path, config: VideoDecoderConfig) -> (Source, VideoDecoder) {
        let source = Source::open(path.to_str().unwrap()).unwrap();
        let decoder = VideoDecoder::new(
            source.video_codec_config().unwrap().clone(),
            source.video_time_base().unwrap(),
            config,
        )
        .unwrap();
        (source, decoder)
    }

    fn open(dir: &Path, frames: usize) -> (Source, VideoDecoder) {
        open_with(&write_y4m(dir, 8, 6, frames), VideoDecoderConfig::new())
    }

    #[test]
    fn decoder_properties() {
        let dir = tempfile::tempdir().unwrap();
        let (_source, decoder) = open(dir.path(), 1);
        assert_eq!(decoder.codec_name(), "rawvideo");
        assert_eq!(decoder.frame_size(), (8, 6));
        assert_eq!(decoder.pixel_format(), Some(PixelFormat::Yuv420p));
        assert!(!decoder.is_hw_accelerated());
        assert_eq!(decoder.time_base(), Rational::new(1, 25));
    }

    #[test]
    fn decodes_every_frame() {
        let dir = tempfile::tempdir().unwrap();
        let (mut source, mut decoder) = open(dir.path(), 3);
        let frames = decode_all(&mut source, &mut decoder);

        assert_eq!(frames.len(), 3);
        for (index, frame) in frames.iter().enumerate() {
            assert_eq!(frame.format, PixelFormat::Yuv420p);
            assert_eq!((frame.width, frame.height), (8, 6));
            assert_eq!(frame.pts, Some(Pts(index as i64)));
            assert!(frame.validate().is_ok());
            assert!(frame.data.iter().all(|&b| b == (index * 40) as u8));
        }
    }

    #[test]
    fn reset_then_decode_again() {
        let dir = tempfile::tempdir().unwrap();
        let (mut source, mut decoder) = open(dir.path(), 2);
        let packet = source.next_packet().unwrap().unwrap();
        decoder.decode(&packet).unwrap();
        decoder.reset();
        let frames = decoder.decode(&packet).unwrap();
        assert!(frames.len() <= 1);
    }

    #[test]
    fn converts_formats_without_a_counterpart() {
        for colorspace in ["411", "422p10"] {
            let dir = tempfile::tempdir().unwrap();
            let path = write_y4m_as(dir.path(), colorspace, 8, 6, 2);
            let (mut source, mut decoder) = open_with(&path, VideoDecoderConfig::new());
            assert_eq!(decoder.pixel_format(), Some(PixelFormat::Yuv444p));

            let frames = decode_all(&mut source, &mut decoder);
            assert_eq!(frames.len(), 2, "{colorspace}");
            for (index, frame) in frames.iter().enumerate() {
                assert_eq!(frame.format, PixelFormat::Yuv444p);
                assert_eq!(frame.pts, Some(Pts(index as i64)));
                assert!(frame.validate().is_ok());
                let luma = &frame.data[..8 * 6];
                assert!(luma.iter().all(|&v| v.abs_diff((index * 40) as u8) <= 2));
            }
        }
    }

    #[test]
    fn unavailable_hardware_falls_back_to_software() {
        let available = available_hw_devices();
        let Some(missing) = HwDeviceType::ALL
            .into_iter()
            .find(|device| !available.contains(device))
        else {
            return;
        };

        let dir = tempfile::tempdir().unwrap();
        let path = write_y4m(dir.path(), 8, 6, 2);
        let (mut source, mut decoder) =
            open_with(&path, VideoDecoderConfig::with_hw_device(missing));

        assert!(!decoder.is_hw_accelerated());
        assert_eq!(decoder.hw_device(), None);
        assert_eq!(decoder.pixel_format(), Some(PixelFormat::Yuv420p));
        assert_eq!(decode_all(&mut source, &mut decoder).len(), 2);
    }
}
