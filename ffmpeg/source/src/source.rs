/*!
    Media source implementation.
*/

use std::time::Duration;

use ffmpeg_next::{format::context::Input as InputContext, media::Type};

use ffmpeg_types::{Error, MediaInfo, Packet, Rational, Result};

use ffmpeg_native::IoContext;
use ffmpeg_native::convert::{
    duration_from_native, error_from_native, pts_from_native, rational_from_native,
};

use crate::codec_config::CodecConfig;
use crate::probe::extract_media_info;

/**
    Open an input, reporting OS level failures (missing file, refused
    connection) as I/O errors.
*/
pub(crate) fn open_input(url: &str) -> Result<InputContext> {
    ffmpeg_next::init().map_err(error_from_native)?;

    ffmpeg_next::format::input(url).map_err(|e| match e {
        ffmpeg_next::Error::Other { errno } => Error::Io(std::io::Error::from_raw_os_error(errno)),
        other => error_from_native(other),
    })
}

/**
    A media source that produces encoded video packets.

    Opens a local file or a network URL, selects the best video stream and
    demuxes its packets. Packets of other streams are skipped.
*/
pub struct Source {
    input: InputContext,
    url: String,
    media_info: MediaInfo,
    video_stream_index: Option<usize>,
    video_time_base: Option<Rational>,
    video_codec_config: Option<CodecConfig>,
    io: Option<IoContext>,
}

impl Source {
    /**
        Open a media file or URL.

        # Example

        ```ignore
        let source = Source::open("http://example.com/video.mp4")?;
        println!("Duration: {:?}", source.media_info().duration);
        ```
    */
    pub fn open(url: &str) -> Result<Self> {
        let input = open_input(url)?;
        let media_info = extract_media_info(&input);

        let (video_stream_index, video_time_base, video_codec_config) =
            match input.streams().best(Type::Video) {
                Some(stream) => (
                    Some(stream.index()),
                    Some(rational_from_native(stream.time_base())),
                    Some(CodecConfig::new(stream.parameters())),
                ),
                None => (None, None, None),
            };

        // SAFETY: `pb` belongs to the input context, which outlives the view.
        let io = unsafe { IoContext::from_raw((*input.as_ptr()).pb, false) };

        tracing::debug!(
            url,
            format = %media_info.format_name,
            video_stream = ?video_stream_index,
            "opened source"
        );

        Ok(Self {
            input,
            url: url.to_string(),
            media_info,
            video_stream_index,
            video_time_base,
            video_codec_config,
            io,
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn media_info(&self) -> &MediaInfo {
        &self.media_info
    }

    /**
        Short name of the container format, e.g. "mov,mp4,m4a,3gp,3g2,mj2".
    */
    pub fn format_name(&self) -> &str {
        &self.media_info.format_name
    }

    /**
        Container level metadata as key/value pairs, in container order.
    */
    pub fn metadata(&self) -> Vec<(String, String)> {
        self.input
            .metadata()
            .iter()
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect()
    }

    /**
        Borrowed view of the byte stream the demuxer reads from.

        Formats that do their own I/O (some devices and protocols) have none.
    */
    pub fn io_context(&self) -> Option<&IoContext> {
        self.io.as_ref()
    }

    /**
        Get the video codec configuration, if video is present.

        Pass this to `ffmpeg-decode` to create a video decoder.
    */
    pub fn video_codec_config(&self) -> Option<&CodecConfig> {
        self.video_codec_config.as_ref()
    }

    pub fn video_time_base(&self) -> Option<Rational> {
        self.video_time_base
    }

    pub fn has_video(&self) -> bool {
        self.video_stream_index.is_some()
    }

    /**
        Read the next video packet.

        Returns `Ok(None)` at end of stream. Read failures (a broken
        connection, corrupt data) are returned as errors.
    */
    pub fn next_packet(&mut self) -> Result<Option<Packet>> {
        let (Some(video_index), Some(time_base)) = (self.video_stream_index, self.video_time_base)
        else {
            return Ok(None);
        };

        loop {
            let mut packet = ffmpeg_next::Packet::empty();
            match packet.read(&mut self.input) {
                Ok(()) => {}
                Err(ffmpeg_next::Error::Eof) => return Ok(None),
                Err(e) => return Err(error_from_native(e)),
            }
            if packet.stream() != video_index {
                continue;
            }

            return Ok(Some(Packet {
                data: packet.data().map(|d| d.to_vec()).unwrap_or_default(),
                pts: pts_from_native(packet.pts()),
                dts: pts_from_native(packet.dts()),
                duration: duration_from_native(packet.duration()),
                time_base,
                is_keyframe: packet.is_key(),
                stream_index: video_index,
            }));
        }
    }

    /**
        Seek to a position in the media.

        Seeks to the nearest keyframe at or before the target position.
        Decoders should be reset afterwards.
    */
    pub fn seek(&mut self, position: Duration) -> Result<()> {
        let timestamp = (position.as_secs_f64() * ffmpeg_next::ffi::AV_TIME_BASE as f64) as i64;

        self.input
            .seek(timestamp, ..timestamp)
            .map_err(error_from_native)
    }
}

impl Iterator for Source {
    type Item = Result<Packet>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_packet().transpose()
    }
}

impl std::fmt::Debug for Source {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Source")
            .field("url", &self.url)
            .field("format", &self.media_info.format_name)
            .field("video_stream_index", &self.video_stream_index)
            .finish_non_exhaustive()
    }
}

/**
    Open a media file or URL.
*/
pub fn open(url: &str) -> Result<Source> {
    Source::open(url)
}
