/*!
    Stream information types.
*/

use std::time::Duration;

use crate::{CodecId, PixelFormat, Rational};

/**
    Information about a video stream.
*/
#[derive(Clone, Debug)]
pub struct VideoStreamInfo {
    /// Index of the stream in its container.
    pub index: usize,
    /// Frame width in pixels.
    pub width: u32,
    /// Frame height in pixels.
    pub height: u32,
    /// Pixel format (None if the native format has no counterpart here).
    pub pixel_format: Option<PixelFormat>,
    /// Frame rate (may be approximate or unavailable).
    pub frame_rate: Option<Rational>,
    /// Time base for timestamps.
    pub time_base: Rational,
    /// Total duration (may be unavailable for some streams).
    pub duration: Option<Duration>,
    /// Codec used, if it is one we know.
    pub codec_id: Option<CodecId>,
    /// Native codec name (always available, e.g. "h264").
    pub codec_name: String,
    /// Bitrate in bits per second (if known).
    pub bitrate: Option<u64>,
    /// Number of frames, if the container records it.
    pub frame_count: Option<u64>,
}

impl VideoStreamInfo {
    /**
        Returns the aspect ratio as a float.
    */
    pub fn aspect_ratio(&self) -> f64 {
        self.width as f64 / self.height as f64
    }

    /**
        Returns the frame rate as fps, if available.
    */
    pub fn fps(&self) -> Option<f64> {
        self.frame_rate.map(|r| r.to_f64())
    }
}

/**
    Combined information about a media source.
*/
#[derive(Clone, Debug, Default)]
pub struct MediaInfo {
    /// Short name of the container format (e.g. "mov,mp4,m4a,3gp,3g2,mj2").
    pub format_name: String,
    /// Total duration of the media (may be unavailable).
    pub duration: Option<Duration>,
    /// Best video stream, if any.
    pub video: Option<VideoStreamInfo>,
    /// Number of streams in the container.
    pub stream_count: usize,
}

impl MediaInfo {
    pub fn has_video(&self) -> bool {
        self.video.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn info() -> VideoStreamInfo {
        VideoStreamInfo {
            index: 0,
            width: 1920,
            height: 1080,
            pixel_format: Some(PixelFormat::Yuv420p),
            frame_rate: Some(Rational::new(24000, 1001)),
            time_base: Rational::new(1, 90000),
            duration: Some(Duration::from_secs(60)),
            codec_id: Some(CodecId::H264),
            codec_name: "h264".to_string(),
            bitrate: None,
            frame_count: Some(1440),
        }
    }

    #[test]
    fn aspect_ratio_and_fps() {
        let info = info();
        assert!((info.aspect_ratio() - 16.0 / 9.0).abs() < 0.01);
        assert!((info.fps().unwrap() - 23.976).abs() < 0.001);
    }

    #[test]
    fn media_info_has_video() {
        let mut media = MediaInfo::default();
        assert!(!media.has_video());
        media.video = Some(info());
        assert!(media.has_video());
    }
}
