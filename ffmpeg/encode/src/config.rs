/*!
    Encoder configuration types.
*/

use std::str::FromStr;

use ffmpeg_types::{CodecId, Error, PixelFormat, Rational};

/**
    Encoder speed preset.

    Slower presets produce better compression (smaller files at same quality)
    but take longer to encode.
*/
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum EncoderPreset {
    Ultrafast,
    Superfast,
    Veryfast,
    Faster,
    Fast,
    #[default]
    Medium,
    Slow,
    Slower,
    Veryslow,
}

impl EncoderPreset {
    pub const ALL: [Self; 9] = [
        Self::Ultrafast,
        Self::Superfast,
        Self::Veryfast,
        Self::Faster,
        Self::Fast,
        Self::Medium,
        Self::Slow,
        Self::Slower,
        Self::Veryslow,
    ];

    /**
        Get the native preset string.
    */
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Ultrafast => "ultrafast",
            Self::Superfast => "superfast",
            Self::Veryfast => "veryfast",
            Self::Faster => "faster",
            Self::Fast => "fast",
            Self::Medium => "medium",
            Self::Slow => "slow",
            Self::Slower => "slower",
            Self::Veryslow => "veryslow",
        }
    }
}

impl FromStr for EncoderPreset {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|preset| preset.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| Error::invalid_data(format!("unknown encoder preset: {s}")))
    }
}

impl std::fmt::Display for EncoderPreset {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/**
    Rate control mode for video encoding.
*/
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum RateControl {
    /**
        Constant Rate Factor - target constant quality.
        Lower values = higher quality. Range 0-51, typical 18-28.
    */
    Crf(u8),
    /**
        Constant Bitrate in bits per second.
    */
    Cbr(u64),
    /**
        Variable Bitrate - target average bitrate in bits per second.
    */
    Vbr(u64),
}

impl Default for RateControl {
    fn default() -> Self {
        Self::Crf(23)
    }
}

/**
    Configuration for video encoding.
*/
#[derive(Clone, Debug)]
pub struct VideoEncoderConfig {
    pub codec: CodecId,
    pub width: u32,
    pub height: u32,
    pub frame_rate: Rational,
    /// Expected input pixel format.
    pub pixel_format: PixelFormat,
    pub rate_control: RateControl,
    pub preset: EncoderPreset,
    /// Keyframe interval in frames (None = two seconds of frames).
    pub keyframe_interval: Option<u32>,
    /// Maximum number of consecutive B-frames (None = encoder default).
    pub max_b_frames: Option<u32>,
}

impl VideoEncoderConfig {
    pub fn new(codec: CodecId, width: u32, height: u32, frame_rate: Rational) -> Self {
        Self {
            codec,
            width,
            height,
            frame_rate,
            pixel_format: PixelFormat::Yuv420p,
            rate_control: RateControl::default(),
            preset: EncoderPreset::default(),
            keyframe_interval: None,
            max_b_frames: None,
        }
    }

    /**
        Create configuration for H.264 encoding.
    */
    pub fn h264(width: u32, height: u32, frame_rate: Rational) -> Self {
        Self::new(CodecId::H264, width, height, frame_rate)
    }

    /**
        Create configuration for H.265/HEVC encoding.
    */
    pub fn h265(width: u32, height: u32, frame_rate: Rational) -> Self {
        Self::new(CodecId::H265, width, height, frame_rate)
    }

    pub fn with_rate_control(mut self, rate_control: RateControl) -> Self {
        self.rate_control = rate_control;
        self
    }

    /**
        Set constant bitrate in bits per second.
    */
    pub fn with_bitrate(mut self, bitrate: u64) -> Self {
        self.rate_control = RateControl::Cbr(bitrate);
        self
    }

    /**
        Set CRF quality (0-51, lower is better, typical 18-28).
    */
    pub fn with_crf(mut self, crf: u8) -> Self {
        self.rate_control = RateControl::Crf(crf.min(51));
        self
    }

    pub fn with_preset(mut self, preset: EncoderPreset) -> Self {
        self.preset = preset;
        self
    }

    pub fn with_keyframe_interval(mut self, frames: u32) -> Self {
        self.keyframe_interval = Some(frames);
        self
    }

    pub fn with_max_b_frames(mut self, frames: u32) -> Self {
        self.max_b_frames = Some(frames);
        self
    }

    pub fn with_pixel_format(mut self, format: PixelFormat) -> Self {
        self.pixel_format = format;
        self
    }

    /**
        Keyframe interval actually used: the configured one, or two seconds
        worth of frames (at least one).
    */
    pub fn gop_size(&self) -> u32 {
        self.keyframe_interval
            .unwrap_or_else(|| (self.frame_rate.to_f64() * 2.0).round().max(1.0) as u32)
    }

    /**
        Time base of encoded packets, the inverse of the frame rate.
    */
    pub fn time_base(&self) -> Rational {
        self.frame_rate.invert()
    }
}
