/*!
    Video frame transformation.
*/

use ffmpeg_next::{
    software::scaling::{context::Context as ScalerContext, flag::Flags as ScalerFlags},
    util::frame::video::Video as VideoFrameFFmpeg,
};

use ffmpeg_types::{Error, PixelFormat, Result, VideoFrame};

use ffmpeg_native::convert::pixel_to_native;
use ffmpeg_native::frame::{copy_from_native, to_native};

/**
    Scaling algorithm for video resizing.
*/
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ScalingAlgorithm {
    /// Nearest neighbor, fastest.
    Nearest,
    #[default]
    Bilinear,
    Bicubic,
    /// Lanczos resampling, slowest and sharpest.
    Lanczos,
}

impl ScalingAlgorithm {
    fn flags(self) -> ScalerFlags {
        match self {
            Self::Nearest => ScalerFlags::POINT,
            Self::Bilinear => ScalerFlags::BILINEAR,
            Self::Bicubic => ScalerFlags::BICUBIC,
            Self::Lanczos => ScalerFlags::LANCZOS,
        }
    }
}

/**
    Target size, format and algorithm of a [`VideoTransform`].
*/
#[derive(Clone, Debug)]
pub struct VideoTransformConfig {
    pub width: u32,
    pub height: u32,
    pub format: PixelFormat,
    pub algorithm: ScalingAlgorithm,
}

impl VideoTransformConfig {
    pub fn new(width: u32, height: u32, format: PixelFormat) -> Self {
        Self {
            width,
            height,
            format,
            algorithm: ScalingAlgorithm::default(),
        }
    }

    /**
        Packed RGB output, the layout image encoders expect.
    */
    pub fn to_rgb24(width: u32, height: u32) -> Self {
        Self::new(width, height, PixelFormat::Rgb24)
    }

    /**
        Planar 4:2:0 output, the layout most video encoders expect.
    */
    pub fn to_yuv420p(width: u32, height: u32) -> Self {
        Self::new(width, height, PixelFormat::Yuv420p)
    }

    pub fn with_algorithm(mut self, algorithm: ScalingAlgorithm) -> Self {
        self.algorithm = algorithm;
        self
    }
}

/**
    Video frame transformer.

    Converts frames to the configured size and pixel format. The scaler
    context is created on first use and recreated whenever the input
    shape (width, height or format) changes.
*/
pub struct VideoTransform {
    config: VideoTransformConfig,
    scaler: Option<Scaler>,
}

struct Scaler {
    context: ScalerContext,
    src_width: u32,
    src_height: u32,
    src_format: PixelFormat,
}

impl Scaler {
    fn matches(&self, frame: &VideoFrame) -> bool {
        self.src_width == frame.width
            && self.src_height == frame.height
            && self.src_format == frame.format
    }
}

impl VideoTransform {
    /**
        Create a new video transformer. Fails on a zero sized or hardware
        target format.
    */
    pub fn new(config: VideoTransformConfig) -> Result<Self> {
        if config.width == 0 || config.height == 0 {
            return Err(Error::invalid_data("transform target has zero dimensions"));
        }
        if config.format.is_hardware() {
            return Err(Error::unsupported_format(format!(
                "cannot transform into hardware format {}",
                config.format
            )));
        }
        Ok(Self {
            config,
            scaler: None,
        })
    }

    pub fn config(&self) -> &VideoTransformConfig {
        &self.config
    }

    /**
        Transform a video frame to the target size and format.

        Timing (pts and time base) is carried over from the input.
    */
    pub fn transform(&mut self, frame: &VideoFrame) -> Result<VideoFrame> {
        frame.validate()?;

        let scaler = match self.scaler.take() {
            Some(scaler) if scaler.matches(frame) => scaler,
            _ => self.create_scaler(frame)?,
        };
        let scaler = self.scaler.insert(scaler);

        let src_frame = to_native(frame)?;
        let mut dst_frame = VideoFrameFFmpeg::new(
            pixel_to_native(self.config.format)?,
            self.config.width,
            self.config.height,
        );

        scaler
            .context
            .run(&src_frame, &mut dst_frame)
            .map_err(|e| Error::codec(format!("scaling failed: {e}")))?;

        let data = copy_from_native(&dst_frame, self.config.format)?;
        Ok(VideoFrame::new(
            data,
            self.config.width,
            self.config.height,
            self.config.format,
            frame.pts,
            frame.time_base,
        ))
    }

    fn create_scaler(&self, frame: &VideoFrame) -> Result<Scaler> {
        let context = ScalerContext::get(
            pixel_to_native(frame.format)?,
            frame.width,
            frame.height,
            pixel_to_native(self.config.format)?,
            self.config.width,
            self.config.height,
            self.config.algorithm.flags(),
        )
        .map_err(|e| Error::codec(format!("failed to create scaler: {e}")))?;

        tracing::debug!(
            from = %format_args!("{}x{} {}", frame.width, frame.height, frame.format),
            to = %format_args!("{}x{} {}", self.config.width, self.config.height, self.config.format),
            "created scaler"
        );

        Ok(Scaler {
            context,
            src_width: frame.width,
            src_height: frame.height,
            src_format: frame.format,
        })
    }
}

impl std::fmt::Debug for VideoTransform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VideoTransform")
            .field("config", &self.config)
            .field("initialized", &self.scaler.is_some())
            .finish()
    }
}
