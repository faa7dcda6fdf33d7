/*!
    Conversion of decoded frames whose native format has no [`PixelFormat`]
    counterpart (pal8, yuv411p, high bit depth 4:2:2, ...).
*/

use ffmpeg_next::{
    format::Pixel,
    software::scaling::{context::Context as ScalerContext, flag::Flags as ScalerFlags},
    util::frame::video::Video as VideoFrameFFmpeg,
};

use ffmpeg_types::{Error, PixelFormat, Rational, Result, VideoFrame};

use ffmpeg_native::convert::{pixel_to_native, system_fallback};
use ffmpeg_native::frame::from_native;

/**
    Converts software frames into their [`system_fallback`] format at the
    same size. The scaler is kept for as long as the input shape holds.
*/
#[derive(Default)]
pub(crate) struct FormatNormalizer {
    scaler: Option<Scaler>,
}

struct Scaler {
    context: ScalerContext,
    src_format: Pixel,
    width: u32,
    height: u32,
    dst_format: PixelFormat,
}

impl FormatNormalizer {
    pub fn convert(&mut self, frame: &VideoFrameFFmpeg, time_base: Rational) -> Result<VideoFrame> {
        let (src_format, width, height) = (frame.format(), frame.width(), frame.height());

        let scaler = match self.scaler.take() {
            Some(scaler)
                if scaler.src_format == src_format
                    && scaler.width == width
                    && scaler.height == height =>
            {
                scaler
            }
            _ => Self::create_scaler(src_format, width, height)?,
        };
        let scaler = self.scaler.insert(scaler);

        let mut converted =
            VideoFrameFFmpeg::new(pixel_to_native(scaler.dst_format)?, width, height);
        scaler
            .context
            .run(frame, &mut converted)
            .map_err(|e| Error::codec(format!("format conversion failed: {e}")))?;
        converted.set_pts(frame.pts());

        from_native(&converted, time_base)
    }

    fn create_scaler(src_format: Pixel, width: u32, height: u32) -> Result<Scaler> {
        let dst_format = system_fallback(src_format).ok_or_else(|| {
            Error::unsupported_format(format!("no system memory layout for {src_format:?}"))
        })?;
        let context = ScalerContext::get(
            src_format,
            width,
            height,
            pixel_to_native(dst_format)?,
            width,
            height,
            ScalerFlags::BICUBIC,
        )
        .map_err(|e| Error::codec(format!("failed to create format converter: {e}")))?;

        tracing::debug!(from = ?src_format, to = %dst_format, width, height, "converting decoded frames");

        Ok(Scaler {
            context,
            src_format,
            width,
            height,
            dst_format,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn converts_yuv411p_to_yuv444p() {
        let mut native = VideoFrameFFmpeg::new(Pixel::YUV411P, 8, 4);
        for plane in 0..3 {
            native.data_mut(plane).fill(128);
        }
        native.set_pts(Some(9));

        let mut normalizer = FormatNormalizer::default();
        let frame = normalizer.convert(&native, Rational::new(1, 25)).unwrap();
        assert_eq!(frame.format, PixelFormat::Yuv444p);
        assert_eq!((frame.width, frame.height), (8, 4));
        assert_eq!(frame.pts, Some(ffmpeg_types::Pts(9)));
        assert!(frame.validate().is_ok());
        assert!(frame.data.iter().all(|&v| v.abs_diff(128) <= 2));
    }

    #[test]
    fn high_bit_depth_converts_and_hardware_is_refused() {
        let native = VideoFrameFFmpeg::new(Pixel::YUV422P10LE, 4, 4);
        let mut normalizer = FormatNormalizer::default();
        assert!(normalizer.convert(&native, Rational::new(1, 25)).is_ok());
        assert!(FormatNormalizer::create_scaler(Pixel::CUDA, 4, 4).is_err());
    }
}
