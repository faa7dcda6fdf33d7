/*!
    Conversions between ffmpeg-next/ffi types and ffmpeg-types.
*/

use std::ffi::{CStr, CString};

use ffmpeg_next::{codec::Id, ffi, format::Pixel};

use ffmpeg_types::{CodecId, Error, HwDeviceType, MediaDuration, PixelFormat, Pts, Rational, Result};

/**
    Surface an ffmpeg-next error as its native code.
*/
pub fn error_from_native(e: ffmpeg_next::Error) -> Error {
    match e {
        ffmpeg_next::Error::Eof => Error::Eof,
        other => {
            tracing::trace!(error = %other, "native call failed");
            Error::from_native(other.into())
        }
    }
}

pub fn rational_from_native(r: ffmpeg_next::Rational) -> Rational {
    Rational::new(r.numerator(), r.denominator())
}

pub fn rational_to_native(r: Rational) -> ffmpeg_next::Rational {
    ffmpeg_next::Rational::new(r.num, r.den)
}

/**
    Rational from a raw `AVRational`, `None` when the denominator is zero.
*/
pub fn rational_from_raw(r: ffi::AVRational) -> Option<Rational> {
    (r.den != 0).then(|| Rational::new(r.num, r.den))
}

pub fn pts_from_native(pts: Option<i64>) -> Option<Pts> {
    pts.map(Pts)
}

pub fn duration_from_native(duration: i64) -> MediaDuration {
    MediaDuration(duration.max(0))
}

/**
    Convert a native pixel format to ours.

    Hardware surface formats are recognized too, so callers can tell a
    hardware frame apart from an unsupported software one.
*/
pub fn pixel_from_native(format: Pixel) -> Option<PixelFormat> {
    let format = match format {
        Pixel::YUV420P => PixelFormat::Yuv420p,
        Pixel::YUV422P => PixelFormat::Yuv422p,
        Pixel::YUV444P => PixelFormat::Yuv444p,
        Pixel::YUVJ420P => PixelFormat::Yuvj420p,
        Pixel::YUVJ422P => PixelFormat::Yuvj422p,
        Pixel::YUVJ444P => PixelFormat::Yuvj444p,
        Pixel::YUV420P10LE => PixelFormat::Yuv420p10,
        Pixel::NV12 => PixelFormat::Nv12,
        Pixel::P010LE => PixelFormat::P010le,
        Pixel::RGB24 => PixelFormat::Rgb24,
        Pixel::BGR24 => PixelFormat::Bgr24,
        Pixel::RGBA => PixelFormat::Rgba,
        Pixel::BGRA => PixelFormat::Bgra,
        Pixel::GRAY8 => PixelFormat::Gray8,
        other => return hw_pixel_from_raw(other.into()),
    };
    Some(format)
}

fn hw_pixel_from_raw(format: ffi::AVPixelFormat) -> Option<PixelFormat> {
    use ffi::AVPixelFormat::*;

    let format = match format {
        AV_PIX_FMT_VDPAU => PixelFormat::Vdpau,
        AV_PIX_FMT_CUDA => PixelFormat::Cuda,
        AV_PIX_FMT_VAAPI => PixelFormat::Vaapi,
        AV_PIX_FMT_QSV => PixelFormat::Qsv,
        AV_PIX_FMT_VIDEOTOOLBOX => PixelFormat::VideoToolbox,
        AV_PIX_FMT_DRM_PRIME => PixelFormat::DrmPrime,
        AV_PIX_FMT_OPENCL => PixelFormat::OpenCl,
        AV_PIX_FMT_MEDIACODEC => PixelFormat::MediaCodec,
        AV_PIX_FMT_D3D11 => PixelFormat::D3d11,
        AV_PIX_FMT_DXVA2_VLD => PixelFormat::Dxva2Vld,
        AV_PIX_FMT_VULKAN => PixelFormat::Vulkan,
        _ => return None,
    };
    Some(format)
}

// AV_PIX_FMT_FLAG_* from libavutil/pixdesc.h
const FLAG_PAL: u64 = 1 << 1;
const FLAG_HWACCEL: u64 = 1 << 3;
const FLAG_RGB: u64 = 1 << 5;
const FLAG_ALPHA: u64 = 1 << 7;

/**
    The system memory format a native software format without a
    [`PixelFormat`] counterpart should be converted to.

    Alpha and palette formats go to RGBA, single component formats to gray,
    other RGB formats to RGB24 and everything else to YUV 4:4:4, so no
    chroma resolution is lost. Returns `None` for hardware surfaces and
    formats the native side has no descriptor for.
*/
pub fn system_fallback(format: Pixel) -> Option<PixelFormat> {
    // SAFETY: returns a pointer into a static table, or null.
    let descriptor = unsafe { ffi::av_pix_fmt_desc_get(format.into()) };
    if descriptor.is_null() {
        return None;
    }
    let descriptor = unsafe { &*descriptor };

    let flags = descriptor.flags;
    if flags & FLAG_HWACCEL != 0 {
        return None;
    }
    let fallback = if flags & (FLAG_PAL | FLAG_ALPHA) != 0 {
        PixelFormat::Rgba
    } else if descriptor.nb_components == 1 {
        PixelFormat::Gray8
    } else if flags & FLAG_RGB != 0 {
        PixelFormat::Rgb24
    } else {
        PixelFormat::Yuv444p
    };
    Some(fallback)
}

/**
    Convert our pixel format to the native one.

    Only formats with a system memory layout can be converted, hardware
    surfaces are never created from this side.
*/
pub fn pixel_to_native(format: PixelFormat) -> Result<Pixel> {
    let pixel = match format {
        PixelFormat::Yuv420p => Pixel::YUV420P,
        PixelFormat::Yuv422p => Pixel::YUV422P,
        PixelFormat::Yuv444p => Pixel::YUV444P,
        PixelFormat::Yuvj420p => Pixel::YUVJ420P,
        PixelFormat::Yuvj422p => Pixel::YUVJ422P,
        PixelFormat::Yuvj444p => Pixel::YUVJ444P,
        PixelFormat::Yuv420p10 => Pixel::YUV420P10LE,
        PixelFormat::Nv12 => Pixel::NV12,
        PixelFormat::P010le => Pixel::P010LE,
        PixelFormat::Rgb24 => Pixel::RGB24,
        PixelFormat::Bgr24 => Pixel::BGR24,
        PixelFormat::Rgba => Pixel::RGBA,
        PixelFormat::Bgra => Pixel::BGRA,
        PixelFormat::Gray8 => Pixel::GRAY8,
        _ => {
            return Err(Error::unsupported_format(format!(
                "pixel format {format} has no system memory layout"
            )));
        }
    };
    Ok(pixel)
}

pub fn codec_id_from_native(id: Id) -> Option<CodecId> {
    match id {
        Id::H264 => Some(CodecId::H264),
        Id::HEVC => Some(CodecId::H265),
        Id::VP8 => Some(CodecId::Vp8),
        Id::VP9 => Some(CodecId::Vp9),
        Id::AV1 => Some(CodecId::Av1),
        Id::MPEG4 => Some(CodecId::Mpeg4),
        Id::MPEG2VIDEO => Some(CodecId::Mpeg2Video),
        Id::MJPEG => Some(CodecId::Mjpeg),
        _ => None,
    }
}

pub fn codec_id_to_native(codec: CodecId) -> Id {
    match codec {
        CodecId::H264 => Id::H264,
        CodecId::H265 => Id::HEVC,
        CodecId::Vp8 => Id::VP8,
        CodecId::Vp9 => Id::VP9,
        CodecId::Av1 => Id::AV1,
        CodecId::Mpeg4 => Id::MPEG4,
        CodecId::Mpeg2Video => Id::MPEG2VIDEO,
        CodecId::Mjpeg => Id::MJPEG,
    }
}

/**
    Convert a native device type by way of its name.

    Device types added in newer library versions that we have no variant
    for come back as `None`.
*/
pub fn hw_device_from_native(device: ffi::AVHWDeviceType) -> Option<HwDeviceType> {
    // SAFETY: returns a static string or null for unknown types.
    let name = unsafe { ffi::av_hwdevice_get_type_name(device) };
    if name.is_null() {
        return None;
    }
    let name = unsafe { CStr::from_ptr(name) }.to_str().ok()?;
    HwDeviceType::from_name(name)
}

pub fn hw_device_to_native(device: HwDeviceType) -> Option<ffi::AVHWDeviceType> {
    let name = CString::new(device.name()).ok()?;
    // SAFETY: `name` is a valid nul-terminated string for the duration of the call.
    let device = unsafe { ffi::av_hwdevice_find_type_by_name(name.as_ptr()) };
    (device != ffi::AVHWDeviceType::AV_HWDEVICE_TYPE_NONE).then_some(device)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn software_pixel_formats_round_trip() {
        for format in [
            PixelFormat::Yuv420p,
            PixelFormat::Yuv422p,
            PixelFormat::Yuv444p,
            PixelFormat::Yuvj420p,
            PixelFormat::Yuvj422p,
            PixelFormat::Yuvj444p,
            PixelFormat::Yuv420p10,
            PixelFormat::Nv12,
            PixelFormat::P010le,
            PixelFormat::Rgb24,
            PixelFormat::Bgr24,
            PixelFormat::Rgba,
            PixelFormat::Bgra,
            PixelFormat::Gray8,
        ] {
            let native = pixel_to_native(format).unwrap();
            assert_eq!(pixel_from_native(native), Some(format));
        }
    }

    #[test]
    fn full_range_yuv_keeps_its_range() {
        assert_eq!(pixel_from_native(Pixel::YUVJ420P), Some(PixelFormat::Yuvj420p));
        assert_eq!(pixel_to_native(PixelFormat::Yuvj444p).unwrap(), Pixel::YUVJ444P);
    }

    #[test]
    fn fallbacks_for_formats_without_a_counterpart() {
        assert_eq!(pixel_from_native(Pixel::YUV411P), None);
        assert_eq!(system_fallback(Pixel::YUV411P), Some(PixelFormat::Yuv444p));
        assert_eq!(system_fallback(Pixel::YUV422P10LE), Some(PixelFormat::Yuv444p));
        assert_eq!(system_fallback(Pixel::PAL8), Some(PixelFormat::Rgba));
        assert_eq!(system_fallback(Pixel::YUVA420P), Some(PixelFormat::Rgba));
        assert_eq!(system_fallback(Pixel::GBRP), Some(PixelFormat::Rgb24));
        assert_eq!(system_fallback(Pixel::GRAY16LE), Some(PixelFormat::Gray8));
        assert_eq!(system_fallback(Pixel::CUDA), None);
        assert_eq!(system_fallback(Pixel::None), None);
    }

    #[test]
    fn hardware_pixel_formats() {
        assert_eq!(pixel_from_native(Pixel::CUDA), Some(PixelFormat::Cuda));
        assert!(pixel_to_native(PixelFormat::Cuda).is_err());
    }

    #[test]
    fn codec_ids() {
        assert_eq!(codec_id_from_native(Id::HEVC), Some(CodecId::H265));
        assert_eq!(codec_id_to_native(CodecId::Mjpeg), Id::MJPEG);
        assert_eq!(codec_id_from_native(Id::AAC), None);
    }

    #[test]
    fn native_errors_keep_their_code() {
        let e = error_from_native(ffmpeg_next::Error::Other {
            errno: ffi::EAGAIN as i32,
        });
        assert!(e.is_again());
        assert!(error_from_native(ffmpeg_next::Error::Eof).is_eof());
        assert_eq!(
            error_from_native(ffmpeg_next::Error::InvalidData).code(),
            Some(ffmpeg_types::abi::AVERROR_INVALIDDATA)
        );
    }

    #[test]
    fn rationals() {
        let r = rational_from_native(ffmpeg_next::Rational::new(1, 90000));
        assert_eq!(r, Rational::new(1, 90000));
        assert_eq!(rational_to_native(r), ffmpeg_next::Rational::new(1, 90000));
        assert_eq!(rational_from_raw(ffi::AVRational { num: 0, den: 0 }), None);
    }

    #[test]
    fn hw_device_names_match_native() {
        for device in HwDeviceType::ALL {
            if let Some(native) = hw_device_to_native(device) {
                assert_eq!(hw_device_from_native(native), Some(device));
            }
        }
        assert_eq!(hw_device_from_native(ffi::AVHWDeviceType::AV_HWDEVICE_TYPE_NONE), None);
    }
}
