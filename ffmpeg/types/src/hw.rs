/*!
    Hardware device types.
*/

use std::fmt;

use crate::PixelFormat;

/**
    Hardware device types known to the native library.

    The names match what `av_hwdevice_get_type_name` returns, which is also
    what `av_hwdevice_find_type_by_name` accepts.
*/
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum HwDeviceType {
    Vdpau,
    Cuda,
    Vaapi,
    Dxva2,
    Qsv,
    VideoToolbox,
    D3d11va,
    Drm,
    OpenCl,
    MediaCodec,
    Vulkan,
}

impl HwDeviceType {
    pub const ALL: [Self; 11] = [
        Self::Vdpau,
        Self::Cuda,
        Self::Vaapi,
        Self::Dxva2,
        Self::Qsv,
        Self::VideoToolbox,
        Self::D3d11va,
        Self::Drm,
        Self::OpenCl,
        Self::MediaCodec,
        Self::Vulkan,
    ];

    pub const fn name(self) -> &'static str {
        match self {
            Self::Vdpau => "vdpau",
            Self::Cuda => "cuda",
            Self::Vaapi => "vaapi",
            Self::Dxva2 => "dxva2",
            Self::Qsv => "qsv",
            Self::VideoToolbox => "videotoolbox",
            Self::D3d11va => "d3d11va",
            Self::Drm => "drm",
            Self::OpenCl => "opencl",
            Self::MediaCodec => "mediacodec",
            Self::Vulkan => "vulkan",
        }
    }

    /**
        Look up a device type by its native name (case-insensitive).
    */
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|t| t.name().eq_ignore_ascii_case(name.trim()))
    }

    /**
        Pixel format that decoded frames from this device arrive in.

        DXVA2 and D3D11VA surfaces are read back as NV12, every other device
        reports its own surface format.
    */
    pub const fn pixel_format(self) -> Option<PixelFormat> {
        match self {
            Self::Vdpau => Some(PixelFormat::Vdpau),
            Self::Cuda => Some(PixelFormat::Cuda),
            Self::Vaapi => Some(PixelFormat::Vaapi),
            Self::Dxva2 => Some(PixelFormat::Nv12),
            Self::Qsv => Some(PixelFormat::Qsv),
            Self::VideoToolbox => Some(PixelFormat::VideoToolbox),
            Self::D3d11va => Some(PixelFormat::Nv12),
            Self::Drm => Some(PixelFormat::DrmPrime),
            Self::OpenCl => Some(PixelFormat::OpenCl),
            Self::MediaCodec => Some(PixelFormat::MediaCodec),
            Self::Vulkan => None,
        }
    }

    /**
        Pick the default device out of the available ones.

        DXVA2 wins when present, otherwise the first enumerated device.
    */
    pub fn preferred(available: &[Self]) -> Option<Self> {
        available
            .iter()
            .copied()
            .find(|t| *t == Self::Dxva2)
            .or_else(|| available.first().copied())
    }
}

impl fmt::Display for HwDeviceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/**
    Pixel format of frames coming out of a decoder, given the optional
    hardware device it was configured with.
*/
pub fn decoded_pixel_format(
    device: Option<HwDeviceType>,
    software: PixelFormat,
) -> Option<PixelFormat> {
    match device {
        None => Some(software),
        Some(device) => device.pixel_format(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_round_trip() {
        for device in HwDeviceType::ALL {
            assert_eq!(HwDeviceType::from_name(device.name()), Some(device));
        }
        assert_eq!(HwDeviceType::from_name("CUDA"), Some(HwDeviceType::Cuda));
        assert_eq!(HwDeviceType::from_name("none"), None);
    }

    #[test]
    fn pixel_format_mapping() {
        assert_eq!(HwDeviceType::Dxva2.pixel_format(), Some(PixelFormat::Nv12));
        assert_eq!(HwDeviceType::D3d11va.pixel_format(), Some(PixelFormat::Nv12));
        assert_eq!(HwDeviceType::Drm.pixel_format(), Some(PixelFormat::DrmPrime));
        assert_eq!(
            HwDeviceType::VideoToolbox.pixel_format(),
            Some(PixelFormat::VideoToolbox)
        );
        assert_eq!(HwDeviceType::Vulkan.pixel_format(), None);
    }

    #[test]
    fn preferred_device() {
        use HwDeviceType::*;
        assert_eq!(HwDeviceType::preferred(&[Cuda, Dxva2, D3d11va]), Some(Dxva2));
        assert_eq!(HwDeviceType::preferred(&[Vaapi, Vdpau]), Some(Vaapi));
        assert_eq!(HwDeviceType::preferred(&[]), None);
    }

    #[test]
    fn decoded_format_without_device() {
        assert_eq!(
            decoded_pixel_format(None, PixelFormat::Yuv420p),
            Some(PixelFormat::Yuv420p)
        );
        assert_eq!(
            decoded_pixel_format(Some(HwDeviceType::Cuda), PixelFormat::Yuv420p),
            Some(PixelFormat::Cuda)
        );
    }
}
