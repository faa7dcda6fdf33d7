/*!
    Pixel format types.
*/

use std::fmt;

/**
    Video pixel formats.

    This is a subset of formats commonly encountered in media pipelines.
    Not all native pixel formats are represented. The hardware variants
    describe opaque surfaces owned by a hardware device; their data never
    lives in a [`VideoFrame`](crate::VideoFrame).
*/
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum PixelFormat {
    /// Planar YUV 4:2:0, 12bpp (most common video format)
    Yuv420p,
    /// Planar YUV 4:2:2, 16bpp
    Yuv422p,
    /// Planar YUV 4:4:4, 24bpp
    Yuv444p,
    /// Full range planar YUV 4:2:0, as JPEG decoders produce it
    Yuvj420p,
    /// Full range planar YUV 4:2:2
    Yuvj422p,
    /// Full range planar YUV 4:4:4
    Yuvj444p,
    /// Planar YUV 4:2:0, 10-bit little-endian
    Yuv420p10,
    /// Semi-planar YUV 4:2:0, 12bpp (common hardware transfer format)
    Nv12,
    /// Semi-planar YUV 4:2:0, 10-bit little-endian
    P010le,
    /// Packed RGB, 24bpp
    Rgb24,
    /// Packed BGR, 24bpp
    Bgr24,
    /// Packed RGBA, 32bpp
    Rgba,
    /// Packed BGRA, 32bpp
    Bgra,
    /// Single 8-bit luma plane
    Gray8,

    // Hardware surfaces
    Vdpau,
    Cuda,
    Vaapi,
    Qsv,
    VideoToolbox,
    DrmPrime,
    OpenCl,
    MediaCodec,
    D3d11,
    Dxva2Vld,
    Vulkan,
}

/**
    Size of one tightly packed plane.
*/
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Plane {
    /// Bytes in one row, without padding.
    pub row_bytes: usize,
    /// Number of rows.
    pub rows: usize,
}

impl Plane {
    pub const fn len(self) -> usize {
        self.row_bytes * self.rows
    }

    pub const fn is_empty(self) -> bool {
        self.len() == 0
    }
}

impl PixelFormat {
    /**
        Returns true if frames in this format live in hardware memory.
    */
    pub const fn is_hardware(self) -> bool {
        matches!(
            self,
            Self::Vdpau
                | Self::Cuda
                | Self::Vaapi
                | Self::Qsv
                | Self::VideoToolbox
                | Self::DrmPrime
                | Self::OpenCl
                | Self::MediaCodec
                | Self::D3d11
                | Self::Dxva2Vld
                | Self::Vulkan
        )
    }

    /**
        Returns true if this is a planar (or semi-planar) format.
    */
    pub const fn is_planar(self) -> bool {
        matches!(
            self,
            Self::Yuv420p
                | Self::Yuv422p
                | Self::Yuv444p
                | Self::Yuvj420p
                | Self::Yuvj422p
                | Self::Yuvj444p
                | Self::Yuv420p10
                | Self::Nv12
                | Self::P010le
        )
    }

    /**
        Returns true for the full range (JPEG) YUV formats.
    */
    pub const fn is_full_range(self) -> bool {
        matches!(self, Self::Yuvj420p | Self::Yuvj422p | Self::Yuvj444p)
    }

    /**
        Layout of the tightly packed planes of a `width` x `height` frame.

        Chroma dimensions round up for odd sizes, matching the native
        `AV_CEIL_RSHIFT`. Returns `None` for hardware formats.
    */
    pub fn planes(self, width: u32, height: u32) -> Option<Vec<Plane>> {
        let w = width as usize;
        let h = height as usize;
        let half_w = w.div_ceil(2);
        let half_h = h.div_ceil(2);

        let packed = |bytes_per_pixel: usize| {
            vec![Plane {
                row_bytes: w * bytes_per_pixel,
                rows: h,
            }]
        };
        let three = |bytes: usize, cw: usize, ch: usize| {
            let luma = Plane {
                row_bytes: w * bytes,
                rows: h,
            };
            let chroma = Plane {
                row_bytes: cw * bytes,
                rows: ch,
            };
            vec![luma, chroma, chroma]
        };
        let two = |bytes: usize| {
            vec![
                Plane {
                    row_bytes: w * bytes,
                    rows: h,
                },
                Plane {
                    row_bytes: half_w * 2 * bytes,
                    rows: half_h,
                },
            ]
        };

        let planes = match self {
            Self::Yuv420p | Self::Yuvj420p => three(1, half_w, half_h),
            Self::Yuv422p | Self::Yuvj422p => three(1, half_w, h),
            Self::Yuv444p | Self::Yuvj444p => three(1, w, h),
            Self::Yuv420p10 => three(2, half_w, half_h),
            Self::Nv12 => two(1),
            Self::P010le => two(2),
            Self::Rgb24 | Self::Bgr24 => packed(3),
            Self::Rgba | Self::Bgra => packed(4),
            Self::Gray8 => packed(1),
            _ => return None,
        };
        Some(planes)
    }

    /**
        Total bytes of a tightly packed frame, `None` for hardware formats.
    */
    pub fn buffer_size(self, width: u32, height: u32) -> Option<usize> {
        self.planes(width, height)
            .map(|planes| planes.iter().map(|p| p.len()).sum())
    }

    /**
        The native name of this format, as printed by `av_get_pix_fmt_name`.
    */
    pub const fn name(self) -> &'static str {
        match self {
            Self::Yuv420p => "yuv420p",
            Self::Yuv422p => "yuv422p",
            Self::Yuv444p => "yuv444p",
            Self::Yuvj420p => "yuvj420p",
            Self::Yuvj422p => "yuvj422p",
            Self::Yuvj444p => "yuvj444p",
            Self::Yuv420p10 => "yuv420p10le",
            Self::Nv12 => "nv12",
            Self::P010le => "p010le",
            Self::Rgb24 => "rgb24",
            Self::Bgr24 => "bgr24",
            Self::Rgba => "rgba",
            Self::Bgra => "bgra",
            Self::Gray8 => "gray",
            Self::Vdpau => "vdpau",
            Self::Cuda => "cuda",
            Self::Vaapi => "vaapi",
            Self::Qsv => "qsv",
            Self::VideoToolbox => "videotoolbox_vld",
            Self::DrmPrime => "drm_prime",
            Self::OpenCl => "opencl",
            Self::MediaCodec => "mediacodec",
            Self::D3d11 => "d3d11",
            Self::Dxva2Vld => "dxva2_vld",
            Self::Vulkan => "vulkan",
        }
    }
}

impl fmt::Display for PixelFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn yuv420p_planes() {
        let planes = PixelFormat::Yuv420p.planes(4, 4).unwrap();
        assert_eq!(planes.len(), 3);
        assert_eq!(planes[0].len(), 16);
        assert_eq!(planes[1].len(), 4);
        assert_eq!(planes[2].len(), 4);
        assert_eq!(PixelFormat::Yuv420p.buffer_size(1920, 1080), Some(1920 * 1080 * 3 / 2));
    }

    #[test]
    fn odd_dimensions_round_chroma_up() {
        let planes = PixelFormat::Yuv420p.planes(5, 3).unwrap();
        assert_eq!(planes[1], Plane { row_bytes: 3, rows: 2 });

        let planes = PixelFormat::Nv12.planes(5, 3).unwrap();
        assert_eq!(planes[1], Plane { row_bytes: 6, rows: 2 });
    }

    #[test]
    fn full_range_shares_the_limited_range_layout() {
        assert_eq!(
            PixelFormat::Yuvj420p.planes(5, 3),
            PixelFormat::Yuv420p.planes(5, 3)
        );
        assert_eq!(PixelFormat::Yuvj422p.buffer_size(4, 2), Some(16));
        assert!(PixelFormat::Yuvj444p.is_full_range());
        assert!(!PixelFormat::Yuv444p.is_full_range());
        assert_eq!(PixelFormat::Yuvj420p.to_string(), "yuvj420p");
    }

    #[test]
    fn packed_formats() {
        assert_eq!(PixelFormat::Rgb24.buffer_size(10, 2), Some(60));
        assert_eq!(PixelFormat::Bgra.buffer_size(10, 2), Some(80));
        assert!(!PixelFormat::Bgr24.is_planar());
        assert!(PixelFormat::Nv12.is_planar());
    }

    #[test]
    fn hardware_formats_have_no_layout() {
        assert!(PixelFormat::Cuda.is_hardware());
        assert!(!PixelFormat::Nv12.is_hardware());
        assert_eq!(PixelFormat::Vaapi.planes(16, 16), None);
        assert_eq!(PixelFormat::DrmPrime.buffer_size(16, 16), None);
    }

    #[test]
    fn native_names() {
        assert_eq!(PixelFormat::Bgr24.to_string(), "bgr24");
        assert_eq!(PixelFormat::VideoToolbox.name(), "videotoolbox_vld");
    }
}
