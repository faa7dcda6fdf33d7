/*!
    Copying plane data between native frames and [`VideoFrame`].

    Native frames pad each row up to `linesize` bytes, our frames are tightly
    packed. Plane layouts come from [`PixelFormat::planes`], so every format
    with a system memory layout is handled by the same loop.
*/

use ffmpeg_next::util::frame::video::Video as VideoFrameFFmpeg;

use ffmpeg_types::{Error, PixelFormat, Plane, Pts, Rational, Result, VideoFrame};

use crate::convert::{pixel_from_native, pixel_to_native};

fn planes_for(format: PixelFormat, width: u32, height: u32) -> Result<Vec<Plane>> {
    format.planes(width, height).ok_or_else(|| {
        Error::unsupported_format(format!("pixel format {format} not supported for frame copy"))
    })
}

/**
    Copy a software frame's planes into a tightly packed buffer.
*/
pub fn copy_from_native(frame: &VideoFrameFFmpeg, format: PixelFormat) -> Result<Vec<u8>> {
    let planes = planes_for(format, frame.width(), frame.height())?;
    let mut output = Vec::with_capacity(planes.iter().map(|p| p.len()).sum());

    for (index, plane) in planes.iter().enumerate() {
        let stride = frame.stride(index);
        let data = frame.data(index);
        for row in 0..plane.rows {
            let start = row * stride;
            let bytes = data
                .get(start..start + plane.row_bytes)
                .ok_or_else(|| Error::invalid_data(format!("plane {index} is shorter than expected")))?;
            output.extend_from_slice(bytes);
        }
    }

    Ok(output)
}

/**
    Copy a tightly packed frame into an allocated native frame.

    The native frame must already have the same format and dimensions.
*/
pub fn copy_to_native(dst: &mut VideoFrameFFmpeg, src: &VideoFrame) -> Result<()> {
    src.validate()?;
    let planes = planes_for(src.format, src.width, src.height)?;

    let mut offset = 0;
    for (index, plane) in planes.iter().enumerate() {
        let stride = dst.stride(index);
        let data = dst.data_mut(index);
        for row in 0..plane.rows {
            let src_start = offset + row * plane.row_bytes;
            let dst_start = row * stride;
            let target = data
                .get_mut(dst_start..dst_start + plane.row_bytes)
                .ok_or_else(|| Error::invalid_data(format!("native plane {index} is too small")))?;
            target.copy_from_slice(&src.data[src_start..src_start + plane.row_bytes]);
        }
        offset += plane.len();
    }

    Ok(())
}

/**
    Allocate a native frame and fill it from a [`VideoFrame`].
*/
pub fn to_native(frame: &VideoFrame) -> Result<VideoFrameFFmpeg> {
    let pixel = pixel_to_native(frame.format)?;
    let mut native = VideoFrameFFmpeg::new(pixel, frame.width, frame.height);
    copy_to_native(&mut native, frame)?;
    native.set_pts(frame.pts.map(|pts| pts.0));
    Ok(native)
}

/**
    Copy a native software frame into a [`VideoFrame`].
*/
pub fn from_native(frame: &VideoFrameFFmpeg, time_base: Rational) -> Result<VideoFrame> {
    let width = frame.width();
    let height = frame.height();
    if width == 0 || height == 0 {
        return Err(Error::invalid_data("frame has zero dimensions"));
    }

    let native_format = frame.format();
    let format = pixel_from_native(native_format)
        .filter(|format| !format.is_hardware())
        .ok_or_else(|| {
            Error::unsupported_format(format!("unsupported pixel format: {native_format:?}"))
        })?;

    let data = copy_from_native(frame, format)?;
    Ok(VideoFrame::new(
        data,
        width,
        height,
        format,
        frame.pts().map(Pts),
        time_base,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gradient(format: PixelFormat, width: u32, height: u32) -> VideoFrame {
        let size = format.buffer_size(width, height).unwrap();
        let data = (0..size).map(|i| (i % 251) as u8).collect();
        VideoFrame::new(data, width, height, format, Some(Pts(7)), Rational::new(1, 25))
    }

    #[test]
    fn packed_rgb_survives_native_padding() {
        let frame = gradient(PixelFormat::Rgb24, 5, 3);
        let native = to_native(&frame).unwrap();
        assert!(native.stride(0) >= 15);

        let back = from_native(&native, frame.time_base).unwrap();
        assert_eq!(back.data, frame.data);
        assert_eq!(back.pts, Some(Pts(7)));
        assert_eq!(back.format, PixelFormat::Rgb24);
    }

    #[test]
    fn planar_yuv_with_odd_size() {
        let frame = gradient(PixelFormat::Yuv420p, 7, 5);
        let native = to_native(&frame).unwrap();
        let back = from_native(&native, frame.time_base).unwrap();
        assert_eq!(back.data, frame.data);
        assert_eq!((back.width, back.height), (7, 5));
    }

    #[test]
    fn semi_planar_nv12() {
        let frame = gradient(PixelFormat::Nv12, 6, 4);
        let native = to_native(&frame).unwrap();
        assert_eq!(copy_from_native(&native, PixelFormat::Nv12).unwrap(), frame.data);
    }

    #[test]
    fn rejects_short_input() {
        let mut frame = gradient(PixelFormat::Rgb24, 4, 4);
        frame.data.pop();
        assert!(to_native(&frame).is_err());
    }
}
