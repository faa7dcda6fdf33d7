/*!
    Decoded frame type.
*/

use crate::{Error, PixelFormat, Pts, Rational, Result};

/**
    A decoded video frame in system memory.

    Plane data is tightly packed and stored back to back (Y, then U, then V
    for planar YUV), following [`PixelFormat::planes`]. Hardware surfaces
    are never stored here; decoders transfer them first.
*/
#[derive(Clone, Debug)]
pub struct VideoFrame {
    /// Raw pixel data.
    pub data: Vec<u8>,
    /// Frame width in pixels.
    pub width: u32,
    /// Frame height in pixels.
    pub height: u32,
    /// Pixel format of the data.
    pub format: PixelFormat,
    /// Presentation timestamp (None for frames without timing).
    pub pts: Option<Pts>,
    /// Time base for interpreting the PTS.
    pub time_base: Rational,
}

impl VideoFrame {
    /**
        Create a new video frame.
    */
    pub fn new(
        data: Vec<u8>,
        width: u32,
        height: u32,
        format: PixelFormat,
        pts: Option<Pts>,
        time_base: Rational,
    ) -> Self {
        Self {
            data,
            width,
            height,
            format,
            pts,
            time_base,
        }
    }

    /**
        Wrap a packed image buffer whose rows may carry padding.

        `stride` is the distance in bytes between row starts. Padding is
        dropped so the resulting frame is tightly packed.
    */
    pub fn from_packed(
        data: &[u8],
        stride: usize,
        width: u32,
        height: u32,
        format: PixelFormat,
    ) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(Error::invalid_data("image has zero dimensions"));
        }
        let planes = format
            .planes(width, height)
            .filter(|planes| planes.len() == 1)
            .ok_or_else(|| {
                Error::unsupported_format(format!("{format} is not a packed format"))
            })?;
        let row_bytes = planes[0].row_bytes;
        let rows = planes[0].rows;

        if stride < row_bytes {
            return Err(Error::invalid_data(format!(
                "stride {stride} is shorter than a row of {row_bytes} bytes"
            )));
        }
        if rows > 0 && data.len() < stride * (rows - 1) + row_bytes {
            return Err(Error::invalid_data("image buffer is too short"));
        }

        let mut packed = Vec::with_capacity(row_bytes * rows);
        for row in data.chunks(stride).take(rows) {
            packed.extend_from_slice(&row[..row_bytes]);
        }

        Ok(Self::new(packed, width, height, format, None, Rational::new(1, 1)))
    }

    /**
        Check that the data length matches the format and dimensions.
    */
    pub fn validate(&self) -> Result<()> {
        if self.width == 0 || self.height == 0 {
            return Err(Error::invalid_data("frame has zero dimensions"));
        }
        let expected = self.format.buffer_size(self.width, self.height).ok_or_else(|| {
            Error::unsupported_format(format!("{} frames have no system memory layout", self.format))
        })?;
        if self.data.len() != expected {
            return Err(Error::invalid_data(format!(
                "{}x{} {} frame needs {} bytes, has {}",
                self.width,
                self.height,
                self.format,
                expected,
                self.data.len()
            )));
        }
        Ok(())
    }

    pub fn with_pts(mut self, pts: Pts, time_base: Rational) -> Self {
        self.pts = Some(pts);
        self.time_base = time_base;
        self
    }

    /**
        Returns the presentation time as a Duration, if PTS is set.
    */
    pub fn presentation_time(&self) -> Option<std::time::Duration> {
        self.pts.map(|pts| pts.to_duration(self.time_base))
    }
}

static_assertions::assert_impl_all!(VideoFrame: Send, Sync);
