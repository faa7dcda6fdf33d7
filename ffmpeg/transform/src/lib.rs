/*!
    Media frame transformation for the ffmpeg crate ecosystem.

    This crate converts video frames between sizes and pixel formats using
    libswscale.
*/

mod video;

pub use video::{ScalingAlgorithm, VideoTransform, VideoTransformConfig};
