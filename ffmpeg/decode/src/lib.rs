/*!
    Media decoding for the ffmpeg crate ecosystem.

    This crate transforms encoded packets into raw frames. It handles the
    computationally intensive work of codec decoding, including hardware
    acceleration when available.
*/

mod config;
mod hw;
mod normalize;
mod video;

pub use config::VideoDecoderConfig;
pub use hw::available_hw_devices;
pub use video::VideoDecoder;
