/*!
    Media source and demuxing for the ffmpeg crate ecosystem.

    This crate handles the input side of the media pipeline. It opens media
    from files or network URLs, parses containers, and produces encoded video
    packets that downstream crates can decode.
*/

mod codec_config;
mod probe;
mod source;

pub use codec_config::CodecConfig;
pub use probe::probe;
pub use source::{Source, open};

#[cfg(any(test, feature = "test-media"))]
pub mod test_media;
