/*!
    Encoded packet output for the ffmpeg crate ecosystem.

    This crate handles the output side of the media pipeline. It takes encoded
    packets from the encoder and writes them out as a raw elementary stream
    (for example `out.h264`), through FFmpeg's own byte stream layer so any
    URL protocol FFmpeg can write to works as a destination.
*/

mod bitstream;

pub use bitstream::{BitstreamSink, SinkStats};
