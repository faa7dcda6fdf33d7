/*!
    Video encoding for the ffmpeg crate ecosystem.

    This crate transforms raw frames into compressed packets. It's the inverse
    of decode: taking raw video and producing H.264 or other codec bitstreams.

    # Video Encoding

    ```ignore
    use ffmpeg_encode::{EncoderPreset, VideoEncoder, VideoEncoderConfig};
    use ffmpeg_types::Rational;

    let config = VideoEncoderConfig::h264(1920, 1080, Rational::fps(25))
        .with_crf(23)
        .with_preset(EncoderPreset::Fast);

    let mut encoder = VideoEncoder::new(config)?;

    for frame in video_frames {
        for packet in encoder.encode(&frame)? {
            sink.write(&packet)?;
        }
    }

    for packet in encoder.flush()? {
        sink.write(&packet)?;
    }
    ```

    # Rate Control

    - **CRF (Constant Rate Factor)**: Target constant quality, variable bitrate.
      Lower values = higher quality. 18-28 is typical range.
    - **CBR (Constant Bitrate)**: Fixed bitrate throughout.
    - **VBR (Variable Bitrate)**: Target average bitrate with quality variation.

    # Frame Requirements

    H.264 encoders expect YUV420P. Use `ffmpeg-transform` to convert frames
    to the required format before encoding.
*/

mod config;
mod video;

pub use config::{EncoderPreset, RateControl, VideoEncoderConfig};
pub use video::VideoEncoder;
