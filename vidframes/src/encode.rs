/*!
    Encoding numbered JPEG frames into a raw video bitstream.
*/

use std::path::Path;

use anyhow::{Context, Result, bail, ensure};

use ffmpeg_encode::{EncoderPreset, VideoEncoder, VideoEncoderConfig};
use ffmpeg_sink::{BitstreamSink, SinkStats};
use ffmpeg_transform::{VideoTransform, VideoTransformConfig};
use ffmpeg_types::{CodecId, Pts, Rational};

use crate::frames::{list_frame_files, load_frame};

pub struct EncodeJob<'a> {
    pub frames_dir: &'a Path,
    pub output: &'a Path,
    pub codec: CodecId,
    pub fps: i32,
    pub crf: u8,
    pub preset: EncoderPreset,
}

/**
    Encode the `frame.*.jpg` files of a directory, in name order.

    The first frame decides the output size (rounded down to even
    dimensions for 4:2:0 chroma); later frames of another size are scaled.
*/
pub fn encode_images(job: &EncodeJob<'_>) -> Result<SinkStats> {
    ensure!(job.fps > 0, "frame rate must be positive, got {}", job.fps);

    let files = list_frame_files(job.frames_dir)?;
    let Some(first) = files.first() else {
        bail!("no frame files found in {}", job.frames_dir.display());
    };

    let first = load_frame(first)?;
    let width = first.width & !1;
    let height = first.height & !1;
    ensure!(
        width > 0 && height > 0,
        "frames of {}x{} are too small to encode",
        first.width,
        first.height
    );

    let config = VideoEncoderConfig::new(job.codec, width, height, Rational::fps(job.fps))
        .with_crf(job.crf)
        .with_preset(job.preset);
    let time_base = config.time_base();

    let mut converter = VideoTransform::new(VideoTransformConfig::to_yuv420p(width, height))?;
    let mut encoder = VideoEncoder::new(config)?;

    let output = job
        .output
        .to_str()
        .context("output path is not valid UTF-8")?;
    let mut sink = BitstreamSink::create(output)
        .with_context(|| format!("failed to create {}", job.output.display()))?;

    tracing::info!(
        encoder = encoder.encoder_name(),
        width,
        height,
        fps = job.fps,
        frames = files.len(),
        "encoding"
    );

    for (number, path) in files.iter().enumerate() {
        let frame = load_frame(path)?.with_pts(Pts(number as i64), time_base);
        let yuv = converter.transform(&frame)?;
        for packet in encoder.encode(&yuv)? {
            sink.write(&packet)?;
        }
        println!("frame: {number}");
    }

    for packet in encoder.flush()? {
        sink.write(&packet)?;
    }

    let stats = sink.finish()?;
    tracing::info!(
        output = %job.output.display(),
        packets = stats.packets,
        bytes = stats.bytes,
        "wrote bitstream"
    );
    Ok(stats)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decode::{DecodeJob, decode_to_images};
    use ffmpeg_source::test_media::write_y4m;

    #[test]
    fn encodes_decoded_frames() {
        let dir = tempfile::tempdir().unwrap();
        let input = write_y4m(dir.path(), 17, 9, 4);
        let decoded = decode_to_images(&DecodeJob {
            input: input.to_str().unwrap(),
            output_dir: dir.path(),
            hw_device: None,
            max_frames: None,
        })
        .unwrap();
        assert_eq!(decoded, 4);

        let output = dir.path().join("out.m4v");
        let stats = encode_images(&EncodeJob {
            frames_dir: dir.path(),
            output: &output,
            codec: CodecId::Mpeg4,
            fps: 25,
            crf: 23,
            preset: EncoderPreset::Medium,
        })
        .unwrap();

        assert!(stats.packets >= 4);
        assert_eq!(std::fs::metadata(&output).unwrap().len(), stats.bytes);
    }

    #[test]
    fn empty_directory_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("out.h264");
        let result = encode_images(&EncodeJob {
            frames_dir: dir.path(),
            output: &output,
            codec: CodecId::H264,
            fps: 25,
            crf: 23,
            preset: EncoderPreset::Medium,
        });
        assert!(result.is_err());
        assert!(!output.exists());
    }
}
