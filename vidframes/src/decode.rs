/*!
    Decoding a video into numbered JPEG frames.
*/

use std::path::Path;

use anyhow::{Context, Result};

use ffmpeg_decode::{VideoDecoder, VideoDecoderConfig};
use ffmpeg_source::Source;
use ffmpeg_transform::{VideoTransform, VideoTransformConfig};
use ffmpeg_types::{HwDeviceType, VideoFrame};

use crate::frames::save_frame;

pub struct DecodeJob<'a> {
    pub input: &'a str,
    pub output_dir: &'a Path,
    pub hw_device: Option<HwDeviceType>,
    pub max_frames: Option<u64>,
}

/**
    Decode every video frame of the input, convert it to RGB24 at the source
    size and save it as a JPEG. Returns the number of frames written.
*/
pub fn decode_to_images(job: &DecodeJob<'_>) -> Result<u64> {
    let mut source =
        Source::open(job.input).with_context(|| format!("failed to open {}", job.input))?;
    let codec_config = source
        .video_codec_config()
        .cloned()
        .context("input has no video stream")?;
    let time_base = source
        .video_time_base()
        .context("input has no video stream")?;

    let mut decoder = VideoDecoder::new(
        codec_config,
        time_base,
        VideoDecoderConfig::from_device(job.hw_device),
    )?;

    println!("codec name: {}", decoder.codec_name());
    for (key, value) in source.metadata() {
        println!("{key} = {value}");
    }

    let (width, height) = decoder.frame_size();
    tracing::debug!(
        width,
        height,
        pixel_format = ?decoder.pixel_format(),
        hw_device = ?decoder.hw_device(),
        "decoding"
    );
    let mut converter = VideoTransform::new(VideoTransformConfig::to_rgb24(width, height))?;

    let mut writer = FrameWriter {
        output_dir: job.output_dir,
        converter: &mut converter,
        written: 0,
        limit: job.max_frames,
    };

    while !writer.is_full() {
        let Some(packet) = source.next_packet()? else {
            break;
        };
        for frame in decoder.decode(&packet)? {
            writer.write(&frame)?;
        }
    }
    if !writer.is_full() {
        for frame in decoder.flush()? {
            writer.write(&frame)?;
        }
    }

    Ok(writer.written)
}

struct FrameWriter<'a> {
    output_dir: &'a Path,
    converter: &'a mut VideoTransform,
    written: u64,
    limit: Option<u64>,
}

impl FrameWriter<'_> {
    fn is_full(&self) -> bool {
        self.limit.is_some_and(|limit| self.written >= limit)
    }

    fn write(&mut self, frame: &VideoFrame) -> Result<()> {
        if self.is_full() {
            return Ok(());
        }
        let rgb = self.converter.transform(frame)?;
        save_frame(self.output_dir, self.written, &rgb)?;
        println!("frame: {}", self.written);
        self.written += 1;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frames::list_frame_files;
    use ffmpeg_source::test_media::{write_y4m, write_y4m_as};

    #[test]
    fn writes_one_jpeg_per_frame() {
        let dir = tempfile::tempdir().unwrap();
        let input = write_y4m(dir.path(), 16, 8, 3);
        let job = DecodeJob {
            input: input.to_str().unwrap(),
            output_dir: dir.path(),
            hw_device: None,
            max_frames: None,
        };

        assert_eq!(decode_to_images(&job).unwrap(), 3);
        let files = list_frame_files(dir.path()).unwrap();
        assert_eq!(files.len(), 3);
        assert!(files[2].ends_with("frame.00000002.jpg"));
    }

    #[test]
    fn stops_at_frame_limit() {
        let dir = tempfile::tempdir().unwrap();
        let input = write_y4m(dir.path(), 16, 8, 5);
        let job = DecodeJob {
            input: input.to_str().unwrap(),
            output_dir: dir.path(),
            hw_device: None,
            max_frames: Some(2),
        };

        assert_eq!(decode_to_images(&job).unwrap(), 2);
        assert_eq!(list_frame_files(dir.path()).unwrap().len(), 2);
    }

    #[test]
    fn missing_input_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("nothing.mp4");
        let job = DecodeJob {
            input: input.to_str().unwrap(),
            output_dir: dir.path(),
            hw_device: None,
            max_frames: None,
        };
        assert!(decode_to_images(&job).is_err());
    }

    #[test]
    fn converts_uncommon_source_formats() {
        let dir = tempfile::tempdir().unwrap();
        let input = write_y4m_as(dir.path(), "411", 16, 8, 2);
        let job = DecodeJob {
            input: input.to_str().unwrap(),
            output_dir: dir.path(),
            hw_device: None,
            max_frames: None,
        };

        assert_eq!(decode_to_images(&job).unwrap(), 2);
        assert_eq!(list_frame_files(dir.path()).unwrap().len(), 2);
    }
}
