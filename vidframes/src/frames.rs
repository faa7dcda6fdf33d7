/*!
    Numbered JPEG frame files, `frame.00000000.jpg` and onwards.
*/

use std::path::{Path, PathBuf};

use anyhow::{Context, Result, ensure};
use image::RgbImage;

use ffmpeg_types::{PixelFormat, VideoFrame};

const PREFIX: &str = "frame.";
const EXTENSION: &str = ".jpg";

pub fn frame_file_name(number: u64) -> String {
    format!("{PREFIX}{number:08}{EXTENSION}")
}

fn is_frame_file(name: &str) -> bool {
    name.len() > PREFIX.len() + EXTENSION.len()
        && name.starts_with(PREFIX)
        && name.ends_with(EXTENSION)
}

/**
    All frame files in `dir`, ordered by name.
*/
pub fn list_frame_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let entries =
        std::fs::read_dir(dir).with_context(|| format!("failed to read {}", dir.display()))?;

    let mut files = Vec::new();
    for entry in entries {
        let entry = entry?;
        let is_match = entry.file_name().to_str().is_some_and(is_frame_file);
        if is_match && entry.file_type()?.is_file() {
            files.push(entry.path());
        }
    }
    files.sort();
    Ok(files)
}

/**
    Save an RGB24 frame as `dir/frame.NNNNNNNN.jpg`.
*/
pub fn save_frame(dir: &Path, number: u64, frame: &VideoFrame) -> Result<PathBuf> {
    ensure!(
        frame.format == PixelFormat::Rgb24,
        "frames are saved as RGB24, got {}",
        frame.format
    );
    let image = RgbImage::from_raw(frame.width, frame.height, frame.data.clone())
        .context("frame buffer does not match its dimensions")?;

    let path = dir.join(frame_file_name(number));
    image
        .save(&path)
        .with_context(|| format!("failed to save {}", path.display()))?;
    Ok(path)
}

/**
    Load a frame file as an RGB24 frame without timing.
*/
pub fn load_frame(path: &Path) -> Result<VideoFrame> {
    let image = image::open(path)
        .with_context(|| format!("failed to open {}", path.display()))?
        .to_rgb8();
    let (width, height) = image.dimensions();
    let stride = width as usize * 3;
    Ok(VideoFrame::from_packed(
        image.as_raw(),
        stride,
        width,
        height,
        PixelFormat::Rgb24,
    )?)
}
