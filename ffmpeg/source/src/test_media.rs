/*!
    Generated YUV4MPEG2 clips, for tests that need real media without
    shipping any. Every frame is one flat value, `index * 40`, scaled to the
    sample depth.
*/

use std::io::{self, Write};
use std::path::{Path, PathBuf};

/**
    Write `clip.y4m` with `frames` 4:2:0 frames at 25 fps.
*/
pub fn write_y4m(dir: &Path, width: u32, height: u32, frames: usize) -> PathBuf {
    write_y4m_as(dir, "420jpeg", width, height, frames)
}

/**
    Write `clip.y4m` using a YUV4MPEG2 colorspace tag such as `411`, `422`,
    `444` or `422p10`.

    # Panics

    On tags without a known layout, and on I/O errors.
*/
pub fn write_y4m_as(
    dir: &Path,
    colorspace: &str,
    width: u32,
    height: u32,
    frames: usize,
) -> PathBuf {
    let path = dir.join("clip.y4m");
    write_clip(&path, colorspace, width, height, frames)
        .unwrap_or_else(|e| panic!("failed to write {}: {e}", path.display()));
    path
}

fn write_clip(
    path: &Path,
    colorspace: &str,
    width: u32,
    height: u32,
    frames: usize,
) -> io::Result<()> {
    let (w, h) = (width as usize, height as usize);
    let (chroma_w, chroma_h, sample_bytes) = match colorspace {
        "420jpeg" | "420mpeg2" | "420paldv" => (w.div_ceil(2), h.div_ceil(2), 1),
        "411" => (w.div_ceil(4), h, 1),
        "422" => (w.div_ceil(2), h, 1),
        "444" => (w, h, 1),
        "420p10" => (w.div_ceil(2), h.div_ceil(2), 2),
        "422p10" => (w.div_ceil(2), h, 2),
        "444p10" => (w, h, 2),
        other => panic!("no layout for y4m colorspace {other}"),
    };
    let samples = w * h + 2 * chroma_w * chroma_h;

    let mut file = io::BufWriter::new(std::fs::File::create(path)?);
    writeln!(file, "YUV4MPEG2 W{width} H{height} F25:1 Ip A1:1 C{colorspace}")?;
    for index in 0..frames {
        let value = (index * 40) as u8;
        writeln!(file, "FRAME")?;
        if sample_bytes == 1 {
            file.write_all(&vec![value; samples])?;
        } else {
            let sample = (u16::from(value) << 2).to_le_bytes();
            for _ in 0..samples {
                file.write_all(&sample)?;
            }
        }
    }
    file.flush()
}
