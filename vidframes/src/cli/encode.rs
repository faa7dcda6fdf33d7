use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;

use ffmpeg_encode::EncoderPreset;
use ffmpeg_types::CodecId;

use super::Context;
use crate::encode::{EncodeJob, encode_images};

pub const DEFAULT_FPS: i32 = 25;
pub const DEFAULT_CRF: u8 = 23;

#[derive(Parser, Debug, Clone)]
pub struct EncodeArgs {
    /// Output frame rate
    #[arg(long, default_value_t = DEFAULT_FPS)]
    pub fps: i32,

    /// Constant rate factor, 0-51, lower is better
    #[arg(long, default_value_t = DEFAULT_CRF, value_parser = clap::value_parser!(u8).range(0..=51))]
    pub crf: u8,

    /// Encoder speed preset
    #[arg(long, default_value_t = EncoderPreset::Medium)]
    pub preset: EncoderPreset,

    /// Output file name, relative to the output directory
    #[arg(long, default_value = "out.h264")]
    pub output: PathBuf,
}

impl Default for EncodeArgs {
    fn default() -> Self {
        Self {
            fps: DEFAULT_FPS,
            crf: DEFAULT_CRF,
            preset: EncoderPreset::Medium,
            output: PathBuf::from("out.h264"),
        }
    }
}

impl EncodeArgs {
    pub fn run(&self, context: &Context) -> Result<()> {
        println!("Encoding...");
        let output = context.output_dir.join(&self.output);
        encode_images(&EncodeJob {
            frames_dir: &context.output_dir,
            output: &output,
            codec: CodecId::H264,
            fps: self.fps,
            crf: self.crf,
            preset: self.preset,
        })?;
        Ok(())
    }
}

#[derive(Parser, Debug, Default)]
pub struct EncodeCommand {
    #[command(flatten)]
    pub args: EncodeArgs,
}

impl EncodeCommand {
    pub fn run(self, context: &Context) -> Result<()> {
        self.args.run(context)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_clap() {
        let parsed = EncodeCommand::try_parse_from(["encode"]).unwrap().args;
        let default = EncodeArgs::default();
        assert_eq!(parsed.fps, default.fps);
        assert_eq!(parsed.crf, default.crf);
        assert_eq!(parsed.preset, default.preset);
        assert_eq!(parsed.output, default.output);
    }

    #[test]
    fn parses_preset_and_rejects_bad_crf() {
        let parsed = EncodeCommand::try_parse_from(["encode", "--preset", "veryfast"])
            .unwrap()
            .args;
        assert_eq!(parsed.preset, EncoderPreset::Veryfast);
        assert!(EncodeCommand::try_parse_from(["encode", "--crf", "60"]).is_err());
    }
}
