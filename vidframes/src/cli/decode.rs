use anyhow::{Result, bail};
use clap::Parser;

use ffmpeg_decode::available_hw_devices;
use ffmpeg_types::HwDeviceType;

use super::Context;
use crate::decode::{DecodeJob, decode_to_images};
use crate::prompt::select_hw_device;

pub const DEFAULT_INPUT: &str = "http://clips.vorwaerts-gmbh.de/big_buck_bunny.mp4";

#[derive(Parser, Debug, Clone)]
pub struct DecodeArgs {
    /// Media file or URL to decode
    #[arg(short, long, default_value = DEFAULT_INPUT)]
    pub input: String,

    /// Hardware device type to decode on (skips the prompt)
    #[arg(long, value_parser = parse_hw_device)]
    pub hw: Option<HwDeviceType>,

    /// Decode in software without asking
    #[arg(long, conflicts_with = "hw")]
    pub no_prompt: bool,

    /// Stop after this many frames
    #[arg(long)]
    pub max_frames: Option<u64>,
}

impl Default for DecodeArgs {
    fn default() -> Self {
        Self {
            input: DEFAULT_INPUT.to_string(),
            hw: None,
            no_prompt: false,
            max_frames: None,
        }
    }
}

fn parse_hw_device(name: &str) -> Result<HwDeviceType, String> {
    HwDeviceType::from_name(name).ok_or_else(|| {
        let known: Vec<_> = HwDeviceType::ALL.iter().map(|t| t.name()).collect();
        format!("unknown device type '{name}', expected one of: {}", known.join(", "))
    })
}

impl DecodeArgs {
    /**
        The device to decode on: the one given on the command line, or the
        interactive choice.
    */
    fn hw_device(&self) -> Result<Option<HwDeviceType>> {
        if let Some(device) = self.hw {
            return Ok(Some(device));
        }
        if self.no_prompt {
            return Ok(None);
        }
        let stdin = std::io::stdin();
        let device = select_hw_device(
            &mut stdin.lock(),
            &mut std::io::stdout(),
            &available_hw_devices(),
        )?;
        Ok(device)
    }

    pub fn run(&self, context: &Context) -> Result<u64> {
        let hw_device = self.hw_device()?;

        std::fs::create_dir_all(&context.output_dir)?;
        println!("Decoding...");
        let frames = decode_to_images(&DecodeJob {
            input: &self.input,
            output_dir: &context.output_dir,
            hw_device,
            max_frames: self.max_frames,
        })?;
        if frames == 0 {
            bail!("no frames were decoded from {}", self.input);
        }
        Ok(frames)
    }
}

#[derive(Parser, Debug, Default)]
pub struct DecodeCommand {
    #[command(flatten)]
    pub args: DecodeArgs,
}

impl DecodeCommand {
    pub fn run(self, context: &Context) -> Result<()> {
        let frames = self.args.run(context)?;
        tracing::info!(frames, "decoded");
        Ok(())
    }
}
