use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};

mod decode;
mod devices;
mod encode;
mod libraries;
mod run;

pub use decode::{DecodeArgs, DecodeCommand};
pub use devices::DevicesCommand;
pub use encode::{EncodeArgs, EncodeCommand};
pub use libraries::LibrariesCommand;
pub use run::RunCommand;

#[derive(Parser, Debug)]
#[command(name = "vidframes")]
#[command(about = "Decode a video into JPEG frames and encode them back into H.264")]
pub struct Args {
    #[command(subcommand)]
    pub command: Option<Command>,

    /// Directory frame files and the encoded stream are written to
    #[arg(short, long, global = true, default_value = ".")]
    pub output_dir: PathBuf,

    /// Directory holding the FFmpeg shared libraries
    #[arg(long, global = true, env = "FFMPEG_DIR")]
    pub ffmpeg_dir: Option<PathBuf>,

    /// Log everything at debug level, including FFmpeg's verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Decode to frames, then encode the frames (default)
    Run(RunCommand),
    /// Decode a video into numbered JPEG frames
    Decode(DecodeCommand),
    /// Encode numbered JPEG frames into a raw H.264 stream
    Encode(EncodeCommand),
    /// List the hardware device types FFmpeg supports
    Devices(DevicesCommand),
    /// Resolve and load the FFmpeg libraries from a directory
    Libraries(LibrariesCommand),
}

/**
    Options every command sees.
*/
#[derive(Debug)]
pub struct Context {
    pub output_dir: PathBuf,
    pub ffmpeg_dir: Option<PathBuf>,
}

impl Args {
    pub fn run(self) -> Result<()> {
        crate::logging::init(self.verbose);
        print_banner();

        let context = Context {
            output_dir: self.output_dir,
            ffmpeg_dir: self.ffmpeg_dir,
        };
        let command = self
            .command
            .unwrap_or(Command::Run(RunCommand::default()));

        match command {
            Command::Run(cmd) => cmd.run(&context),
            Command::Decode(cmd) => cmd.run(&context),
            Command::Encode(cmd) => cmd.run(&context),
            Command::Devices(cmd) => cmd.run(&context),
            Command::Libraries(cmd) => cmd.run(&context),
        }
    }
}

fn print_banner() {
    match std::env::current_dir() {
        Ok(dir) => println!("Current directory: {}", dir.display()),
        Err(e) => tracing::warn!(error = %e, "current directory is unavailable"),
    }
    let bits = if cfg!(target_pointer_width = "64") { 64 } else { 32 };
    println!("Running in {bits}-bit mode.");
    println!("FFmpeg version info: {}", ffmpeg_native::version_info());
}
