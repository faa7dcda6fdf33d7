use anyhow::Result;
use clap::Parser;

mod cli;
mod decode;
mod encode;
mod frames;
mod logging;
mod prompt;

fn main() -> Result<()> {
    cli::Args::parse().run()
}
