use anyhow::Result;
use clap::Parser;

use super::{Context, DecodeArgs, EncodeArgs};

#[derive(Parser, Debug, Default)]
pub struct RunCommand {
    #[command(flatten)]
    pub decode: DecodeArgs,

    #[command(flatten)]
    pub encode: EncodeArgs,
}

impl RunCommand {
    pub fn run(self, context: &Context) -> Result<()> {
        self.decode.run(context)?;
        self.encode.run(context)
    }
}
