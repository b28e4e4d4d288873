use std::{fs, path::PathBuf};

use anyhow::{Context, Result};
use clap::Args;
use tracing::info;

use crate::format::{ProtocolArg, Shape, StrategyArg};

#[derive(Args)]
pub struct TranscodeArgs {
    /// Encoded payload file
    input: PathBuf,

    /// Shape the payload was encoded from
    #[arg(short, long, value_enum)]
    shape: Shape,

    #[arg(long, value_enum, default_value_t)]
    from_strategy: StrategyArg,

    #[arg(long, value_enum, default_value_t)]
    from_protocol: ProtocolArg,

    #[arg(long, value_enum, default_value_t)]
    to_strategy: StrategyArg,

    #[arg(long, value_enum, default_value_t)]
    to_protocol: ProtocolArg,

    /// Output file path
    #[arg(short, long)]
    output: PathBuf,
}

impl TranscodeArgs {
    pub fn run(self) -> Result<()> {
        let data = fs::read(&self.input)
            .with_context(|| format!("cannot read {}", self.input.display()))?;
        let instance = self.from_strategy.codec().decode_from_slice(
            &self.shape.schema(),
            &data,
            self.from_protocol.into(),
        )?;
        let bytes = self
            .to_strategy
            .codec()
            .encode_to_vec(&instance, self.to_protocol.into())?;

        fs::write(&self.output, &bytes)?;
        info!(
            input = %self.input.display(),
            output = %self.output.display(),
            from = data.len(),
            to = bytes.len(),
            "transcoded"
        );
        Ok(())
    }
}
