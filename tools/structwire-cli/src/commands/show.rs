use std::{fs, path::PathBuf};

use anyhow::{Context, Result};
use clap::Args;

use crate::format::{ProtocolArg, Shape, StrategyArg};

#[derive(Args)]
pub struct ShowArgs {
    /// Encoded payload files
    #[arg(required = true)]
    inputs: Vec<PathBuf>,

    /// Shape the payloads were encoded from
    #[arg(short, long, value_enum)]
    shape: Shape,

    /// Wire strategy
    #[arg(long, value_enum, default_value_t)]
    strategy: StrategyArg,

    /// Byte protocol
    #[arg(long, value_enum, default_value_t)]
    protocol: ProtocolArg,
}

impl ShowArgs {
    pub fn run(self) -> Result<()> {
        let codec = self.strategy.codec();
        let schema = self.shape.schema();
        let prefix = self.inputs.len() > 1;

        for path in &self.inputs {
            let data = fs::read(path).with_context(|| format!("cannot read {}", path.display()))?;
            let instance = codec
                .decode_from_slice(&schema, &data, self.protocol.into())
                .with_context(|| format!("cannot decode {}", path.display()))?;
            if prefix {
                println!("{}: {instance}", path.display());
            } else {
                println!("{instance}");
            }
        }
        Ok(())
    }
}
