use std::{
    fs,
    io::{self, Write},
    path::PathBuf,
};

use anyhow::{Context, Result};
use clap::Args;
use structwire::core::StructInstance;
use tracing::debug;

use crate::{
    assign::{apply, parse_assignment},
    format::{ProtocolArg, Shape, StrategyArg},
};

#[derive(Args)]
pub struct EncodeArgs {
    /// Shape of the instance to build
    #[arg(short, long, value_enum)]
    shape: Shape,

    /// Field assignment: FIELD=VALUE, FIELD.KEY=VALUE for maps; repeat for list/set elements
    #[arg(long = "set", value_parser = parse_assignment)]
    assignments: Vec<(String, String)>,

    /// Wire strategy
    #[arg(long, value_enum, default_value_t)]
    strategy: StrategyArg,

    /// Byte protocol
    #[arg(long, value_enum, default_value_t)]
    protocol: ProtocolArg,

    /// Output file path (stdout if not specified)
    #[arg(short, long)]
    output: Option<PathBuf>,
}

impl EncodeArgs {
    pub fn run(self) -> Result<()> {
        let mut instance = StructInstance::new(self.shape.schema());
        for (target, text) in &self.assignments {
            apply(&mut instance, target, text)
                .with_context(|| format!("cannot apply --set {target}={text}"))?;
        }

        let bytes = self
            .strategy
            .codec()
            .encode_to_vec(&instance, self.protocol.into())?;
        debug!(instance = %instance, len = bytes.len(), "encoded");

        match self.output {
            Some(path) => fs::write(path, bytes)?,
            None => io::stdout().lock().write_all(&bytes)?,
        }
        Ok(())
    }
}
