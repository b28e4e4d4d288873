use std::{fs, path::PathBuf};

use anyhow::Result;
use clap::Args;
use structwire::core::format_struct_schema;

use crate::format::Shape;

#[derive(Args)]
pub struct SchemaArgs {
    /// Built-in shape to describe
    #[arg(short, long, value_enum)]
    shape: Shape,

    /// Output file path (stdout if not specified)
    #[arg(short, long)]
    output: Option<PathBuf>,
}

impl SchemaArgs {
    pub fn run(self) -> Result<()> {
        let text = format_struct_schema(&self.shape.schema())?;

        match self.output {
            Some(path) => fs::write(path, text)?,
            None => print!("{text}"),
        }
        Ok(())
    }
}
