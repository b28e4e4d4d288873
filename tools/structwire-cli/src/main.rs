mod assign;
mod commands;
mod format;

use anyhow::Result;
use clap::{Parser, Subcommand};
use commands::{encode::EncodeArgs, schema::SchemaArgs, show::ShowArgs, transcode::TranscodeArgs};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "structwire", about = "Inspect and convert structwire payloads")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the schema of a built-in shape
    Schema(SchemaArgs),
    /// Build an instance from field assignments and encode it
    Encode(EncodeArgs),
    /// Decode payloads and print their string form
    Show(ShowArgs),
    /// Re-encode a payload under another strategy or protocol
    Transcode(TranscodeArgs),
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Schema(args) => args.run(),
        Commands::Encode(args) => args.run(),
        Commands::Show(args) => args.run(),
        Commands::Transcode(args) => args.run(),
    }
}
