//! Pixstash - Hide any payload in as few pixels as possible
//!
//! A CLI tool that packs a file into the RGBA channels of a lossless PNG.

mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use commands::{CommandExecutor, DecodeCommand, EncodeCommand, InspectCommand};

/// Pixstash - Hide any payload in as few pixels as possible
///
/// Every pixel carries four full bytes (R, G, B, A). Payloads are compressed
/// with the best of several algorithms and scattered in a password-driven order.
#[derive(Parser)]
#[command(name = "pixstash")]
#[command(version)]
#[command(about = "Hide any payload in the RGBA channels of a minimal PNG")]
#[command(long_about = None)]
struct Cli {
    /// Verbose logging (debug level; RUST_LOG overrides)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Hide a file inside a new PNG image
    Encode(EncodeCommand),

    /// Recover the hidden file from a PNG image
    Decode(DecodeCommand),

    /// Show the frame header of a PNG image without extracting it
    Inspect(InspectCommand),
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Encode(cmd) => cmd.execute(),
        Commands::Decode(cmd) => cmd.execute(),
        Commands::Inspect(cmd) => cmd.execute(),
    }
}

/// Installs the stderr log subscriber.
fn init_logging(verbose: bool) {
    let default_filter = if verbose {
        "pixstash=debug"
    } else {
        "pixstash=warn"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| default_filter.into());
    let fmt_layer = tracing_subscriber::fmt::layer().with_writer(std::io::stderr);

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .init();
}
