//! Inspect command - show the frame header of a PNG.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;

use pixstash::{inspect, Canvas, DecoderConfig};

use super::CommandExecutor;

/// Show the frame header of a PNG image without extracting the payload.
#[derive(Args, Debug)]
pub struct InspectCommand {
    /// PNG image produced by `pixstash encode`
    pub stego_path: PathBuf,

    /// Password used when encoding
    #[arg(short, long, env = "PIXSTASH_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,
}

impl CommandExecutor for InspectCommand {
    fn execute(&self) -> Result<()> {
        let canvas = Canvas::load(&self.stego_path)
            .with_context(|| format!("Failed to load {}", self.stego_path.display()))?;

        let config = DecoderConfig {
            password: self.password.clone(),
        };
        let info = inspect(&canvas, &config)
            .with_context(|| format!("No readable frame in {}", self.stego_path.display()))?;

        println!(
            "Image:       {}x{} ({} pixels)",
            info.width,
            info.height,
            canvas.slot_count()
        );
        println!("Algorithm:   {}", info.algorithm);
        println!("Body:        {} bytes", info.body_len);
        println!("Frame:       {} bytes", info.frame_len);
        println!(
            "Capacity:    {} bytes ({} unused)",
            info.capacity,
            info.unused()
        );

        Ok(())
    }
}
