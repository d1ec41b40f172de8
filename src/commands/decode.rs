//! Decode command - recover a hidden file from a PNG.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;

use pixstash::{decode_file, DecoderConfig};

use super::CommandExecutor;

/// Recover the hidden file from a PNG image.
///
/// The password must match the one used for encoding. A wrong password is
/// not detected as such; it shows up as an unknown algorithm, a truncated
/// frame, or a decompression error.
#[derive(Args, Debug)]
pub struct DecodeCommand {
    /// PNG image produced by `pixstash encode`
    pub stego_path: PathBuf,

    /// Where to write the recovered bytes
    pub output_path: PathBuf,

    /// Password used when encoding
    #[arg(short, long, env = "PIXSTASH_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,
}

impl CommandExecutor for DecodeCommand {
    fn execute(&self) -> Result<()> {
        let config = DecoderConfig {
            password: self.password.clone(),
        };

        let decoded = decode_file(&self.stego_path, &config)
            .with_context(|| format!("Failed to decode {}", self.stego_path.display()))?;

        std::fs::write(&self.output_path, &decoded.data)
            .with_context(|| format!("Failed to write {}", self.output_path.display()))?;

        eprintln!(
            "Decoded {} bytes ({} body, {}) to {}",
            decoded.data.len(),
            decoded.body_len,
            decoded.algorithm.name(),
            self.output_path.display()
        );

        Ok(())
    }
}
