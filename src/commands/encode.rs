//! Encode command - hide a file inside a new PNG.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;

use pixstash::compression::compression_ratio;
use pixstash::{encode_file, EncoderConfig};

use super::CommandExecutor;

/// Hide a file inside a new PNG image.
///
/// Without --cover, the PNG is a near-square noise image just large enough
/// for the payload. With --cover, the output has the cover's dimensions but
/// none of its pixels.
#[derive(Args, Debug)]
pub struct EncodeCommand {
    /// File to hide (any content)
    pub text_path: PathBuf,

    /// Where to write the PNG
    pub output_path: PathBuf,

    /// Existing RGB/RGBA image whose dimensions the output should use
    #[arg(short, long)]
    pub cover: Option<PathBuf>,

    /// Password that scrambles the pixel order (does NOT encrypt)
    #[arg(short, long, env = "PIXSTASH_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,

    /// Store the payload uncompressed
    #[arg(long)]
    pub no_compress: bool,
}

impl CommandExecutor for EncodeCommand {
    fn execute(&self) -> Result<()> {
        let config = EncoderConfig {
            compress: !self.no_compress,
            password: self.password.clone(),
        };

        let encoded = encode_file(
            &self.text_path,
            &self.output_path,
            self.cover.as_deref(),
            &config,
        )
        .with_context(|| format!("Failed to encode {}", self.text_path.display()))?;

        eprintln!(
            "Encoded {} bytes as {} ({} bytes, {:.1}% of original)",
            encoded.payload_len,
            encoded.algorithm.name(),
            encoded.body_len,
            compression_ratio(encoded.payload_len, encoded.body_len) * 100.0
        );
        eprintln!(
            "Wrote {}x{} PNG to {} ({} of {} pixels used)",
            encoded.canvas.width(),
            encoded.canvas.height(),
            self.output_path.display(),
            encoded.used_pixels,
            encoded.canvas.slot_count()
        );

        Ok(())
    }
}
