//! Capacity report for an image carrier.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;

use invisiovault::crypto::{compress, compression_ratio};
use invisiovault::stego::ImageStego;
use invisiovault::{estimate_fit, frame_size, sealed_size, FileConfig};

use super::{load_payload, CommandExecutor};

/// Show how much an image can hide, and whether a payload would fit.
#[derive(Args, Debug)]
pub struct CapacityCommand {
    /// Carrier image
    #[arg(short, long)]
    pub carrier: PathBuf,

    /// Text message to check (mutually exclusive with --file)
    #[arg(short, long, conflicts_with = "file")]
    pub message: Option<String>,

    /// File to check (mutually exclusive with --message)
    #[arg(short, long, conflicts_with = "message")]
    pub file: Option<PathBuf>,

    /// Account for password encryption overhead
    #[arg(short, long)]
    pub password: bool,
}

impl CommandExecutor for CapacityCommand {
    fn execute(&self, config: &FileConfig) -> Result<()> {
        let carrier = ImageStego::from_file(&self.carrier)
            .with_context(|| format!("Failed to load {}", self.carrier.display()))?;
        let image = carrier.image();
        let capacity = carrier.capacity();

        println!("Carrier: {} ({}x{})", self.carrier.display(), image.width(), image.height());
        println!("  Capacity: {} bytes", capacity);

        if self.message.is_none() && self.file.is_none() {
            return Ok(());
        }

        let payload = load_payload(self.message.as_deref(), self.file.as_ref())?;
        let estimate = estimate_fit(
            capacity,
            payload.data.len(),
            payload.metadata.to_bytes().len(),
            self.password,
            config.capacity.estimated_compression_ratio,
        );
        println!(
            "  Estimated frame: {} bytes ({:.0}% of capacity)",
            estimate.estimated_frame_bytes,
            estimate.usage() * 100.0
        );

        // Encryption adds a fixed overhead, so compressing settles the question
        let compressed = compress(&payload.data).context("Failed to compress payload")?;
        let exact = frame_size(
            payload.metadata.to_bytes().len(),
            sealed_size(compressed.len(), self.password),
            self.password,
        );
        println!(
            "  Actual frame: {} bytes (compression ratio {:.2})",
            exact,
            compression_ratio(&payload.data, &compressed)
        );
        println!("  Fits: {}", if exact <= capacity { "yes" } else { "no" });
        Ok(())
    }
}
