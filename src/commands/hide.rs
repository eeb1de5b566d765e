//! Hide a message or file in an image.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;

use invisiovault::stego::ImageStego;
use invisiovault::{encode_png, hide_in_image, FileConfig};

use super::{load_payload, CommandExecutor};

/// Hide a message or file in the pixels of an image (output is always PNG).
#[derive(Args, Debug)]
pub struct HideCommand {
    /// Carrier image (PNG, BMP or JPEG)
    #[arg(short, long)]
    pub carrier: PathBuf,

    /// Text message to hide (mutually exclusive with --file)
    #[arg(short, long, conflicts_with = "file")]
    pub message: Option<String>,

    /// File to hide (mutually exclusive with --message)
    #[arg(short, long, conflicts_with = "message")]
    pub file: Option<PathBuf>,

    /// Encrypt the hidden data with this password
    #[arg(short, long)]
    pub password: Option<String>,

    /// Output PNG path
    #[arg(short, long)]
    pub output: PathBuf,
}

impl CommandExecutor for HideCommand {
    fn execute(&self, _config: &FileConfig) -> Result<()> {
        let payload = load_payload(self.message.as_deref(), self.file.as_ref())?;
        let carrier = ImageStego::from_file(&self.carrier)
            .with_context(|| format!("Failed to load carrier {}", self.carrier.display()))?;

        let stego = hide_in_image(carrier.image(), &payload, self.password.as_deref())
            .context("Failed to hide data in image")?;
        let png = encode_png(&stego).context("Failed to encode PNG")?;
        std::fs::write(&self.output, png)
            .with_context(|| format!("Failed to write {}", self.output.display()))?;

        println!("Hidden {} in {}", payload.metadata.name(), self.output.display());
        println!("  Payload: {} bytes", payload.data.len());
        println!("  Capacity: {} bytes", carrier.capacity());
        println!("  Encrypted: {}", self.password.as_deref().is_some_and(|p| !p.is_empty()));
        Ok(())
    }
}
