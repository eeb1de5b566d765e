//! Reveal data hidden in an image.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;

use invisiovault::stego::ImageStego;
use invisiovault::{reveal_from_image, FileConfig};

use super::{write_payload, CommandExecutor};

/// Reveal a message or file hidden in an image.
///
/// Text is printed; anything else needs --output (a file or a directory).
#[derive(Args, Debug)]
pub struct RevealCommand {
    /// Image containing hidden data
    #[arg(short, long)]
    pub input: PathBuf,

    /// Password used when hiding
    #[arg(short, long)]
    pub password: Option<String>,

    /// Where to write the recovered data
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

impl CommandExecutor for RevealCommand {
    fn execute(&self, _config: &FileConfig) -> Result<()> {
        let image = ImageStego::from_file(&self.input)
            .with_context(|| format!("Failed to load {}", self.input.display()))?;

        let payload = reveal_from_image(image.image(), self.password.as_deref()).map_err(|e| {
            if e.is_wrong_password() {
                anyhow::anyhow!("Wrong password")
            } else {
                anyhow::Error::from(e).context("No hidden data found")
            }
        })?;

        write_payload(&payload, self.output.as_ref())
    }
}
