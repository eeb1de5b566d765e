//! QR code reading command.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;

use invisiovault::qr::read_qr_from_file;
use invisiovault::{reveal_from_qr_text, FileConfig};

use super::{write_payload, CommandExecutor};

/// Read a QR code and reveal any hidden data it carries.
#[derive(Args, Debug)]
pub struct QrReadCommand {
    /// Path to image containing QR code
    #[arg(short, long)]
    pub input: PathBuf,

    /// Password used when hiding
    #[arg(short, long)]
    pub password: Option<String>,

    /// Where to write the hidden data (defaults to printing text)
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

impl CommandExecutor for QrReadCommand {
    fn execute(&self, _config: &FileConfig) -> Result<()> {
        let text = read_qr_from_file(&self.input)
            .with_context(|| format!("Failed to read QR code from {}", self.input.display()))?;

        let (public, payload) = reveal_from_qr_text(&text, self.password.as_deref())
            .context("Failed to reveal hidden QR data")?;

        println!("Public: {}", public);
        match payload {
            Some(payload) => write_payload(&payload, self.output.as_ref()),
            None => {
                println!("No hidden data");
                Ok(())
            }
        }
    }
}
