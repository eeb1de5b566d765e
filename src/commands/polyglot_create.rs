//! Polyglot creation command.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;

use invisiovault::{hide_in_file, FileConfig};

use super::{file_name, CommandExecutor};

/// Append a file to any carrier as a ZIP archive.
///
/// The result still opens as the carrier and also opens as a ZIP archive.
#[derive(Args, Debug)]
pub struct PolyglotCreateCommand {
    /// Carrier file (image, PDF, video, ...)
    #[arg(short, long)]
    pub carrier: PathBuf,

    /// File to hide
    #[arg(short, long)]
    pub file: PathBuf,

    /// Encrypt the archive entry (AES-256) with this password
    #[arg(short, long)]
    pub password: Option<String>,

    /// Output path (keep the carrier's extension)
    #[arg(short, long)]
    pub output: PathBuf,
}

impl CommandExecutor for PolyglotCreateCommand {
    fn execute(&self, _config: &FileConfig) -> Result<()> {
        let carrier = std::fs::read(&self.carrier)
            .with_context(|| format!("Failed to read {}", self.carrier.display()))?;
        let secret = std::fs::read(&self.file)
            .with_context(|| format!("Failed to read {}", self.file.display()))?;
        let name = file_name(&self.file)?;

        let polyglot = hide_in_file(&carrier, &name, &secret, self.password.as_deref())
            .context("Failed to build polyglot")?;
        std::fs::write(&self.output, &polyglot)
            .with_context(|| format!("Failed to write {}", self.output.display()))?;

        println!("Polyglot written to: {}", self.output.display());
        println!("  Carrier: {} bytes", carrier.len());
        println!("  Hidden: {} ({} bytes)", name, secret.len());
        println!("  Total: {} bytes", polyglot.len());
        Ok(())
    }
}
