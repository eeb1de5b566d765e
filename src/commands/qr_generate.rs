//! QR code generation command.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;

use invisiovault::qr::{generate_qr_to_file, QrFormat};
use invisiovault::{hide_in_qr_text_at, FileConfig};

use super::{load_payload, CommandExecutor};

/// Generate a QR code, optionally carrying hidden data after the public text.
///
/// Ordinary scanners only see the public text.
#[derive(Args, Debug)]
pub struct QrGenerateCommand {
    /// Public text or URL everyone sees
    #[arg(long)]
    pub public: String,

    /// Text message to hide (mutually exclusive with --file)
    #[arg(short, long, conflicts_with = "file")]
    pub message: Option<String>,

    /// Small file to hide (mutually exclusive with --message)
    #[arg(short, long, conflicts_with = "message")]
    pub file: Option<PathBuf>,

    /// Encrypt the hidden data with this password
    #[arg(short, long)]
    pub password: Option<String>,

    /// Logo image to place at the centre (PNG output only)
    #[arg(long)]
    pub logo: Option<PathBuf>,

    /// Output file path (.png or .svg)
    #[arg(short, long)]
    pub output: PathBuf,
}

impl CommandExecutor for QrGenerateCommand {
    fn execute(&self, config: &FileConfig) -> Result<()> {
        let style = config.qr.style()?;

        let text = if self.message.is_some() || self.file.is_some() {
            let payload = load_payload(self.message.as_deref(), self.file.as_ref())?;
            hide_in_qr_text_at(&self.public, &payload, self.password.as_deref(), style.ec_level)
                .context("Failed to hide data in QR text")?
        } else {
            self.public.clone()
        };

        let logo = self
            .logo
            .as_ref()
            .map(|path| {
                image::open(path).with_context(|| format!("Failed to load logo {}", path.display()))
            })
            .transpose()?;

        let format = QrFormat::for_path(&self.output);
        generate_qr_to_file(&text, &self.output, &style, format, logo.as_ref())
            .context("Failed to generate QR code")?;

        println!("QR code generated: {}", self.output.display());
        println!("  Text: {} bytes", text.len());
        println!("  Format: {:?}", format);
        if let Some(path) = &self.logo {
            println!("  Logo: {}", path.display());
        }
        Ok(())
    }
}
