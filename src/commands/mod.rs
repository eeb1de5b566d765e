//! Command module - Strategy pattern for CLI commands.
//!
//! Each command is a separate module implementing the `CommandExecutor` trait.

mod capacity;
mod hide;
mod polyglot_create;
mod polyglot_extract;
mod qr_generate;
mod qr_read;
mod reveal;
mod scan_file;

pub use capacity::CapacityCommand;
pub use hide::HideCommand;
pub use polyglot_create::PolyglotCreateCommand;
pub use polyglot_extract::PolyglotExtractCommand;
pub use qr_generate::QrGenerateCommand;
pub use qr_read::QrReadCommand;
pub use reveal::RevealCommand;
pub use scan_file::ScanFileCommand;

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};

use invisiovault::{FileConfig, Metadata, Payload};

/// Trait for command execution - Strategy pattern.
///
/// Each command struct holds its parsed arguments and implements
/// this trait to define its execution logic.
pub trait CommandExecutor {
    /// Executes the command with its parsed arguments.
    fn execute(&self, config: &FileConfig) -> Result<()>;
}

/// Builds the payload from `--message` or `--file`.
pub(crate) fn load_payload(message: Option<&str>, file: Option<&PathBuf>) -> Result<Payload> {
    match (message, file) {
        (Some(text), None) => Ok(Payload::from_text(text)),
        (None, Some(path)) => {
            let data = std::fs::read(path)
                .with_context(|| format!("Failed to read {}", path.display()))?;
            let name = file_name(path)?;
            let metadata = Metadata::for_file_name(name)
                .with_context(|| format!("Unusable file name {}", path.display()))?;
            Ok(Payload::new(data, metadata))
        }
        _ => bail!("Provide exactly one of --message or --file"),
    }
}

/// Final path component as UTF-8.
pub(crate) fn file_name(path: &Path) -> Result<String> {
    path.file_name()
        .and_then(|n| n.to_str())
        .map(str::to_string)
        .with_context(|| format!("{} has no usable file name", path.display()))
}

/// Writes a revealed payload to `output`, or prints it if it is text.
///
/// When `output` is a directory the payload keeps its original name.
pub(crate) fn write_payload(payload: &Payload, output: Option<&PathBuf>) -> Result<()> {
    let name = payload.metadata.name();
    match output {
        Some(path) => {
            let target = if path.is_dir() {
                // Never let a stored name escape the chosen directory
                let stored = Path::new(name)
                    .file_name()
                    .with_context(|| format!("Hidden file name {:?} is unusable", name))?;
                path.join(stored)
            } else {
                path.clone()
            };
            std::fs::write(&target, &payload.data)
                .with_context(|| format!("Failed to write {}", target.display()))?;
            println!("Recovered {} ({}) -> {}", name, payload.metadata.mime_type(), target.display());
            println!("  Size: {} bytes", payload.data.len());
        }
        None => match std::str::from_utf8(&payload.data) {
            Ok(text) if payload.metadata.mime_type().starts_with("text/") => println!("{}", text),
            _ => bail!(
                "Hidden data is {} ({}, {} bytes); use --output to save it",
                name,
                payload.metadata.mime_type(),
                payload.data.len()
            ),
        },
    }
    Ok(())
}
