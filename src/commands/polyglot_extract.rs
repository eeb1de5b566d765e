//! Polyglot extraction command.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;

use invisiovault::{reveal_from_file_with_window, FileConfig, Metadata, Payload};

use super::{write_payload, CommandExecutor};

/// Recover the file appended to a polyglot.
#[derive(Args, Debug)]
pub struct PolyglotExtractCommand {
    /// Polyglot file
    #[arg(short, long)]
    pub input: PathBuf,

    /// Archive password, if the entry is encrypted
    #[arg(short, long)]
    pub password: Option<String>,

    /// Output file or directory (defaults to printing text)
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

impl CommandExecutor for PolyglotExtractCommand {
    fn execute(&self, config: &FileConfig) -> Result<()> {
        let polyglot = std::fs::read(&self.input)
            .with_context(|| format!("Failed to read {}", self.input.display()))?;

        let file = reveal_from_file_with_window(
            &polyglot,
            self.password.as_deref(),
            config.polyglot.eocd_scan_window,
        )
        .with_context(|| format!("Failed to extract hidden file from {}", self.input.display()))?;

        let metadata = Metadata::for_file_name(file.name.as_str())
            .with_context(|| format!("Hidden file name {:?} is unusable", file.name))?;
        write_payload(&Payload::new(file.data, metadata), self.output.as_ref())
    }
}
