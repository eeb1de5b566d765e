//! InvisioVault - hide files in images, files and QR codes
//!
//! CLI front end for the `invisiovault` library.

mod commands;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::debug;
use tracing_subscriber::EnvFilter;

use commands::{
    CapacityCommand, CommandExecutor, HideCommand, PolyglotCreateCommand, PolyglotExtractCommand,
    QrGenerateCommand, QrReadCommand, RevealCommand, ScanFileCommand,
};
use invisiovault::FileConfig;

/// InvisioVault - hide files in images, files and QR codes
///
/// Images carry data in pixel LSBs, any file can carry an appended ZIP
/// archive, and QR codes carry data after their public text.
#[derive(Parser)]
#[command(name = "invisiovault")]
#[command(version)]
#[command(about = "Steganography for images, arbitrary files and QR codes")]
#[command(long_about = None)]
struct Cli {
    /// TOML configuration file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// More logging (-v debug, -vv trace); RUST_LOG overrides both this and
    /// the config file's [logging] level
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Hide a message or file in an image
    Hide(HideCommand),

    /// Reveal data hidden in an image
    Reveal(RevealCommand),

    /// Show image capacity and whether a payload fits
    Capacity(CapacityCommand),

    /// Append a file to any carrier as a ZIP archive
    PolyglotCreate(PolyglotCreateCommand),

    /// Recover the file appended to a polyglot
    PolyglotExtract(PolyglotExtractCommand),

    /// Generate a QR code with optional hidden data
    QrGenerate(QrGenerateCommand),

    /// Read a QR code and reveal its hidden data
    QrRead(QrReadCommand),

    /// Run the scan loop over saved camera frames
    ScanFile(ScanFileCommand),
}

impl Commands {
    fn executor(&self) -> &dyn CommandExecutor {
        match self {
            Commands::Hide(cmd) => cmd,
            Commands::Reveal(cmd) => cmd,
            Commands::Capacity(cmd) => cmd,
            Commands::PolyglotCreate(cmd) => cmd,
            Commands::PolyglotExtract(cmd) => cmd,
            Commands::QrGenerate(cmd) => cmd,
            Commands::QrRead(cmd) => cmd,
            Commands::ScanFile(cmd) => cmd,
        }
    }
}

fn init_logging(verbose: u8, configured: tracing::Level) {
    let level = match verbose {
        0 => configured,
        1 => tracing::Level::DEBUG,
        _ => tracing::Level::TRACE,
    };
    let filter = EnvFilter::builder()
        .with_default_directive(level.into())
        .from_env_lossy();

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => FileConfig::from_file(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => FileConfig::default(),
    };
    init_logging(cli.verbose, config.logging.level()?);
    debug!(?config, "configuration loaded");

    cli.command.executor().execute(&config)
}
