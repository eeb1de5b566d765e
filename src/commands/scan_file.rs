//! Scan a sequence of still frames for QR codes.

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::Args;
use tracing::info;

use invisiovault::scan::{ImageSequence, QrDetector, ScanSession};
use invisiovault::{open_frame, FileConfig};

use super::{write_payload, CommandExecutor};

/// Run the live scan loop over saved camera frames.
///
/// Frames are tried in order with the configured backoff until one carries
/// hidden data (or all are used up with `stop_on_detect = false`).
#[derive(Args, Debug)]
pub struct ScanFileCommand {
    /// Frame images, in capture order
    #[arg(short, long, num_args = 1.., required = true)]
    pub input: Vec<PathBuf>,

    /// Password used when hiding
    #[arg(short, long)]
    pub password: Option<String>,

    /// Where to write the hidden data (defaults to printing text)
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

impl CommandExecutor for ScanFileCommand {
    fn execute(&self, config: &FileConfig) -> Result<()> {
        let frames = self
            .input
            .iter()
            .map(|path| {
                image::open(path).with_context(|| format!("Failed to load {}", path.display()))
            })
            .collect::<Result<Vec<_>>>()?;

        let runtime = tokio::runtime::Builder::new_multi_thread()
            .enable_all()
            .build()
            .context("Failed to start async runtime")?;

        let detections = runtime.block_on(async {
            let mut session =
                ScanSession::new(ImageSequence::new(frames), QrDetector, config.scan.clone())?;
            let mut receiver = session.start().await?;

            let mut found = Vec::new();
            while let Some(detection) = receiver.recv().await {
                info!(public = %detection.public, hidden = detection.has_hidden_data(), "detected");
                found.push(detection);
            }
            session.stop().await?;
            println!("Scanned {} frames, {} attempts", self.input.len(), session.attempts());
            anyhow::Ok(found)
        })?;

        let hit = detections
            .iter()
            .find_map(|d| d.frame.as_deref().map(|frame| (d.public.as_str(), frame)));
        let Some((public, frame)) = hit else {
            for detection in &detections {
                println!("QR code without hidden data: {}", detection.public);
            }
            bail!("No hidden data found in {} frames", self.input.len());
        };

        println!("Public: {}", public);
        let payload = open_frame(frame, self.password.as_deref())
            .context("Failed to reveal hidden QR data")?;
        write_payload(&payload, self.output.as_ref())
    }
}
