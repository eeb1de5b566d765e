//! Frame detectors.

use async_trait::async_trait;
use image::DynamicImage;
use tracing::debug;

use super::ScanError;
use crate::qr::{decompose, read_qr, QrError};

/// A QR code found in a frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Detection {
    /// Full symbol text.
    pub text: String,
    /// Text before the hidden data marker, or the whole text.
    pub public: String,
    /// Hidden frame bytes, if the code carries one.
    pub frame: Option<Vec<u8>>,
}

impl Detection {
    pub fn from_text(text: String) -> Result<Self, ScanError> {
        let (public, frame) = decompose(&text)?;
        Ok(Self {
            text,
            public,
            frame,
        })
    }

    pub fn has_hidden_data(&self) -> bool {
        self.frame.is_some()
    }
}

/// Looks for something in a captured frame.
///
/// `Ok(None)` is a miss. Errors are logged by the session and also count as
/// a miss.
#[async_trait]
pub trait Detector: Send + Sync + 'static {
    async fn detect(&self, frame: DynamicImage) -> Result<Option<Detection>, ScanError>;
}

/// Decodes QR codes with `rqrr` on the blocking pool.
///
/// Blocking work cannot be aborted: if the session is stopped mid-decode, the
/// decode already running finishes on the pool and its result is dropped.
/// No further frame is captured or submitted after the stop.
#[derive(Debug, Default, Clone, Copy)]
pub struct QrDetector;

#[async_trait]
impl Detector for QrDetector {
    async fn detect(&self, frame: DynamicImage) -> Result<Option<Detection>, ScanError> {
        let result = tokio::task::spawn_blocking(move || read_qr(&frame))
            .await
            .map_err(|e| ScanError::DetectionFailed(e.to_string()))?;

        match result {
            Ok(text) => Detection::from_text(text).map(Some),
            Err(QrError::NoQrCodeFound) => Ok(None),
            Err(QrError::Read(reason)) => {
                debug!(%reason, "QR code seen but not decodable");
                Ok(None)
            }
            Err(e) => Err(e.into()),
        }
    }
}
