//! Live QR scanning.
//!
//! A [`ScanSession`] repeatedly captures a frame from a [`CaptureDevice`],
//! hands it to a [`Detector`] and waits for the answer before scheduling the
//! next attempt. Misses back the interval off; a detection resets it.

mod backoff;
mod capture;
mod detector;
mod session;

pub use backoff::Backoff;
pub use capture::{CameraStats, CaptureDevice, ImageSequence, MockCamera};
pub use detector::{Detection, Detector, QrDetector};
pub use session::{ScanSession, ScanState};

use thiserror::Error;

use crate::qr::QrError;

/// Errors from capture devices, detectors and scan sessions.
#[derive(Debug, Error)]
pub enum ScanError {
    #[error("capture device is not open")]
    NotOpen,

    #[error("failed to open capture device: {0}")]
    OpenFailed(String),

    #[error("failed to capture frame: {0}")]
    CaptureFailed(String),

    #[error("capture device has no more frames")]
    Exhausted,

    #[error("capture device is not available to this session")]
    DeviceUnavailable,

    #[error("detection failed: {0}")]
    DetectionFailed(String),

    #[error("QR error: {0}")]
    Qr(#[from] QrError),

    #[error("invalid scan settings: {0}")]
    InvalidConfig(String),

    #[error("scan task failed: {0}")]
    TaskFailed(String),
}
