//! Crate-level error for the hide/reveal pipeline.

use thiserror::Error;

use crate::config::ConfigError;
use crate::crypto::CryptoError;
use crate::frame::FrameError;
use crate::qr::QrError;
use crate::scan::ScanError;
use crate::stego::image::LsbError;
use crate::stego::polyglot::PolyglotError;

/// Any error a hide or reveal operation can produce.
#[derive(Error, Debug)]
pub enum StegoError {
    #[error(transparent)]
    Frame(#[from] FrameError),

    #[error(transparent)]
    Crypto(#[from] CryptoError),

    #[error(transparent)]
    Lsb(#[from] LsbError),

    #[error(transparent)]
    Polyglot(#[from] PolyglotError),

    #[error(transparent)]
    Qr(#[from] QrError),

    #[error(transparent)]
    Scan(#[from] ScanError),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl StegoError {
    /// True when the error means the password was wrong, as opposed to
    /// missing or corrupted data.
    pub fn is_wrong_password(&self) -> bool {
        matches!(
            self,
            StegoError::Crypto(CryptoError::AuthenticationFailed)
                | StegoError::Polyglot(PolyglotError::WrongPassword)
        )
    }

    /// True when the carrier simply holds no hidden data.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            StegoError::Polyglot(PolyglotError::NoArchiveFound)
                | StegoError::Lsb(LsbError::Frame(_))
                | StegoError::Frame(_)
        )
    }
}

/// Result alias for the pipeline.
pub type Result<T> = std::result::Result<T, StegoError>;
