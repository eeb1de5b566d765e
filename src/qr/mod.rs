//! QR carrier: a public string with a frame riding after a fragment marker.
//!
//! The symbol text is `public ++ "#IVDATA:" ++ base64(frame)`. Generic
//! scanners and browsers drop everything after `#`, so they only see the
//! public part. Because the secret is part of the symbol's text rather than
//! its pixels, it survives printing, photographing and re-rendering.

mod generator;
mod reader;

pub use generator::{
    generate_qr, generate_qr_svg, generate_qr_to_file, generate_qr_with_logo, overlay_logo,
    parse_ec_level, parse_hex_color, qr_capacity, QrFormat, QrStyle, LOGO_MAX_FRACTION,
};
pub use reader::{read_qr, read_qr_from_file};

use base64::{engine::general_purpose::STANDARD, Engine};
use qrcode::EcLevel;
use thiserror::Error;
use tracing::debug;

/// Reserved literal separating the public text from the hidden frame.
pub const IVDATA_MARKER: &str = "#IVDATA:";

/// Errors that can occur during QR code operations.
#[derive(Error, Debug)]
pub enum QrError {
    #[error("Public text must not contain the reserved marker \"#IVDATA:\"")]
    AmbiguousMarker,

    #[error("Hidden QR data is not valid base64: {0}")]
    InvalidEncoding(String),

    #[error("Data too large for QR code: {size} bytes, max {max} bytes")]
    DataTooLarge { size: usize, max: usize },

    #[error("QR code generation failed: {0}")]
    Generation(String),

    #[error("Invalid QR style: {0}")]
    InvalidStyle(String),

    #[error("Image save error: {0}")]
    ImageSaveError(String),

    #[error("QR code read error: {0}")]
    Read(String),

    #[error("No QR code found in image")]
    NoQrCodeFound,

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

/// Joins the public text and a frame into one QR payload string.
pub fn compose(public: &str, frame: &[u8]) -> Result<String, QrError> {
    if public.contains(IVDATA_MARKER) {
        return Err(QrError::AmbiguousMarker);
    }

    let encoded = STANDARD.encode(frame);
    let mut text = String::with_capacity(public.len() + IVDATA_MARKER.len() + encoded.len());
    text.push_str(public);
    text.push_str(IVDATA_MARKER);
    text.push_str(&encoded);

    debug!(public = public.len(), frame = frame.len(), text = text.len(), "composed QR text");
    Ok(text)
}

/// Splits a QR payload string into its public text and hidden frame.
///
/// Text without the marker is an ordinary QR code: the whole text comes back
/// as the public part with no frame, and that is not an error.
pub fn decompose(text: &str) -> Result<(String, Option<Vec<u8>>), QrError> {
    match text.split_once(IVDATA_MARKER) {
        Some((public, encoded)) => {
            let frame = STANDARD
                .decode(encoded.trim_end())
                .map_err(|e| QrError::InvalidEncoding(e.to_string()))?;
            Ok((public.to_string(), Some(frame)))
        }
        None => Ok((text.to_string(), None)),
    }
}

/// Length of the composed string for a given public text and frame size.
pub fn composed_len(public_len: usize, frame_len: usize) -> usize {
    public_len + IVDATA_MARKER.len() + frame_len.div_ceil(3) * 4
}

/// Largest frame that still fits after `public_len` bytes of public text in
/// a symbol at `ec_level`.
pub fn max_frame_len(public_len: usize, ec_level: EcLevel) -> usize {
    let room = qr_capacity(ec_level).saturating_sub(public_len + IVDATA_MARKER.len());
    room / 4 * 3
}

/// Fails with [`QrError::DataTooLarge`] when the composed text would not fit
/// a symbol at `ec_level`.
pub fn ensure_fits(public_len: usize, frame_len: usize, ec_level: EcLevel) -> Result<(), QrError> {
    let size = composed_len(public_len, frame_len);
    let max = qr_capacity(ec_level);
    if size > max {
        return Err(QrError::DataTooLarge { size, max });
    }
    Ok(())
}
