//! Revealing pipeline: the inverse of [`crate::encoder`].
//!
//! Wrong passwords surface as `AuthenticationFailed` (frames) or
//! `WrongPassword` (polyglot archives), never as garbage output.

use image::DynamicImage;
use tracing::{debug, info};

use crate::crypto::open;
use crate::error::Result;
use crate::frame::decode_frame;
use crate::payload::Payload;
use crate::qr::{decompose, read_qr};
use crate::stego::archive::{read_archive, HiddenFile};
use crate::stego::image::extract;
use crate::stego::polyglot::{extract_archive_with_window, DEFAULT_SCAN_WINDOW};

/// Decodes frame bytes and opens the sealed data.
pub fn open_frame(frame_bytes: &[u8], password: Option<&str>) -> Result<Payload> {
    let frame = decode_frame(frame_bytes)?;
    debug!(
        protected = frame.has_password(),
        data = frame.data.len(),
        "decoded frame"
    );
    let data = open(&frame.data, frame.salt.as_ref(), password)?;
    Ok(Payload::new(data, frame.metadata))
}

/// Recovers a payload hidden in the pixels of an image.
pub fn reveal_from_image(image: &DynamicImage, password: Option<&str>) -> Result<Payload> {
    let frame = extract(image)?;
    let payload = open_frame(&frame, password)?;
    info!(
        name = payload.metadata.name(),
        payload = payload.data.len(),
        "revealed payload from image"
    );
    Ok(payload)
}

/// Splits QR text and opens the hidden payload, if any.
///
/// A QR code without hidden data yields its text and `None`.
pub fn reveal_from_qr_text(text: &str, password: Option<&str>) -> Result<(String, Option<Payload>)> {
    let (public, frame) = decompose(text)?;
    let payload = match frame {
        Some(frame) => Some(open_frame(&frame, password)?),
        None => None,
    };
    Ok((public, payload))
}

/// Reads a QR code from an image and reveals its hidden payload, if any.
pub fn reveal_from_qr(image: &DynamicImage, password: Option<&str>) -> Result<(String, Option<Payload>)> {
    let text = read_qr(image)?;
    reveal_from_qr_text(&text, password)
}

/// Recovers the file appended to a polyglot.
pub fn reveal_from_file(polyglot: &[u8], password: Option<&str>) -> Result<HiddenFile> {
    reveal_from_file_with_window(polyglot, password, DEFAULT_SCAN_WINDOW)
}

/// Like [`reveal_from_file`] with an explicit trailer scan window.
pub fn reveal_from_file_with_window(
    polyglot: &[u8],
    password: Option<&str>,
    window: usize,
) -> Result<HiddenFile> {
    let archive = extract_archive_with_window(polyglot, window)?;
    let file = read_archive(archive, password)?;
    info!(
        name = %file.name,
        size = file.data.len(),
        "revealed file from polyglot"
    );
    Ok(file)
}
