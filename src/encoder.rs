//! Hiding pipeline.
//!
//! 1. Compress the payload, then encrypt it if a password is given
//! 2. Wrap it in a frame with its metadata
//! 3. Embed the frame in the carrier
//!
//! Files hidden in polyglots skip the frame: they go into a ZIP archive
//! appended to the carrier, with the archive's own encryption.

use image::DynamicImage;
use qrcode::EcLevel;
use tracing::info;

use crate::crypto::seal;
use crate::error::Result;
use crate::frame::{encode_frame, Frame};
use crate::payload::Payload;
use crate::qr::{compose, ensure_fits, generate_qr, QrStyle};
use crate::stego::archive::build_archive;
use crate::stego::image::{embed, LsbError};
use crate::stego::polyglot::create_polyglot;

/// Seals a payload and encodes it as frame bytes.
pub fn build_frame(payload: &Payload, password: Option<&str>) -> Result<Vec<u8>> {
    let sealed = seal(&payload.data, password)?;
    let frame = Frame::new(sealed.salt, payload.metadata.clone(), sealed.data);
    Ok(encode_frame(&frame)?)
}

/// Hides a payload in the pixels of an image.
///
/// Capacity is checked against the real sealed frame, so nothing is written
/// unless the whole frame fits.
pub fn hide_in_image(
    image: &DynamicImage,
    payload: &Payload,
    password: Option<&str>,
) -> Result<DynamicImage> {
    let frame = build_frame(payload, password)?;
    let stego = embed(image, &frame)?;
    info!(
        name = payload.metadata.name(),
        payload = payload.data.len(),
        frame = frame.len(),
        protected = password.is_some_and(|p| !p.is_empty()),
        "hid payload in image"
    );
    Ok(stego)
}

/// Hides a payload after the public text of a QR code.
///
/// The text is sized for the default level-H symbol; use
/// [`hide_in_qr_text_at`] for other error correction levels.
pub fn hide_in_qr_text(public: &str, payload: &Payload, password: Option<&str>) -> Result<String> {
    hide_in_qr_text_at(public, payload, password, EcLevel::H)
}

/// Like [`hide_in_qr_text`], failing up front when the text would not fit a
/// symbol at `ec_level`.
pub fn hide_in_qr_text_at(
    public: &str,
    payload: &Payload,
    password: Option<&str>,
    ec_level: EcLevel,
) -> Result<String> {
    let frame = build_frame(payload, password)?;
    ensure_fits(public.len(), frame.len(), ec_level)?;
    let text = compose(public, &frame)?;
    info!(
        name = payload.metadata.name(),
        frame = frame.len(),
        text = text.len(),
        "hid payload in QR text"
    );
    Ok(text)
}

/// Hides a payload in a QR code and renders it.
pub fn hide_in_qr(
    public: &str,
    payload: &Payload,
    password: Option<&str>,
    style: &QrStyle,
) -> Result<DynamicImage> {
    let text = hide_in_qr_text_at(public, payload, password, style.ec_level)?;
    Ok(generate_qr(&text, style)?)
}

/// Appends a file to `carrier` as a ZIP archive, encrypted if a password is given.
pub fn hide_in_file(
    carrier: &[u8],
    file_name: &str,
    data: &[u8],
    password: Option<&str>,
) -> Result<Vec<u8>> {
    let archive = build_archive(file_name, data, password)?;
    let polyglot = create_polyglot(carrier, &archive);
    info!(
        name = file_name,
        carrier = carrier.len(),
        archive = archive.len(),
        "hid file in polyglot"
    );
    Ok(polyglot)
}

/// Decodes an image from encoded bytes (PNG, BMP, JPEG).
pub fn load_image(bytes: &[u8]) -> Result<DynamicImage> {
    image::load_from_memory(bytes)
        .map_err(|e| LsbError::ImageLoadError(e.to_string()).into())
}
