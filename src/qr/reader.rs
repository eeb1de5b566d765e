//! QR code reading.
//!
//! Returns the raw symbol text. Splitting off a hidden frame is left to
//! [`super::decompose`].

use std::path::Path;

use image::DynamicImage;
use rqrr::PreparedImage;
use tracing::debug;

use super::QrError;

/// Reads the first decodable QR code in an image and returns its text.
pub fn read_qr(image: &DynamicImage) -> Result<String, QrError> {
    let gray = image.to_luma8();
    let mut prepared = PreparedImage::prepare_from_greyscale(
        gray.width() as usize,
        gray.height() as usize,
        |x, y| gray.get_pixel(x as u32, y as u32)[0],
    );
    let grids = prepared.detect_grids();
    if grids.is_empty() {
        return Err(QrError::NoQrCodeFound);
    }

    let mut last_error = None;
    for grid in &grids {
        match grid.decode() {
            Ok((_, content)) => {
                debug!(grids = grids.len(), text = content.len(), "decoded QR code");
                return Ok(content);
            }
            Err(e) => last_error = Some(e),
        }
    }

    Err(QrError::Read(format!(
        "Failed to decode QR: {:?}",
        last_error
    )))
}

/// Reads a QR code from an image file.
pub fn read_qr_from_file<P: AsRef<Path>>(path: P) -> Result<String, QrError> {
    let image = image::open(path).map_err(|e| QrError::Read(e.to_string()))?;
    read_qr(&image)
}
