//! The closed set of carrier kinds behind one embed/extract interface.
//!
//! Image and QR carriers hold a frame. Binary files hold a ZIP archive
//! appended after their own content.

use std::fmt;

use image::DynamicImage;
use qrcode::EcLevel;

use super::archive::{build_archive, read_archive};
use super::image::{capacity_bytes, embed, extract};
use super::polyglot::{create_polyglot, extract_archive, PolyglotError};
use crate::decoder::open_frame;
use crate::encoder::build_frame;
use crate::error::Result;
use crate::payload::{Metadata, Payload};
use crate::qr::{compose, decompose, ensure_fits, max_frame_len};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CarrierKind {
    Image,
    BinaryFile,
    QrText,
}

impl fmt::Display for CarrierKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CarrierKind::Image => write!(f, "image"),
            CarrierKind::BinaryFile => write!(f, "binary file"),
            CarrierKind::QrText => write!(f, "QR text"),
        }
    }
}

/// A carrier holding (or about to hold) hidden data.
#[derive(Debug, Clone, PartialEq)]
pub enum Carrier {
    Image(DynamicImage),
    BinaryFile(Vec<u8>),
    QrText(String),
}

impl Carrier {
    pub fn kind(&self) -> CarrierKind {
        match self {
            Carrier::Image(_) => CarrierKind::Image,
            Carrier::BinaryFile(_) => CarrierKind::BinaryFile,
            Carrier::QrText(_) => CarrierKind::QrText,
        }
    }

    /// Largest hidden unit, in bytes, this carrier can take.
    ///
    /// Binary files have no limit. For QR text this is the largest frame that
    /// still fits a level-H symbol after the public text.
    pub fn capacity_bytes(&self) -> Option<usize> {
        match self {
            Carrier::Image(image) => Some(capacity_bytes(image)),
            Carrier::BinaryFile(_) => None,
            Carrier::QrText(public) => Some(max_frame_len(public.len(), EcLevel::H)),
        }
    }

    /// Embeds a hidden unit: frame bytes for images and QR text, archive
    /// bytes for binary files.
    ///
    /// Fails without producing a carrier when the unit exceeds
    /// [`Carrier::capacity_bytes`].
    pub fn embed(&self, hidden: &[u8]) -> Result<Carrier> {
        Ok(match self {
            Carrier::Image(image) => Carrier::Image(embed(image, hidden)?),
            Carrier::BinaryFile(bytes) => Carrier::BinaryFile(create_polyglot(bytes, hidden)),
            Carrier::QrText(public) => {
                ensure_fits(public.len(), hidden.len(), EcLevel::H)?;
                Carrier::QrText(compose(public, hidden)?)
            }
        })
    }

    /// Extracts the hidden unit, or `None` when the carrier visibly holds
    /// nothing (no archive trailer, no QR marker).
    ///
    /// Images have no presence marker, so a clean image yields a frame error.
    pub fn extract(&self) -> Result<Option<Vec<u8>>> {
        match self {
            Carrier::Image(image) => Ok(Some(extract(image)?)),
            Carrier::BinaryFile(bytes) => match extract_archive(bytes) {
                Ok(archive) => Ok(Some(archive.to_vec())),
                Err(PolyglotError::NoArchiveFound) => Ok(None),
                Err(e) => Err(e.into()),
            },
            Carrier::QrText(text) => Ok(decompose(text)?.1),
        }
    }

    /// Seals a payload and embeds it.
    pub fn hide(&self, payload: &Payload, password: Option<&str>) -> Result<Carrier> {
        let hidden = match self {
            Carrier::BinaryFile(_) => {
                build_archive(payload.metadata.name(), &payload.data, password)?
            }
            Carrier::Image(_) | Carrier::QrText(_) => build_frame(payload, password)?,
        };
        self.embed(&hidden)
    }

    /// Extracts and opens a hidden payload.
    ///
    /// Files recovered from binary carriers get a MIME type guessed from
    /// their name.
    pub fn reveal(&self, password: Option<&str>) -> Result<Option<Payload>> {
        let Some(hidden) = self.extract()? else {
            return Ok(None);
        };
        let payload = match self {
            Carrier::BinaryFile(_) => {
                let file = read_archive(&hidden, password)?;
                Payload::new(file.data, Metadata::for_file_name(file.name)?)
            }
            Carrier::Image(_) | Carrier::QrText(_) => open_frame(&hidden, password)?,
        };
        Ok(Some(payload))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::CryptoError;
    use crate::error::StegoError;
    use crate::qr::QrError;

    fn payload() -> Payload {
        Payload::new(
            b"carried".to_vec(),
            Metadata::new("note.txt", "text/plain").unwrap(),
        )
    }

    fn carriers() -> Vec<Carrier> {
        vec![
            Carrier::Image(DynamicImage::new_rgba8(32, 32)),
            Carrier::BinaryFile(b"%PDF-1.7 tiny".to_vec()),
            Carrier::QrText("https://example.com".to_string()),
        ]
    }

    #[test]
    fn test_every_kind_roundtrips() {
        for carrier in carriers() {
            let kind = carrier.kind();
            let stego = carrier.hide(&payload(), Some("pw")).unwrap();
            assert_eq!(stego.kind(), kind);

            let revealed = stego.reveal(Some("pw")).unwrap().unwrap();
            assert_eq!(revealed.data, b"carried", "{}", kind);
            assert_eq!(revealed.metadata.name(), "note.txt");
            assert_eq!(revealed.metadata.mime_type(), "text/plain");
        }
    }

    #[test]
    fn test_wrong_password_per_kind() {
        for carrier in carriers() {
            let stego = carrier.hide(&payload(), Some("right")).unwrap();
            let err = stego.reveal(Some("wrong")).unwrap_err();
            assert!(err.is_wrong_password(), "{}: {}", carrier.kind(), err);
        }
    }

    #[test]
    fn test_clean_carriers() {
        assert_eq!(carriers()[1].reveal(None).unwrap(), None);
        assert_eq!(carriers()[2].reveal(None).unwrap(), None);
        assert!(carriers()[0].reveal(None).is_err());
    }

    #[test]
    fn test_capacity() {
        let image = Carrier::Image(DynamicImage::new_rgb8(16, 16));
        assert_eq!(image.capacity_bytes(), Some(96));
        assert_eq!(Carrier::BinaryFile(Vec::new()).capacity_bytes(), None);

        let qr = Carrier::QrText(String::new());
        assert_eq!(qr.capacity_bytes(), Some((1273 - 8) / 4 * 3));
    }

    #[test]
    fn test_qr_embed_respects_capacity() {
        let carrier = Carrier::QrText("https://example.com".to_string());
        let capacity = carrier.capacity_bytes().unwrap();
        assert_eq!(capacity, 933);

        assert!(carrier.embed(&vec![7u8; capacity]).is_ok());
        assert!(matches!(
            carrier.embed(&vec![7u8; capacity + 1]),
            Err(StegoError::Qr(QrError::DataTooLarge { max: 1273, .. }))
        ));
    }

    #[test]
    fn test_image_embed_is_all_or_nothing() {
        let carrier = Carrier::Image(DynamicImage::new_rgb8(2, 2));
        assert!(carrier.embed(&[0u8; 2]).is_err());
        assert_eq!(carrier, Carrier::Image(DynamicImage::new_rgb8(2, 2)));
    }

    #[test]
    fn test_missing_password_for_frame() {
        let stego = carriers()[2].hide(&payload(), Some("pw")).unwrap();
        assert!(matches!(
            stego.reveal(None),
            Err(StegoError::Crypto(CryptoError::PasswordRequired))
        ));
    }
}
