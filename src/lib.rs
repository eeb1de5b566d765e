//! # InvisioVault - hide files in images, files and QR codes
//!
//! Three carriers share one frame format and one crypto layer:
//!
//! - **Images**: the frame goes into the least significant bit of every R, G
//!   and B channel. Only lossless formats keep it.
//! - **Binary files**: a ZIP archive is appended to any file. The file still
//!   opens normally and the archive can be opened with any ZIP tool.
//! - **QR codes**: the frame rides after the public text as
//!   `#IVDATA:<base64>`. Ordinary scanners drop the fragment.
//!
//! ## Frame
//!
//! ```text
//! hasPassword(1) [salt(16)] metaLength(2, BE) "name|mime" dataLength(4, BE) data
//! ```
//!
//! `data` is zlib-compressed, then encrypted with ChaCha20-Poly1305 under an
//! Argon2id key when a password is given. A wrong password fails
//! authentication instead of producing garbage.
//!
//! ## Example
//!
//! ```rust
//! use image::DynamicImage;
//! use invisiovault::{hide_in_image, reveal_from_image, Metadata, Payload};
//!
//! let carrier = DynamicImage::new_rgb8(16, 16);
//! let payload = Payload::new(
//!     vec![0x41, 0x42, 0x43],
//!     Metadata::new("a.txt", "text/plain").unwrap(),
//! );
//!
//! let stego = hide_in_image(&carrier, &payload, None).unwrap();
//! let revealed = reveal_from_image(&stego, None).unwrap();
//! assert_eq!(revealed, payload);
//! ```
//!
//! ## Modules
//!
//! - [`frame`]: the shared wire format
//! - [`crypto`]: compression and password encryption
//! - [`stego`]: image, polyglot and archive codecs plus the [`Carrier`] enum
//! - [`qr`]: QR fragment codec, rendering and reading
//! - [`capacity`]: fit-before-embed estimates
//! - [`scan`]: the live capture and detection loop
//! - [`encoder`] / [`decoder`]: the hide and reveal pipelines

pub mod capacity;
pub mod config;
pub mod crypto;
pub mod decoder;
pub mod encoder;
pub mod error;
pub mod frame;
pub mod payload;
pub mod qr;
pub mod scan;
pub mod stego;

pub use capacity::{estimate_fit, frame_size, sealed_size, FitEstimate};
pub use config::{ConfigError, FileConfig};
pub use crypto::{open, seal, CryptoError, Sealed};
pub use decoder::{
    open_frame, reveal_from_file, reveal_from_file_with_window, reveal_from_image,
    reveal_from_qr, reveal_from_qr_text,
};
pub use encoder::{
    build_frame, hide_in_file, hide_in_image, hide_in_qr, hide_in_qr_text, hide_in_qr_text_at,
    load_image,
};
pub use error::StegoError;
pub use frame::{decode_frame, encode_frame, Frame, FrameError};
pub use payload::{Metadata, Payload};
pub use qr::{compose, decompose, generate_qr, read_qr, QrError, QrStyle, IVDATA_MARKER};
pub use scan::{ScanError, ScanSession, ScanState};
pub use stego::image::encode_png;
pub use stego::{Carrier, CarrierKind, HiddenFile, LsbError, PolyglotError};
