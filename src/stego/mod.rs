//! Carrier codecs.
//!
//! - [`image`]: LSB embedding in PNG/BMP pixels
//! - [`polyglot`]: archive appended to any file
//! - [`archive`]: the ZIP archive a polyglot carries
//! - [`carrier`]: one interface over every carrier kind

pub mod archive;
pub mod carrier;
pub mod image;
pub mod polyglot;

pub use self::archive::{build_archive, read_archive, HiddenFile};
pub use self::carrier::{Carrier, CarrierKind};
pub use self::image::{ImageStego, LsbError};
pub use self::polyglot::{create_polyglot, extract_archive, PolyglotError};
