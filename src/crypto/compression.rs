//! Payload compression.
//!
//! Every payload is zlib-compressed (DEFLATE, best level) before it is
//! optionally encrypted, so more data fits in a given carrier. There is no
//! "stored" fallback: already-compressed inputs grow by a few bytes.
//!
//! Inflated output is capped so a small hostile stream cannot expand without
//! bound.

use std::io::{Read, Write};

use flate2::read::ZlibDecoder;
use flate2::write::ZlibEncoder;
use flate2::Compression;
use thiserror::Error;

/// Compression errors.
#[derive(Error, Debug)]
pub enum CompressionError {
    #[error("Compression failed: {0}")]
    CompressionFailed(String),

    #[error("Decompression failed: {0}")]
    DecompressionFailed(String),

    #[error("Decompressed data exceeds {limit} bytes")]
    TooLarge { limit: usize },
}

/// Upper bound on inflated payload size used by [`decompress`] (256 MiB).
pub const MAX_DECOMPRESSED_LEN: usize = 256 * 1024 * 1024;

/// Compresses data into a zlib stream.
pub fn compress(data: &[u8]) -> Result<Vec<u8>, CompressionError> {
    let mut encoder = ZlibEncoder::new(Vec::with_capacity(data.len() / 2 + 16), Compression::best());
    encoder
        .write_all(data)
        .map_err(|e| CompressionError::CompressionFailed(e.to_string()))?;
    encoder
        .finish()
        .map_err(|e| CompressionError::CompressionFailed(e.to_string()))
}

/// Decompresses a zlib stream produced by [`compress`], up to
/// [`MAX_DECOMPRESSED_LEN`] bytes.
pub fn decompress(data: &[u8]) -> Result<Vec<u8>, CompressionError> {
    decompress_with_limit(data, MAX_DECOMPRESSED_LEN)
}

/// Decompresses a zlib stream, failing once the output passes `limit` bytes.
pub fn decompress_with_limit(data: &[u8], limit: usize) -> Result<Vec<u8>, CompressionError> {
    let mut decoder = ZlibDecoder::new(data).take(limit as u64 + 1);
    let mut decompressed = Vec::new();

    decoder
        .read_to_end(&mut decompressed)
        .map_err(|e| CompressionError::DecompressionFailed(e.to_string()))?;

    if decompressed.len() > limit {
        return Err(CompressionError::TooLarge { limit });
    }
    Ok(decompressed)
}

/// Returns compression ratio (compressed_size / original_size).
/// Values < 1.0 mean compression helped.
pub fn compression_ratio(original: &[u8], compressed: &[u8]) -> f64 {
    if original.is_empty() {
        return 1.0;
    }
    compressed.len() as f64 / original.len() as f64
}
