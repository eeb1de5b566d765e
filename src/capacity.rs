//! Fit-before-embed estimation.
//!
//! The exact size helpers mirror the frame layout. [`estimate_fit`] guesses
//! the compressed size with a fixed ratio instead of running the compressor,
//! so it is only a hint for callers; embedding always checks the real size.

use crate::crypto::{NONCE_LEN, SALT_LEN, TAG_LEN};
use crate::frame;

/// Compression ratio assumed when the real compressed size is unknown.
pub const DEFAULT_COMPRESSION_RATIO: f64 = 0.7;

/// Exact size of a frame with the given metadata and (sealed) data lengths.
pub fn frame_size(metadata_len: usize, data_len: usize, has_password: bool) -> usize {
    frame::encoded_len(metadata_len, data_len, has_password)
}

/// Exact size of sealed data for a given compressed length.
pub fn sealed_size(compressed_len: usize, has_password: bool) -> usize {
    crate::crypto::sealed_len(compressed_len, has_password)
}

/// Bytes a password adds to a frame on top of the unprotected size.
pub const fn password_overhead() -> usize {
    SALT_LEN + NONCE_LEN + TAG_LEN
}

/// Result of [`estimate_fit`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FitEstimate {
    pub estimated_compressed_bytes: usize,
    pub estimated_frame_bytes: usize,
    pub capacity_bytes: usize,
    pub fits: bool,
}

impl FitEstimate {
    /// Fraction of the capacity the estimated frame would use.
    pub fn usage(&self) -> f64 {
        if self.capacity_bytes == 0 {
            return f64::INFINITY;
        }
        self.estimated_frame_bytes as f64 / self.capacity_bytes as f64
    }
}

/// Estimates whether a payload would fit in a carrier of `capacity_bytes`.
///
/// `ratio` is clamped to `(0, 1]`; non-finite or non-positive values fall
/// back to [`DEFAULT_COMPRESSION_RATIO`].
pub fn estimate_fit(
    capacity_bytes: usize,
    raw_len: usize,
    metadata_len: usize,
    has_password: bool,
    ratio: f64,
) -> FitEstimate {
    let ratio = if ratio.is_finite() && ratio > 0.0 {
        ratio.min(1.0)
    } else {
        DEFAULT_COMPRESSION_RATIO
    };

    let estimated_compressed_bytes = (raw_len as f64 * ratio).ceil() as usize;
    let estimated_frame_bytes = frame_size(
        metadata_len,
        sealed_size(estimated_compressed_bytes, has_password),
        has_password,
    );

    FitEstimate {
        estimated_compressed_bytes,
        estimated_frame_bytes,
        capacity_bytes,
        fits: estimated_frame_bytes <= capacity_bytes,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::seal;
    use crate::frame::{encode_frame, Frame};
    use crate::payload::Metadata;

    #[test]
    fn test_frame_size_matches_encoder() {
        let metadata = Metadata::new("a.txt", "text/plain").unwrap();
        for password in [None, Some("pw")] {
            let sealed = seal(b"ABCABCABCABC", password).unwrap();
            let frame = Frame::new(sealed.salt, metadata.clone(), sealed.data.clone());
            let encoded = encode_frame(&frame).unwrap();

            assert_eq!(
                encoded.len(),
                frame_size(metadata.to_bytes().len(), sealed.data.len(), password.is_some())
            );
        }
    }

    #[test]
    fn test_frame_size_without_password() {
        // flag + metaLen + "a.txt|text/plain" + dataLen + data
        assert_eq!(frame_size(16, 3, false), 1 + 2 + 16 + 4 + 3);
        assert_eq!(frame_size(16, 3, true), 1 + 16 + 2 + 16 + 4 + 3);
    }

    #[test]
    fn test_password_overhead() {
        let plain = frame_size(10, sealed_size(100, false), false);
        let protected = frame_size(10, sealed_size(100, true), true);
        assert_eq!(protected - plain, password_overhead());
    }

    #[test]
    fn test_estimate_fit() {
        let estimate = estimate_fit(96, 10, 16, false, DEFAULT_COMPRESSION_RATIO);
        assert_eq!(estimate.estimated_compressed_bytes, 7);
        assert_eq!(estimate.estimated_frame_bytes, 1 + 2 + 16 + 4 + 7);
        assert!(estimate.fits);

        let estimate = estimate_fit(96, 1000, 16, true, DEFAULT_COMPRESSION_RATIO);
        assert!(!estimate.fits);
        assert!(estimate.usage() > 1.0);
    }

    #[test]
    fn test_estimate_fit_exact_boundary() {
        let frame = frame_size(5, 70, false);
        assert!(estimate_fit(frame, 100, 5, false, 0.7).fits);
        assert!(!estimate_fit(frame - 1, 100, 5, false, 0.7).fits);
    }

    #[test]
    fn test_invalid_ratio_falls_back() {
        let default = estimate_fit(1000, 100, 5, false, DEFAULT_COMPRESSION_RATIO);
        assert_eq!(estimate_fit(1000, 100, 5, false, f64::NAN), default);
        assert_eq!(estimate_fit(1000, 100, 5, false, -1.0), default);
        assert_eq!(
            estimate_fit(1000, 100, 5, false, 3.0).estimated_compressed_bytes,
            100
        );
    }

    #[test]
    fn test_zero_capacity() {
        let estimate = estimate_fit(0, 0, 0, false, 0.7);
        assert!(!estimate.fits);
        assert_eq!(estimate.usage(), f64::INFINITY);
    }
}
