//! Compression and optional password encryption of payload bytes.
//!
//! `seal` always compresses, then encrypts when a password is given.
//! `open` reverses the order. The two failure modes stay distinct:
//! a wrong password is `AuthenticationFailed`, anything that decrypts (or
//! was never encrypted) but fails to inflate is `CorruptPayload`.

pub mod compression;
pub mod symmetric;

pub use compression::{
    compress, compression_ratio, decompress, decompress_with_limit, CompressionError,
    MAX_DECOMPRESSED_LEN,
};
pub use symmetric::{
    decrypt_symmetric, derive_key, encrypt_symmetric, generate_salt, SymmetricError,
    KDF_ITERATIONS, KDF_MEMORY_KIB, NONCE_LEN, SALT_LEN, TAG_LEN,
};

use thiserror::Error;
use tracing::debug;

/// Errors from sealing or opening a payload.
#[derive(Error, Debug)]
pub enum CryptoError {
    #[error("Authentication failed: wrong password or tampered data")]
    AuthenticationFailed,

    #[error("Corrupt payload: {0}")]
    CorruptPayload(String),

    #[error("This payload is password protected")]
    PasswordRequired,

    #[error("Key derivation failed: {0}")]
    KeyDerivation(String),

    #[error("Encryption failed: {0}")]
    Encryption(String),

    #[error("Compression failed: {0}")]
    Compression(String),
}

impl From<SymmetricError> for CryptoError {
    fn from(err: SymmetricError) -> Self {
        match err {
            SymmetricError::AuthenticationFailed => CryptoError::AuthenticationFailed,
            SymmetricError::CiphertextTooShort(len) => {
                CryptoError::CorruptPayload(format!("ciphertext too short ({} bytes)", len))
            }
            SymmetricError::KeyDerivationFailed(e) => CryptoError::KeyDerivation(e),
            SymmetricError::EncryptionFailed(e) => CryptoError::Encryption(e),
        }
    }
}

/// Output of [`seal`]. The salt is present exactly when a password was used.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sealed {
    pub data: Vec<u8>,
    pub salt: Option<[u8; SALT_LEN]>,
}

impl Sealed {
    pub fn has_password(&self) -> bool {
        self.salt.is_some()
    }
}

/// Treats an empty password the same as no password.
fn effective_password(password: Option<&str>) -> Option<&str> {
    password.filter(|p| !p.is_empty())
}

/// Compresses `raw`, then encrypts it when a non-empty password is given.
pub fn seal(raw: &[u8], password: Option<&str>) -> Result<Sealed, CryptoError> {
    let compressed = compress(raw).map_err(|e| CryptoError::Compression(e.to_string()))?;
    debug!(
        raw = raw.len(),
        compressed = compressed.len(),
        "compressed payload"
    );

    match effective_password(password) {
        Some(password) => {
            let salt = generate_salt();
            let data = encrypt_symmetric(&compressed, password, &salt)?;
            Ok(Sealed {
                data,
                salt: Some(salt),
            })
        }
        None => Ok(Sealed {
            data: compressed,
            salt: None,
        }),
    }
}

/// Reverses [`seal`]: decrypts when `salt` is present, then decompresses.
///
/// A password supplied for an unprotected payload is ignored.
pub fn open(
    sealed: &[u8],
    salt: Option<&[u8; SALT_LEN]>,
    password: Option<&str>,
) -> Result<Vec<u8>, CryptoError> {
    let compressed = match (salt, effective_password(password)) {
        (Some(salt), Some(password)) => decrypt_symmetric(sealed, password, salt)?,
        (Some(_), None) => return Err(CryptoError::PasswordRequired),
        (None, Some(_)) => {
            debug!("password supplied for an unprotected payload, ignoring");
            sealed.to_vec()
        }
        (None, None) => sealed.to_vec(),
    };

    decompress(&compressed).map_err(|e| CryptoError::CorruptPayload(e.to_string()))
}

/// Size of sealed data for a given compressed length.
pub fn sealed_len(compressed_len: usize, has_password: bool) -> usize {
    if has_password {
        NONCE_LEN + compressed_len + TAG_LEN
    } else {
        compressed_len
    }
}
