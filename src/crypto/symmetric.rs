//! Password-based authenticated encryption.
//!
//! - Argon2id derives a 256-bit key from the password and a per-call random salt
//! - ChaCha20-Poly1305 encrypts and authenticates
//!
//! Output layout: nonce (12 bytes) || ciphertext || tag (16 bytes)

use argon2::{Algorithm, Argon2, Params, Version};
use chacha20poly1305::{
    aead::{Aead, KeyInit},
    ChaCha20Poly1305, Nonce,
};
use rand::rngs::OsRng;
use rand::RngCore;
use thiserror::Error;
use zeroize::Zeroizing;

/// Salt size for key derivation. Stored in the frame header.
pub const SALT_LEN: usize = 16;

/// Nonce size for ChaCha20Poly1305.
pub const NONCE_LEN: usize = 12;

/// Poly1305 authentication tag size.
pub const TAG_LEN: usize = 16;

/// Argon2id passes over memory. Fixed: changing it breaks every existing carrier.
pub const KDF_ITERATIONS: u32 = 3;

/// Argon2id memory cost in KiB (19 MiB).
pub const KDF_MEMORY_KIB: u32 = 19 * 1024;

/// Argon2id lanes.
pub const KDF_PARALLELISM: u32 = 1;

const KEY_LEN: usize = 32;

/// Errors that can occur during symmetric encryption.
#[derive(Error, Debug)]
pub enum SymmetricError {
    #[error("Encryption failed: {0}")]
    EncryptionFailed(String),

    #[error("Authentication failed")]
    AuthenticationFailed,

    #[error("Invalid ciphertext: {0} bytes is shorter than nonce + tag")]
    CiphertextTooShort(usize),

    #[error("Key derivation failed: {0}")]
    KeyDerivationFailed(String),
}

/// Generates a fresh random salt.
pub fn generate_salt() -> [u8; SALT_LEN] {
    let mut salt = [0u8; SALT_LEN];
    OsRng.fill_bytes(&mut salt);
    salt
}

/// Derives a 256-bit key from a password and salt with Argon2id.
pub fn derive_key(password: &str, salt: &[u8; SALT_LEN]) -> Result<Zeroizing<[u8; KEY_LEN]>, SymmetricError> {
    let params = Params::new(KDF_MEMORY_KIB, KDF_ITERATIONS, KDF_PARALLELISM, Some(KEY_LEN))
        .map_err(|e| SymmetricError::KeyDerivationFailed(e.to_string()))?;
    let argon = Argon2::new(Algorithm::Argon2id, Version::V0x13, params);

    let mut key = Zeroizing::new([0u8; KEY_LEN]);
    argon
        .hash_password_into(password.as_bytes(), salt, &mut *key)
        .map_err(|e| SymmetricError::KeyDerivationFailed(e.to_string()))?;
    Ok(key)
}

/// Encrypts with a key derived from `password` and `salt`.
pub fn encrypt_symmetric(
    plaintext: &[u8],
    password: &str,
    salt: &[u8; SALT_LEN],
) -> Result<Vec<u8>, SymmetricError> {
    let key = derive_key(password, salt)?;

    let mut nonce_bytes = [0u8; NONCE_LEN];
    OsRng.fill_bytes(&mut nonce_bytes);
    let nonce = Nonce::from_slice(&nonce_bytes);

    let cipher = ChaCha20Poly1305::new_from_slice(&*key)
        .map_err(|e| SymmetricError::EncryptionFailed(e.to_string()))?;

    let ciphertext = cipher
        .encrypt(nonce, plaintext)
        .map_err(|e| SymmetricError::EncryptionFailed(e.to_string()))?;

    let mut result = Vec::with_capacity(NONCE_LEN + ciphertext.len());
    result.extend_from_slice(&nonce_bytes);
    result.extend_from_slice(&ciphertext);

    Ok(result)
}

/// Decrypts data produced by [`encrypt_symmetric`].
///
/// A wrong password or tampered ciphertext yields `AuthenticationFailed`.
pub fn decrypt_symmetric(
    data: &[u8],
    password: &str,
    salt: &[u8; SALT_LEN],
) -> Result<Vec<u8>, SymmetricError> {
    if data.len() < NONCE_LEN + TAG_LEN {
        return Err(SymmetricError::CiphertextTooShort(data.len()));
    }

    let (nonce_bytes, ciphertext) = data.split_at(NONCE_LEN);
    let key = derive_key(password, salt)?;

    let cipher = ChaCha20Poly1305::new_from_slice(&*key)
        .map_err(|e| SymmetricError::KeyDerivationFailed(e.to_string()))?;

    cipher
        .decrypt(Nonce::from_slice(nonce_bytes), ciphertext)
        .map_err(|_| SymmetricError::AuthenticationFailed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encrypt_decrypt_roundtrip() {
        let plaintext = b"Hello, InvisioVault!";
        let salt = generate_salt();

        let encrypted = encrypt_symmetric(plaintext, "my_secret_password", &salt).unwrap();
        let decrypted = decrypt_symmetric(&encrypted, "my_secret_password", &salt).unwrap();

        assert_eq!(plaintext.as_slice(), decrypted.as_slice());
        assert_eq!(encrypted.len(), NONCE_LEN + plaintext.len() + TAG_LEN);
    }

    #[test]
    fn test_wrong_password_fails() {
        let salt = generate_salt();
        let encrypted = encrypt_symmetric(b"Secret data", "correct", &salt).unwrap();
        let result = decrypt_symmetric(&encrypted, "wrong", &salt);

        assert!(matches!(result, Err(SymmetricError::AuthenticationFailed)));
    }

    #[test]
    fn test_wrong_salt_fails() {
        let encrypted = encrypt_symmetric(b"Secret data", "pw", &[1u8; SALT_LEN]).unwrap();
        let result = decrypt_symmetric(&encrypted, "pw", &[2u8; SALT_LEN]);

        assert!(matches!(result, Err(SymmetricError::AuthenticationFailed)));
    }

    #[test]
    fn test_tampered_ciphertext_fails() {
        let salt = generate_salt();
        let mut encrypted = encrypt_symmetric(b"Secret data", "pw", &salt).unwrap();
        let last = encrypted.len() - 1;
        encrypted[last] ^= 0x01;

        assert!(matches!(
            decrypt_symmetric(&encrypted, "pw", &salt),
            Err(SymmetricError::AuthenticationFailed)
        ));
    }

    #[test]
    fn test_ciphertext_too_short() {
        let result = decrypt_symmetric(&[0u8; 10], "test", &[0u8; SALT_LEN]);
        assert!(matches!(result, Err(SymmetricError::CiphertextTooShort(10))));
    }

    #[test]
    fn test_key_derivation_is_deterministic_per_salt() {
        let salt = [9u8; SALT_LEN];
        let key1 = derive_key("test_password", &salt).unwrap();
        let key2 = derive_key("test_password", &salt).unwrap();
        let key3 = derive_key("test_password", &[8u8; SALT_LEN]).unwrap();

        assert_eq!(*key1, *key2);
        assert_ne!(*key1, *key3);
    }

    #[test]
    fn test_salts_are_random() {
        assert_ne!(generate_salt(), generate_salt());
    }
}
