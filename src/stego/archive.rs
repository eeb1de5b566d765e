//! ZIP archive holding the file hidden in a polyglot.
//!
//! One DEFLATE entry named after the hidden file. With a password the entry
//! is encrypted with WinZip AES-256, which authenticates the content with an
//! HMAC. This password is independent of the frame password used by the
//! image and QR carriers.

use std::io::{Cursor, Read, Write};

use tracing::debug;
use zip::result::ZipError;
use zip::write::SimpleFileOptions;
use zip::{AesMode, CompressionMethod, ZipArchive, ZipWriter};

use super::polyglot::PolyglotError;

/// A file recovered from an archive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HiddenFile {
    pub name: String,
    pub data: Vec<u8>,
}

fn archive_error(err: ZipError) -> PolyglotError {
    PolyglotError::Archive(err.to_string())
}

/// Builds a single-entry archive, AES-encrypted when `password` is non-empty.
pub fn build_archive(name: &str, data: &[u8], password: Option<&str>) -> Result<Vec<u8>, PolyglotError> {
    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

    match password.filter(|p| !p.is_empty()) {
        Some(password) => writer
            .start_file(name, options.with_aes_encryption(AesMode::Aes256, password))
            .map_err(archive_error)?,
        None => writer.start_file(name, options).map_err(archive_error)?,
    }

    writer.write_all(data)?;
    let archive = writer.finish().map_err(archive_error)?.into_inner();

    debug!(
        entry = name,
        data = data.len(),
        archive = archive.len(),
        encrypted = password.is_some_and(|p| !p.is_empty()),
        "built archive"
    );
    Ok(archive)
}

/// Reads the first entry of an archive.
pub fn read_archive(archive: &[u8], password: Option<&str>) -> Result<HiddenFile, PolyglotError> {
    let mut zip = ZipArchive::new(Cursor::new(archive)).map_err(archive_error)?;
    if zip.is_empty() {
        return Err(PolyglotError::EmptyArchive);
    }

    let encrypted = zip.by_index_raw(0).map_err(archive_error)?.encrypted();
    let password = password.filter(|p| !p.is_empty());

    let mut entry = match (encrypted, password) {
        (true, None) => return Err(PolyglotError::PasswordRequired),
        (true, Some(password)) => zip
            .by_index_decrypt(0, password.as_bytes())
            .map_err(|e| match e {
                ZipError::InvalidPassword => PolyglotError::WrongPassword,
                other => archive_error(other),
            })?,
        (false, _) => zip.by_index(0).map_err(archive_error)?,
    };

    let name = entry.name().to_string();
    let mut data = Vec::with_capacity(entry.size() as usize);
    entry.read_to_end(&mut data).map_err(|e| {
        if encrypted {
            // AES entries verify an HMAC while streaming
            PolyglotError::WrongPassword
        } else {
            PolyglotError::IoError(e)
        }
    })?;

    Ok(HiddenFile { name, data })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_archive_roundtrip() {
        let archive = build_archive("notes.txt", b"some notes", None).unwrap();
        assert_eq!(&archive[..4], b"PK\x03\x04");
        let mut raw = ZipArchive::new(Cursor::new(&archive[..])).unwrap();
        assert!(!raw.by_index_raw(0).unwrap().encrypted());

        let file = read_archive(&archive, None).unwrap();
        assert_eq!(file.name, "notes.txt");
        assert_eq!(file.data, b"some notes");
    }

    #[test]
    fn test_encrypted_archive_roundtrip() {
        let data: Vec<u8> = (0..2000).map(|i| (i % 251) as u8).collect();
        let archive = build_archive("blob.bin", &data, Some("zip-pass")).unwrap();
        let mut raw = ZipArchive::new(Cursor::new(&archive[..])).unwrap();
        assert!(raw.by_index_raw(0).unwrap().encrypted());

        let file = read_archive(&archive, Some("zip-pass")).unwrap();
        assert_eq!(file.data, data);
    }

    #[test]
    fn test_encrypted_archive_requires_password() {
        let archive = build_archive("a.txt", b"x", Some("pw")).unwrap();
        assert!(matches!(
            read_archive(&archive, None),
            Err(PolyglotError::PasswordRequired)
        ));
    }

    #[test]
    fn test_encrypted_archive_wrong_password() {
        let archive = build_archive("a.txt", b"secret content", Some("right")).unwrap();
        assert!(matches!(
            read_archive(&archive, Some("wrong")),
            Err(PolyglotError::WrongPassword)
        ));
    }

    #[test]
    fn test_password_ignored_for_plain_archive() {
        let archive = build_archive("a.txt", b"x", None).unwrap();
        assert_eq!(read_archive(&archive, Some("pw")).unwrap().data, b"x");
    }

    #[test]
    fn test_garbage_is_not_an_archive() {
        assert!(matches!(
            read_archive(b"definitely not a zip file at all", None),
            Err(PolyglotError::Archive(_))
        ));
    }
}
