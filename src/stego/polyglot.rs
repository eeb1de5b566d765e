//! Polyglot files: any carrier followed by a ZIP archive.
//!
//! Most container formats are parsed front to back and stop at their own
//! logical end, ignoring trailing bytes. ZIP readers start from the back,
//! at the end-of-central-directory (EOCD) record. Appending an archive to a
//! carrier therefore yields a file that is still a valid carrier and also a
//! valid archive. The carrier bytes are never modified.
//!
//! The archive is appended unchanged, so its central directory offsets stay
//! relative to the archive start. [`extract_archive`] uses that to recover the
//! exact archive bytes: `start = eocd_pos - cd_size - cd_offset`.

use thiserror::Error;
use tracing::debug;

/// EOCD record signature (`PK\x05\x06`).
pub const EOCD_SIGNATURE: [u8; 4] = [0x50, 0x4b, 0x05, 0x06];

/// Central directory file header signature (`PK\x01\x02`).
pub const CENTRAL_DIRECTORY_SIGNATURE: [u8; 4] = [0x50, 0x4b, 0x01, 0x02];

/// Local file header signature (`PK\x03\x04`).
pub const LOCAL_HEADER_SIGNATURE: [u8; 4] = [0x50, 0x4b, 0x03, 0x04];

/// Fixed part of the EOCD record.
pub const EOCD_LEN: usize = 22;

/// EOCD plus the longest possible archive comment.
pub const DEFAULT_SCAN_WINDOW: usize = EOCD_LEN + u16::MAX as usize;

/// Errors from building or reading polyglot files.
#[derive(Error, Debug)]
pub enum PolyglotError {
    #[error("No hidden archive found in file")]
    NoArchiveFound,

    #[error("Hidden archive is empty")]
    EmptyArchive,

    #[error("Hidden archive is password protected")]
    PasswordRequired,

    #[error("Incorrect password for hidden archive")]
    WrongPassword,

    #[error("Archive error: {0}")]
    Archive(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

/// Where an appended archive sits inside a polyglot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArchiveLocation {
    /// Offset of the first archive byte (== carrier length).
    pub start: usize,
    /// Offset of the EOCD record.
    pub eocd: usize,
    /// Number of entries declared by the EOCD.
    pub entries: u16,
}

/// Concatenates carrier and archive.
pub fn create_polyglot(carrier: &[u8], archive: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(carrier.len() + archive.len());
    out.extend_from_slice(carrier);
    out.extend_from_slice(archive);
    debug!(
        carrier = carrier.len(),
        archive = archive.len(),
        "created polyglot"
    );
    out
}

/// Returns the archive appended to `polyglot`, byte for byte.
pub fn extract_archive(polyglot: &[u8]) -> Result<&[u8], PolyglotError> {
    extract_archive_with_window(polyglot, DEFAULT_SCAN_WINDOW)
}

/// Like [`extract_archive`] with an explicit backward scan window.
pub fn extract_archive_with_window(polyglot: &[u8], window: usize) -> Result<&[u8], PolyglotError> {
    let location = locate_archive(polyglot, window)?;
    Ok(&polyglot[location.start..])
}

/// Scans backward from the end, at most `window` bytes, for a consistent EOCD.
///
/// A candidate is accepted only if its comment runs exactly to end of file
/// and its central directory and first local header sit where it says.
/// ZIP64 archives are not recognised.
pub fn locate_archive(polyglot: &[u8], window: usize) -> Result<ArchiveLocation, PolyglotError> {
    if polyglot.len() < EOCD_LEN {
        return Err(PolyglotError::NoArchiveFound);
    }

    let last = polyglot.len() - EOCD_LEN;
    let first = polyglot.len().saturating_sub(window.max(EOCD_LEN));

    for pos in (first..=last).rev() {
        if polyglot[pos..pos + 4] != EOCD_SIGNATURE {
            continue;
        }
        if let Some(location) = check_eocd(polyglot, pos) {
            debug!(
                start = location.start,
                eocd = location.eocd,
                entries = location.entries,
                "located appended archive"
            );
            return Ok(location);
        }
    }

    Err(PolyglotError::NoArchiveFound)
}

fn read_u16(bytes: &[u8], at: usize) -> u16 {
    u16::from_le_bytes([bytes[at], bytes[at + 1]])
}

fn read_u32(bytes: &[u8], at: usize) -> u32 {
    u32::from_le_bytes([bytes[at], bytes[at + 1], bytes[at + 2], bytes[at + 3]])
}

fn check_eocd(data: &[u8], pos: usize) -> Option<ArchiveLocation> {
    let entries = read_u16(data, pos + 10);
    let cd_size = read_u32(data, pos + 12) as usize;
    let cd_offset = read_u32(data, pos + 16) as usize;
    let comment_len = read_u16(data, pos + 20) as usize;

    if pos + EOCD_LEN + comment_len != data.len() {
        return None;
    }

    let cd_start = pos.checked_sub(cd_size)?;
    let start = cd_start.checked_sub(cd_offset)?;

    if entries > 0 {
        if data.get(cd_start..cd_start + 4)? != CENTRAL_DIRECTORY_SIGNATURE {
            return None;
        }
        if data.get(start..start + 4)? != LOCAL_HEADER_SIGNATURE {
            return None;
        }
    }

    Some(ArchiveLocation {
        start,
        eocd: pos,
        entries,
    })
}
