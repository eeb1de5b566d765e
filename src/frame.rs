//! Frame codec: the on-wire unit every carrier hides.
//!
//! Layout (all lengths big-endian):
//!
//! ```text
//! hasPassword   1 byte   0x00 or 0x01
//! salt         16 bytes  only when hasPassword == 0x01
//! metaLength    2 bytes  u16, length of "name|mimeType" in UTF-8 bytes
//! metadata      metaLength bytes
//! dataLength    4 bytes  u32
//! data          dataLength bytes (compressed, then encrypted if password)
//! ```
//!
//! The codec is purely structural. Compression and encryption happen in
//! [`crate::crypto`] before the data reaches [`encode_frame`].

use std::io::{self, Read};

use thiserror::Error;

use crate::crypto::SALT_LEN;
use crate::payload::Metadata;

/// Byte order of every length field in the frame.
pub const LENGTH_BYTE_ORDER: ByteOrder = ByteOrder::BigEndian;

/// Size of the `hasPassword` flag.
pub const FLAG_LEN: usize = 1;
/// Size of the metadata length field.
pub const METADATA_LENGTH_LEN: usize = 2;
/// Size of the data length field.
pub const DATA_LENGTH_LEN: usize = 4;

const FLAG_NO_PASSWORD: u8 = 0x00;
const FLAG_PASSWORD: u8 = 0x01;

/// Endianness marker for the length fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ByteOrder {
    BigEndian,
}

/// Structural errors while encoding or decoding a frame.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FrameError {
    #[error("Frame truncated: needed {needed} bytes for {field}, only {available} available")]
    Truncated {
        field: &'static str,
        needed: usize,
        available: usize,
    },

    #[error("Invalid metadata: {0}")]
    InvalidMetadata(String),

    #[error("Invalid password flag: {0:#04x}")]
    InvalidPasswordFlag(u8),

    #[error("{field} too large: {len} bytes (max {max})")]
    TooLarge {
        field: &'static str,
        len: usize,
        max: usize,
    },

    #[error("Frame has {0} trailing bytes after declared content")]
    TrailingBytes(usize),
}

/// A decoded frame. The salt is present exactly when the data is password sealed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    pub salt: Option<[u8; SALT_LEN]>,
    pub metadata: Metadata,
    pub data: Vec<u8>,
}

impl Frame {
    pub fn new(salt: Option<[u8; SALT_LEN]>, metadata: Metadata, data: Vec<u8>) -> Self {
        Self {
            salt,
            metadata,
            data,
        }
    }

    pub fn has_password(&self) -> bool {
        self.salt.is_some()
    }

    /// Exact number of bytes [`encode_frame`] produces for this frame.
    pub fn encoded_len(&self) -> usize {
        encoded_len(
            self.metadata.to_bytes().len(),
            self.data.len(),
            self.has_password(),
        )
    }
}

/// Size of a frame with the given field sizes.
pub fn encoded_len(metadata_len: usize, data_len: usize, has_password: bool) -> usize {
    let salt = if has_password { SALT_LEN } else { 0 };
    FLAG_LEN + salt + METADATA_LENGTH_LEN + metadata_len + DATA_LENGTH_LEN + data_len
}

/// Encodes a `u16` length field.
pub fn encode_u16(value: u16) -> [u8; 2] {
    match LENGTH_BYTE_ORDER {
        ByteOrder::BigEndian => value.to_be_bytes(),
    }
}

/// Decodes a `u16` length field.
pub fn decode_u16(bytes: [u8; 2]) -> u16 {
    match LENGTH_BYTE_ORDER {
        ByteOrder::BigEndian => u16::from_be_bytes(bytes),
    }
}

/// Encodes a `u32` length field.
pub fn encode_u32(value: u32) -> [u8; 4] {
    match LENGTH_BYTE_ORDER {
        ByteOrder::BigEndian => value.to_be_bytes(),
    }
}

/// Decodes a `u32` length field.
pub fn decode_u32(bytes: [u8; 4]) -> u32 {
    match LENGTH_BYTE_ORDER {
        ByteOrder::BigEndian => u32::from_be_bytes(bytes),
    }
}

/// Serializes a frame.
pub fn encode_frame(frame: &Frame) -> Result<Vec<u8>, FrameError> {
    let metadata = frame.metadata.to_bytes();

    let metadata_len = u16::try_from(metadata.len()).map_err(|_| FrameError::TooLarge {
        field: "metadata",
        len: metadata.len(),
        max: u16::MAX as usize,
    })?;
    let data_len = u32::try_from(frame.data.len()).map_err(|_| FrameError::TooLarge {
        field: "data",
        len: frame.data.len(),
        max: u32::MAX as usize,
    })?;

    let mut out = Vec::with_capacity(frame.encoded_len());
    match &frame.salt {
        Some(salt) => {
            out.push(FLAG_PASSWORD);
            out.extend_from_slice(salt);
        }
        None => out.push(FLAG_NO_PASSWORD),
    }
    out.extend_from_slice(&encode_u16(metadata_len));
    out.extend_from_slice(&metadata);
    out.extend_from_slice(&encode_u32(data_len));
    out.extend_from_slice(&frame.data);

    Ok(out)
}

/// Parses a frame. The input must contain exactly one frame.
pub fn decode_frame(bytes: &[u8]) -> Result<Frame, FrameError> {
    let mut cursor = bytes;
    let frame = read_frame(&mut cursor)?;

    if !cursor.is_empty() {
        return Err(FrameError::TrailingBytes(cursor.len()));
    }

    Ok(frame)
}

/// Reads one frame from a byte source, consuming only the declared bytes.
pub fn read_frame<R: Read>(reader: &mut R) -> Result<Frame, FrameError> {
    let raw = read_frame_bytes(reader)?;
    parse_frame(&raw)
}

/// Reads the raw bytes of one frame, following its length fields.
///
/// Stops as soon as the declared data has been read, so a reader backed by
/// a large carrier is never drained past the frame.
pub fn read_frame_bytes<R: Read>(reader: &mut R) -> Result<Vec<u8>, FrameError> {
    let mut raw = Vec::new();

    let flag = read_field(reader, &mut raw, "password flag", FLAG_LEN)?[0];
    match flag {
        FLAG_PASSWORD => {
            read_field(reader, &mut raw, "salt", SALT_LEN)?;
        }
        FLAG_NO_PASSWORD => {}
        other => return Err(FrameError::InvalidPasswordFlag(other)),
    }

    let len = read_field(reader, &mut raw, "metadata length", METADATA_LENGTH_LEN)?;
    let metadata_len = decode_u16([len[0], len[1]]) as usize;
    read_field(reader, &mut raw, "metadata", metadata_len)?;

    let len = read_field(reader, &mut raw, "data length", DATA_LENGTH_LEN)?;
    let data_len = decode_u32([len[0], len[1], len[2], len[3]]) as usize;
    read_field(reader, &mut raw, "data", data_len)?;

    Ok(raw)
}

/// Appends exactly `len` bytes from `reader` to `raw` and returns them.
fn read_field<'a, R: Read>(
    reader: &mut R,
    raw: &'a mut Vec<u8>,
    field: &'static str,
    len: usize,
) -> Result<&'a [u8], FrameError> {
    let start = raw.len();
    let read = reader
        .by_ref()
        .take(len as u64)
        .read_to_end(raw)
        .map_err(|_: io::Error| FrameError::Truncated {
            field,
            needed: len,
            available: raw.len() - start,
        })?;

    if read < len {
        return Err(FrameError::Truncated {
            field,
            needed: len,
            available: read,
        });
    }

    Ok(&raw[start..])
}

/// Splits already-bounded frame bytes into fields.
fn parse_frame(raw: &[u8]) -> Result<Frame, FrameError> {
    let mut pos = 0;

    let flag = take(raw, &mut pos, "password flag", FLAG_LEN)?[0];
    let salt = match flag {
        FLAG_PASSWORD => {
            let mut salt = [0u8; SALT_LEN];
            salt.copy_from_slice(take(raw, &mut pos, "salt", SALT_LEN)?);
            Some(salt)
        }
        FLAG_NO_PASSWORD => None,
        other => return Err(FrameError::InvalidPasswordFlag(other)),
    };

    let len = take(raw, &mut pos, "metadata length", METADATA_LENGTH_LEN)?;
    let metadata_len = decode_u16([len[0], len[1]]) as usize;
    let metadata = Metadata::from_bytes(take(raw, &mut pos, "metadata", metadata_len)?)?;

    let len = take(raw, &mut pos, "data length", DATA_LENGTH_LEN)?;
    let data_len = decode_u32([len[0], len[1], len[2], len[3]]) as usize;
    let data = take(raw, &mut pos, "data", data_len)?.to_vec();

    Ok(Frame {
        salt,
        metadata,
        data,
    })
}

fn take<'a>(
    raw: &'a [u8],
    pos: &mut usize,
    field: &'static str,
    len: usize,
) -> Result<&'a [u8], FrameError> {
    let available = raw.len() - *pos;
    if available < len {
        return Err(FrameError::Truncated {
            field,
            needed: len,
            available,
        });
    }
    let slice = &raw[*pos..*pos + len];
    *pos += len;
    Ok(slice)
}
