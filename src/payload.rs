//! Hidden payload and its metadata.
//!
//! Metadata travels inside the frame as the UTF-8 string `name|mimeType`,
//! so neither field may contain the `|` separator.

use std::path::Path;

use crate::frame::FrameError;

/// Separator between the name and MIME type in serialized metadata.
pub const METADATA_SEPARATOR: char = '|';

/// MIME type used when the extension is unknown.
pub const DEFAULT_MIME_TYPE: &str = "application/octet-stream";

/// Name and MIME type of a hidden file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Metadata {
    name: String,
    mime_type: String,
}

impl Metadata {
    /// Creates metadata, rejecting fields that contain the separator.
    pub fn new(name: impl Into<String>, mime_type: impl Into<String>) -> Result<Self, FrameError> {
        let name = name.into();
        let mime_type = mime_type.into();

        if name.contains(METADATA_SEPARATOR) {
            return Err(FrameError::InvalidMetadata(format!(
                "name contains '{}'",
                METADATA_SEPARATOR
            )));
        }
        if mime_type.contains(METADATA_SEPARATOR) {
            return Err(FrameError::InvalidMetadata(format!(
                "MIME type contains '{}'",
                METADATA_SEPARATOR
            )));
        }

        Ok(Self { name, mime_type })
    }

    /// Creates metadata for a file name, guessing the MIME type from its extension.
    pub fn for_file_name(name: impl Into<String>) -> Result<Self, FrameError> {
        let name = name.into();
        let mime_type = guess_mime_type(&name);
        Self::new(name, mime_type)
    }

    /// Original file name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// MIME type of the hidden content.
    pub fn mime_type(&self) -> &str {
        &self.mime_type
    }

    /// Serializes to `name|mimeType` as UTF-8 bytes.
    pub fn to_bytes(&self) -> Vec<u8> {
        format!("{}{}{}", self.name, METADATA_SEPARATOR, self.mime_type).into_bytes()
    }

    /// Parses `name|mimeType`. Exactly one separator is required.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, FrameError> {
        let text = std::str::from_utf8(bytes)
            .map_err(|e| FrameError::InvalidMetadata(format!("not UTF-8: {}", e)))?;

        let separators = text.matches(METADATA_SEPARATOR).count();
        if separators != 1 {
            return Err(FrameError::InvalidMetadata(format!(
                "expected exactly one '{}', found {}",
                METADATA_SEPARATOR, separators
            )));
        }

        let (name, mime_type) = text
            .split_once(METADATA_SEPARATOR)
            .ok_or_else(|| FrameError::InvalidMetadata("missing separator".to_string()))?;

        Ok(Self {
            name: name.to_string(),
            mime_type: mime_type.to_string(),
        })
    }
}

/// Secret content plus its metadata.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Payload {
    /// Raw secret bytes.
    pub data: Vec<u8>,
    /// Name and MIME type.
    pub metadata: Metadata,
}

impl Payload {
    pub fn new(data: Vec<u8>, metadata: Metadata) -> Self {
        Self { data, metadata }
    }

    /// Wraps a text message the way the web form does (`hidden_text.txt`).
    pub fn from_text(text: &str) -> Self {
        Self {
            data: text.as_bytes().to_vec(),
            metadata: Metadata {
                name: "hidden_text.txt".to_string(),
                mime_type: "text/plain".to_string(),
            },
        }
    }
}

/// Guesses a MIME type from a file name's extension.
pub fn guess_mime_type(name: &str) -> &'static str {
    let ext = Path::new(name)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase());

    match ext.as_deref() {
        Some("png") => "image/png",
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("gif") => "image/gif",
        Some("bmp") => "image/bmp",
        Some("webp") => "image/webp",
        Some("pdf") => "application/pdf",
        Some("txt") => "text/plain",
        Some("zip") => "application/zip",
        Some("mp4") => "video/mp4",
        Some("apk") => "application/vnd.android.package-archive",
        Some("doc") => "application/msword",
        Some("docx") => "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
        Some("xlsx") => "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
        _ => DEFAULT_MIME_TYPE,
    }
}
