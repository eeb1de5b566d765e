//! TOML configuration.
//!
//! Every section is optional; missing keys take the defaults below.
//!
//! ```toml
//! [scan]
//! base_interval_ms = 250
//! max_interval_ms = 4000
//! backoff_factor = 2
//! stop_on_detect = true
//!
//! [qr]
//! ec_level = "H"
//! module_size = 20
//! quiet_zone = 2
//! dark_color = "#000000"
//! light_color = "#FFFFFF"
//!
//! [polyglot]
//! eocd_scan_window = 65557
//!
//! [capacity]
//! estimated_compression_ratio = 0.7
//!
//! [logging]
//! level = "warn"
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::capacity::DEFAULT_COMPRESSION_RATIO;
use crate::qr::{parse_ec_level, parse_hex_color, QrStyle};
use crate::stego::polyglot::{DEFAULT_SCAN_WINDOW, EOCD_LEN};

/// Configuration validation errors.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid [scan] settings: {0}")]
    InvalidScan(String),
    #[error("invalid [qr] settings: {0}")]
    InvalidQr(String),
    #[error("invalid [polyglot] settings: {0}")]
    InvalidPolyglot(String),
    #[error("invalid [capacity] settings: {0}")]
    InvalidCapacity(String),
    #[error("invalid [logging] settings: {0}")]
    InvalidLogging(String),
    #[error("failed to read config file: {0}")]
    FileReadError(String),
    #[error("failed to parse config file: {0}")]
    ParseError(String),
}

/// Full configuration file format.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct FileConfig {
    #[serde(default)]
    pub scan: ScanConfig,
    #[serde(default)]
    pub qr: QrSection,
    #[serde(default)]
    pub polyglot: PolyglotSection,
    #[serde(default)]
    pub capacity: CapacitySection,
    #[serde(default)]
    pub logging: LoggingSection,
}

/// Live scan loop timing.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanConfig {
    /// Delay between attempts while codes are being found.
    pub base_interval_ms: u64,
    /// Ceiling for the delay after repeated misses.
    pub max_interval_ms: u64,
    /// Multiplier applied to the delay after each miss.
    pub backoff_factor: u32,
    /// End the session after the first hidden frame is found.
    pub stop_on_detect: bool,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            base_interval_ms: 250,
            max_interval_ms: 4000,
            backoff_factor: 2,
            stop_on_detect: true,
        }
    }
}

impl ScanConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.base_interval_ms == 0 {
            return Err(ConfigError::InvalidScan(
                "base_interval_ms must be positive".to_string(),
            ));
        }
        if self.max_interval_ms < self.base_interval_ms {
            return Err(ConfigError::InvalidScan(
                "max_interval_ms must be at least base_interval_ms".to_string(),
            ));
        }
        if self.backoff_factor == 0 {
            return Err(ConfigError::InvalidScan(
                "backoff_factor must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

/// QR rendering settings, as written in the file.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct QrSection {
    pub ec_level: String,
    /// Module size in pixels.
    pub module_size: u32,
    /// Quiet zone in modules.
    pub quiet_zone: u32,
    pub dark_color: String,
    pub light_color: String,
}

impl Default for QrSection {
    fn default() -> Self {
        Self {
            ec_level: "H".to_string(),
            module_size: 20,
            quiet_zone: 2,
            dark_color: "#000000".to_string(),
            light_color: "#FFFFFF".to_string(),
        }
    }
}

impl QrSection {
    /// Parses the section into a rendering style.
    pub fn style(&self) -> Result<QrStyle, ConfigError> {
        if self.module_size == 0 {
            return Err(ConfigError::InvalidQr(
                "module_size must be positive".to_string(),
            ));
        }
        let invalid = |e: crate::qr::QrError| ConfigError::InvalidQr(e.to_string());
        Ok(QrStyle {
            ec_level: parse_ec_level(&self.ec_level).map_err(invalid)?,
            module_size: self.module_size,
            quiet_zone: self.quiet_zone,
            dark: parse_hex_color(&self.dark_color).map_err(invalid)?,
            light: parse_hex_color(&self.light_color).map_err(invalid)?,
        })
    }
}

/// Polyglot extraction settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PolyglotSection {
    /// How many trailing bytes to search for the archive trailer.
    pub eocd_scan_window: usize,
}

impl Default for PolyglotSection {
    fn default() -> Self {
        Self {
            eocd_scan_window: DEFAULT_SCAN_WINDOW,
        }
    }
}

/// Capacity estimation settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CapacitySection {
    /// Assumed compressed/raw size ratio for fit estimates.
    pub estimated_compression_ratio: f64,
}

impl Default for CapacitySection {
    fn default() -> Self {
        Self {
            estimated_compression_ratio: DEFAULT_COMPRESSION_RATIO,
        }
    }
}

/// Logging defaults. `-v` and `RUST_LOG` take precedence.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSection {
    /// One of `error`, `warn`, `info`, `debug`, `trace`.
    pub level: String,
}

impl Default for LoggingSection {
    fn default() -> Self {
        Self {
            level: "warn".to_string(),
        }
    }
}

impl LoggingSection {
    pub fn level(&self) -> Result<tracing::Level, ConfigError> {
        self.level
            .trim()
            .parse()
            .map_err(|_| ConfigError::InvalidLogging(format!("unknown level {:?}", self.level)))
    }
}

impl FileConfig {
    /// Loads configuration from a TOML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| ConfigError::FileReadError(e.to_string()))?;
        Self::from_toml_str(&content)
    }

    /// Parses and validates configuration from TOML text.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: FileConfig =
            toml::from_str(content).map_err(|e| ConfigError::ParseError(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Checks every section.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.scan.validate()?;
        self.qr.style()?;
        self.logging.level()?;

        if self.polyglot.eocd_scan_window < EOCD_LEN {
            return Err(ConfigError::InvalidPolyglot(format!(
                "eocd_scan_window must be at least {} bytes",
                EOCD_LEN
            )));
        }

        let ratio = self.capacity.estimated_compression_ratio;
        if !(ratio > 0.0 && ratio <= 1.0) {
            return Err(ConfigError::InvalidCapacity(format!(
                "estimated_compression_ratio must be in (0, 1], got {}",
                ratio
            )));
        }
        Ok(())
    }
}
