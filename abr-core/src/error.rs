/// Structured error types for the abr-core library.
///
/// Binaries (abr-server, abr-tui) wrap these in `anyhow` at the edges;
/// library consumers match on the variants.
use std::path::PathBuf;
use thiserror::Error;

/// Main error type for abr-core operations
#[derive(Error, Debug)]
pub enum AbrError {
    /// Tab-order persistence call failed (transport or remote error)
    #[error("Tab order backend error: {reason}")]
    Backend { reason: String },

    /// Remote returned a payload we could not decode
    #[error("Malformed tab order payload: {reason}")]
    Payload { reason: String },

    /// Two table columns share an accessor key
    #[error("Duplicate column accessor '{key}'")]
    DuplicateColumn { key: String },

    /// Page size must be positive (and offered, when options are configured)
    #[error("Invalid page size {size}")]
    InvalidPageSize { size: usize },

    /// Page-size selection requested on a table that does not show it
    #[error("Page size selection is disabled for this table")]
    PageSizeSelectionDisabled,

    /// Unknown role or page name
    #[error("Unknown {kind} '{value}'")]
    Unknown { kind: &'static str, value: String },

    /// Config file could not be read
    #[error("Failed to read config {path:?}: {source}")]
    ConfigIo {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Config file is not valid TOML for AbrConfig
    #[error("Configuration error: {reason}")]
    Config { reason: String },
}

/// Result type alias for abr-core operations
pub type Result<T> = std::result::Result<T, AbrError>;

impl AbrError {
    /// Create a backend error from anything displayable
    pub fn backend(reason: impl ToString) -> Self {
        Self::Backend {
            reason: reason.to_string(),
        }
    }

    /// Create a payload decoding error
    pub fn payload(reason: impl ToString) -> Self {
        Self::Payload {
            reason: reason.to_string(),
        }
    }

    /// Create a config error
    pub fn config(reason: impl Into<String>) -> Self {
        Self::Config {
            reason: reason.into(),
        }
    }

    pub fn unknown(kind: &'static str, value: impl Into<String>) -> Self {
        Self::Unknown {
            kind,
            value: value.into(),
        }
    }
}
