//! Error types for the ledger writer and its spreadsheet engine.

use std::path::PathBuf;

use thiserror::Error;

/// Result alias used across the crate.
pub type Result<T> = std::result::Result<T, LedgerError>;

/// Everything that can go wrong while building or saving a ledger.
#[derive(Debug, Error)]
pub enum LedgerError {
    /// A required input was absent or malformed. Raised before anything is mutated.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// The destination could not be opened or written.
    #[error("unable to write {}: {source}", path.display())]
    IoFailure {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// `app.time_zone` (or another setting) is missing or unusable.
    #[error("configuration error: {0}")]
    Configuration(#[from] ConfigError),

    /// The in-memory document or its zip packaging refused an operation.
    #[error("spreadsheet engine error: {0}")]
    Engine(String),

    /// Transactions could not be read from CSV input.
    #[error("import error: {0}")]
    Import(#[from] csv::Error),

    /// The writer was already saved; its document is gone.
    #[error("ledger writer is closed")]
    Closed,
}

impl From<zip::result::ZipError> for LedgerError {
    fn from(e: zip::result::ZipError) -> Self {
        LedgerError::Engine(e.to_string())
    }
}

/// Failures resolving configuration values.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing configuration key `{0}`")]
    MissingKey(String),

    #[error("`{key}` is not a valid time zone: {value}")]
    InvalidTimeZone { key: String, value: String },

    #[error("unable to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
