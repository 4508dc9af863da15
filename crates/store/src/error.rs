use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur when reading or writing preference data
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The backing store cannot be reached right now
    #[error("Store unavailable: {0}")]
    Unavailable(String),

    /// Persisted data exists but cannot be decoded
    #[error("Corrupt store file {path:?}: {reason}")]
    Corrupt { path: PathBuf, reason: String },

    /// A record that must not be persisted or learned from
    #[error("Invalid record: {0}")]
    Invalid(#[from] catalog::CatalogError),
}

pub type Result<T> = std::result::Result<T, StoreError>;
