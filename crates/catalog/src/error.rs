//! Error types for the catalog crate.
//!
//! These cover the "programmer error" end of the taxonomy: values that
//! should never reach the ranking core (unknown enum names, out-of-range
//! star ratings) and individual provider records that cannot be normalized.

use thiserror::Error;

/// Errors raised while building or validating catalog records
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CatalogError {
    /// A mood name that is not one of the ten known moods
    #[error("Unknown mood: {0}")]
    UnknownMood(String),

    /// A theme name that is not one of the twelve known themes
    #[error("Unknown theme: {0}")]
    UnknownTheme(String),

    /// Star ratings are whole numbers from 1 to 5
    #[error("Invalid rating {value}: expected 1-5 stars")]
    InvalidRating { value: u8 },

    /// A raw provider record that cannot be turned into an Episode
    ///
    /// Normalization drops these with a warning instead of failing the batch.
    #[error("Malformed {provider} record: {reason}")]
    MalformedRecord { provider: String, reason: String },
}

/// Convenience type alias for Results in this crate
pub type Result<T> = std::result::Result<T, CatalogError>;
