//! Error types for data parsing in verdure-types.

use thiserror::Error;

/// Errors that can occur when parsing Verdure value types.
///
/// This error type is platform-agnostic and does not include
/// storage-specific errors (those belong in verdure-store).
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ParseError {
    /// A date string was not in canonical `YYYY-MM-DD` form, or the
    /// components do not name a real calendar day.
    #[error("Invalid calendar date: {0}")]
    InvalidDate(String),

    /// A metric label did not match any of the six known metrics.
    #[error("Unknown metric: {0}")]
    UnknownMetric(String),
}

/// Result type alias using verdure-types' ParseError type.
pub type ParseResult<T> = std::result::Result<T, ParseError>;
