//! Error types for verdure-store.

use std::path::PathBuf;

/// Result type for verdure-store operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in verdure-store.
///
/// A storage or connectivity failure is always reported as an error
/// carrying its cause, never silently mapped to an all-unavailable
/// reading — callers decide whether to degrade the display or propagate.
/// An empty store is not an error.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Database error from SQLite.
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// Failed to create database directory.
    #[error("Failed to create database directory {path}: {source}")]
    CreateDirectory {
        path: PathBuf,
        source: std::io::Error,
    },

    /// A stored timestamp could not be interpreted as a calendar date.
    #[error("Invalid stored date: {0}")]
    InvalidDate(String),
}
