//! Error types for odo-core

use thiserror::Error;

/// Result type alias using odo-core's Error
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in odo-core operations
#[derive(Error, Debug)]
pub enum Error {
    /// Database error
    #[error("Database error: {0}")]
    Database(String),

    /// SQLite error
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Record not found
    #[error("Record not found: {0}")]
    NotFound(String),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Remote endpoint error (transient, retryable)
    #[error("Remote endpoint error: {0}")]
    Remote(String),

    /// A sync operation is already in flight
    #[error("Sync already in progress")]
    SyncInProgress,

    /// Sync attempt exceeded its deadline
    #[error("Sync timed out after {0} seconds")]
    SyncTimeout(u64),
}
