use std::io;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Core(#[from] odo_core::Error),
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error(transparent)]
    Serialization(#[from] serde_json::Error),
    #[error("Configuration error: {0}")]
    Config(String),
    #[error("Invalid date '{0}': expected YYYY-MM-DD or 'today'")]
    InvalidDate(String),
    #[error("Invalid amount '{0}': expected dollars like 12.50")]
    InvalidAmount(String),
    #[error("Record ID cannot be empty")]
    EmptyRecordId,
    #[error("Unknown record type '{0}'")]
    UnknownRecordType(String),
    #[error("No employee profile configured. Run `odo employee init --name ... --email ...` first.")]
    NoEmployee,
    #[error(
        "Remote sync is not configured. Run `odo config init --remote-url ...` or set ODO_REMOTE_URL."
    )]
    SyncNotConfigured,
}
