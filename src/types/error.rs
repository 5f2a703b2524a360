//! Error types for aisqlite.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, DatabaseError>;

/// Every failure surfaced by the query pipeline.
///
/// A query blocked by the modification guard is not an error; see
/// [`crate::llm::GuardVerdict`] and [`crate::ExecutionOutcome`].
#[derive(Error, Debug)]
pub enum DatabaseError {
    /// Catalog or query failure against SQLite, or no open connection.
    #[error("Data access error: {0}")]
    DataAccessError(String),

    /// Query generation requested without a configured credential.
    #[error("Authentication error: {0}")]
    AuthenticationError(String),

    /// Transport or provider failure from the completion service.
    #[error("Service error: {0}")]
    ServiceError(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
}

impl From<rusqlite::Error> for DatabaseError {
    fn from(err: rusqlite::Error) -> Self {
        DatabaseError::DataAccessError(err.to_string())
    }
}

impl From<reqwest::Error> for DatabaseError {
    fn from(err: reqwest::Error) -> Self {
        DatabaseError::ServiceError(err.to_string())
    }
}
