//! Error types for nexus-core

use thiserror::Error;

/// Result type alias using nexus-core's Error
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in nexus-core operations
#[derive(Error, Debug)]
pub enum Error {
    /// Remote document store rejected or could not service a call
    #[error("Remote store error: {0}")]
    Remote(String),

    /// Record not found
    #[error("Record not found: {0}")]
    NotFound(String),

    /// Local queue persistence error
    #[error("Persistence error: {0}")]
    Persistence(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
