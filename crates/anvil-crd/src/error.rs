//! Error types for CRD operations

use thiserror::Error;

/// Errors that can occur when working with CRDs
#[derive(Debug, Error)]
pub enum CrdError {
    /// Missing required field
    #[error("Missing required field: {0}")]
    MissingField(String),

    /// Invalid field value
    #[error("Invalid value for field '{field}': {message}")]
    InvalidFieldValue { field: String, message: String },

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type for CRD operations
pub type Result<T> = std::result::Result<T, CrdError>;
