// Defines the application error taxonomy and a result type alias using the thiserror crate.
use thiserror::Error;

use crate::services::StoreError;

// Make the response module public
pub mod response;

#[derive(Error, Debug)]
pub enum AppError {
    // Missing/empty required fields and unparseable timestamps
    #[error("{0}")]
    Validation(String),

    // Malformed JSON or integer query parameter; carries the parameter name
    #[error("Invalid {0} parameter")]
    InvalidParam(String),

    // Duplicate email on user create/update
    #[error("{0}")]
    Duplicate(String),

    // Task assignment pointing at a user that does not exist
    #[error("{0}")]
    UnknownReference(String),

    #[error("{0}")]
    NotFound(String),

    // The #[from] attribute automatically converts a StoreError into an AppError::Store using the From trait.
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

// Custom result type
pub type AppResult<T> = Result<T, AppError>;
