use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("File not found or could not be read: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Failed to parse model description JSON: {0}")]
    DeserializationError(#[from] serde_json::Error),

    /// Invalid entity construction or assignment. Raised immediately, never deferred.
    #[error("ConfigurationError: {0}")]
    ConfigurationError(String),

    /// Structural defects found while validating the model. All violations of one pass are collected.
    #[error("ValidationError: {}", .0.join("; "))]
    ValidationError(Vec<String>),

    /// Unfailing an entity while a prerequisite (endpoint node, SRLG) still holds it down.
    #[error("IllegalStateTransition: {0}")]
    IllegalStateTransition(String),

    #[error("LookupError: {0}")]
    LookupError(String),
}

impl Error {
    pub fn validation(message: impl Into<String>) -> Self {
        Error::ValidationError(vec![message.into()])
    }
}

pub type Result<T> = std::result::Result<T, Error>;
