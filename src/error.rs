use thiserror::Error;

pub type Result<T, E = VitrineError> = std::result::Result<T, E>;

#[derive(Error, Debug)]
pub enum VitrineError {
    #[error("{field}: {message}")]
    Validation { field: &'static str, message: String },
    #[error("{0} not found")]
    NotFound(&'static str),
    #[error("{0}")]
    Conflict(String),
    #[error("storage unavailable: {0}")]
    StorageUnavailable(std::io::Error),
    #[error("failed to serialize/deserialize DB operation: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl VitrineError {
    pub fn validation(field: &'static str, message: impl Into<String>) -> Self {
        VitrineError::Validation { field, message: message.into() }
    }
}
