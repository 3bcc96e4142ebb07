//! Error types for pointclass

use thiserror::Error;

/// Main error type for pointclass operations
#[derive(Error, Debug)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid PLY file: {0}")]
    Format(String),

    #[error("Unsupported file extension: {0}")]
    UnsupportedExtension(String),

    #[error("Invalid class mapping: {0}")]
    ConfigParse(String),

    #[error("Invalid data: {0}")]
    InvalidData(String),

    #[error("Algorithm error: {0}")]
    Algorithm(String),

    #[error("Unsupported operation: {0}")]
    Unsupported(String),
}

impl Error {
    pub(crate) fn invalid_data(message: impl Into<String>) -> Self {
        Error::InvalidData(message.into())
    }
}

/// Result type alias for pointclass operations
pub type Result<T> = std::result::Result<T, Error>;
