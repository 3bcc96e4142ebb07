//! Error types for class mapping files

use pointclass_core::Error;
use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while loading a sidecar class mapping file
#[derive(Error, Debug)]
pub enum MappingError {
    #[error("Cannot read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed JSON in {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("No 'classification' object in {path}")]
    MissingClassification { path: PathBuf },
}

impl From<MappingError> for Error {
    fn from(e: MappingError) -> Self {
        Error::ConfigParse(e.to_string())
    }
}
