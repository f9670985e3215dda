use std::path::PathBuf;

use ragkit_core::RagkitError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum IngestionError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse {path}: {message}")]
    Parse { path: PathBuf, message: String },
    #[error("unsupported extension '{extension}' for {path}")]
    UnsupportedExtension { path: PathBuf, extension: String },
    #[error("invalid glob pattern '{pattern}': {message}")]
    InvalidPattern { pattern: String, message: String },
    #[error("blocking load task failed: {0}")]
    Join(String),
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SplitterConfigError {
    #[error("chunk_size must be greater than zero")]
    ChunkSizeMustBeGreaterThanZero,
    #[error("chunk_overlap ({overlap}) is larger than chunk_size ({chunk_size})")]
    OverlapExceedsChunkSize { overlap: usize, chunk_size: usize },
    #[error("at least one separator is required")]
    EmptySeparators,
}

impl From<IngestionError> for RagkitError {
    fn from(error: IngestionError) -> Self {
        RagkitError::Ingestion(error.to_string())
    }
}

impl From<SplitterConfigError> for RagkitError {
    fn from(error: SplitterConfigError) -> Self {
        RagkitError::InvalidConfig(error.to_string())
    }
}
