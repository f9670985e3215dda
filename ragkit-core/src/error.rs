use thiserror::Error;

#[derive(Debug, Error)]
pub enum RagkitError {
    #[error("Ingestion failed: {0}")]
    Ingestion(String),
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

#[derive(Debug, Error)]
pub enum EmbeddingError {
    #[error("Embedding model load failed: {0}")]
    ModelLoad(String),
    #[error("Embedding device error: {0}")]
    Device(String),
    #[error("Embedding provider error: {0}")]
    Provider(String),
}
