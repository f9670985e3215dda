use ragkit_core::EmbeddingError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum EmbeddingProviderError {
    #[error("model load failed: {0}")]
    ModelLoad(String),
    #[error("inference failed: {0}")]
    Inference(String),
    #[error("device unavailable: {0}")]
    Device(String),
}

impl From<EmbeddingProviderError> for EmbeddingError {
    fn from(error: EmbeddingProviderError) -> Self {
        match error {
            EmbeddingProviderError::ModelLoad(message) => EmbeddingError::ModelLoad(message),
            EmbeddingProviderError::Inference(message) => EmbeddingError::Provider(message),
            EmbeddingProviderError::Device(message) => EmbeddingError::Device(message),
        }
    }
}

#[cfg(feature = "candle")]
impl From<candle_core::Error> for EmbeddingProviderError {
    fn from(error: candle_core::Error) -> Self {
        EmbeddingProviderError::Inference(error.to_string())
    }
}
