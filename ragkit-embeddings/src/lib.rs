mod device;
mod error;

#[cfg(feature = "candle")]
mod candle;

pub use device::{DeviceTarget, HardwareProbe, SystemProbe};
pub use error::EmbeddingProviderError;

#[cfg(feature = "candle")]
pub use candle::{CandleEmbedding, CandleEmbeddingBuilder, Pooling};

/// Sentence-embedding model used when no other model id is configured.
pub const DEFAULT_MODEL_ID: &str = "BAAI/bge-small-en";
