mod document;
mod embedding;
mod error;
mod value;

pub use document::{Document, SOURCE_KEY};
pub use embedding::Embedding;
pub use error::{EmbeddingError, RagkitError};
pub use value::Value;
