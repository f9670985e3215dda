//! Helpers for feeding PDF collections into a retrieval-augmented generation
//! pipeline.
//!
//! The usual flow is directory → pages → minimal pages → chunks:
//!
//! ```no_run
//! let pages = ragkit::load_pdf_files("data/")?;
//! let minimal = ragkit::filter_to_minimal_doc(&pages);
//! let chunks = ragkit::text_splitter(&minimal);
//! # Ok::<(), ragkit::retrieval::IngestionError>(())
//! ```
//!
//! The embedding model is built independently with
//! [`download_embeddings_model`].

use std::path::Path;

pub use ragkit_core::{Document, Embedding, EmbeddingError, RagkitError, Value, SOURCE_KEY};
pub use ragkit_embeddings as embeddings;
pub use ragkit_retrieval as retrieval;
pub use ragkit_retrieval::filter_to_minimal_doc;

use ragkit_retrieval::{DirectoryLoader, IngestionError, RecursiveCharacterTextSplitter};

#[cfg(feature = "embeddings")]
use ragkit_embeddings::{
    CandleEmbedding, CandleEmbeddingBuilder, EmbeddingProviderError, HardwareProbe, Pooling,
    SystemProbe,
};

/// Model loaded by [`download_embeddings_model`].
pub const EMBEDDING_MODEL_ID: &str = ragkit_embeddings::DEFAULT_MODEL_ID;

/// Loads every `*.pdf` directly inside `dir`, one document per page, in
/// file-then-page order.
pub fn load_pdf_files(dir: impl AsRef<Path>) -> Result<Vec<Document>, IngestionError> {
    DirectoryLoader::new(dir.as_ref()).load()
}

/// Splits documents into 1000-character chunks overlapping by 200.
pub fn text_splitter(docs: &[Document]) -> Vec<Document> {
    RecursiveCharacterTextSplitter::default().split_documents(docs)
}

/// Builds the `BAAI/bge-small-en` embedding model, on an accelerator when
/// one is available and on the CPU otherwise.
///
/// The hardware check runs on every call and weights are loaded each time.
#[cfg(feature = "embeddings")]
pub fn download_embeddings_model() -> Result<CandleEmbedding, EmbeddingProviderError> {
    download_embeddings_model_with(&SystemProbe)
}

#[cfg(feature = "embeddings")]
pub fn download_embeddings_model_with(
    probe: &dyn HardwareProbe,
) -> Result<CandleEmbedding, EmbeddingProviderError> {
    embeddings_model_builder().build_with_probe(probe)
}

/// Builder configured the way [`download_embeddings_model`] loads the model:
/// CLS pooling with unit-length output vectors.
#[cfg(feature = "embeddings")]
pub fn embeddings_model_builder() -> CandleEmbeddingBuilder {
    CandleEmbedding::builder()
        .model_id(EMBEDDING_MODEL_ID)
        .pooling(Pooling::Cls)
        .normalize(true)
}

/// Runs loading, metadata reduction and splitting over `dir`.
pub fn ingest_directory(dir: impl AsRef<Path>) -> Result<Vec<Document>, RagkitError> {
    let pages = load_pdf_files(dir)?;
    Ok(text_splitter(&filter_to_minimal_doc(&pages)))
}
