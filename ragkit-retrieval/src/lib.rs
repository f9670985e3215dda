mod error;
mod loader;
mod minimal;
mod splitter;

use std::path::PathBuf;

use ragkit_core::Document;

pub use error::{IngestionError, SplitterConfigError};
pub use loader::{
    load_directory_async, load_file, load_file_async, load_files_async, DirectoryLoader,
    PdfLoader, TextLoader, DEFAULT_PDF_GLOB,
};
pub use minimal::filter_to_minimal_doc;
pub use splitter::{
    split_text, RecursiveCharacterTextSplitter, RecursiveCharacterTextSplitterBuilder,
    DEFAULT_CHUNK_OVERLAP, DEFAULT_CHUNK_SIZE, DEFAULT_SEPARATORS,
};

pub async fn load_and_split_recursive(
    paths: Vec<PathBuf>,
    splitter: &RecursiveCharacterTextSplitter,
) -> Result<Vec<Document>, IngestionError> {
    let documents = load_files_async(paths).await?;
    Ok(splitter.split_documents(&documents))
}

/// Loads every match of `loader`, reduces metadata to `source` and splits
/// the result into chunks.
pub fn load_and_split(
    loader: &DirectoryLoader,
    splitter: &RecursiveCharacterTextSplitter,
) -> Result<Vec<Document>, IngestionError> {
    let documents = loader.load()?;
    let minimal = filter_to_minimal_doc(&documents);
    Ok(splitter.split_documents(&minimal))
}
