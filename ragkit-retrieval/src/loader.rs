use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use ragkit_core::{Document, Value, SOURCE_KEY};

use crate::IngestionError;

pub const DEFAULT_PDF_GLOB: &str = "*.pdf";

fn source_of(path: &Path) -> String {
    path.to_string_lossy().to_string()
}

fn read_error(path: &Path, source: io::Error) -> IngestionError {
    IngestionError::Read {
        path: path.to_path_buf(),
        source,
    }
}

pub struct TextLoader {
    path: PathBuf,
}

impl TextLoader {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn load(&self) -> Result<Vec<Document>, IngestionError> {
        let content = fs::read_to_string(&self.path).map_err(|err| read_error(&self.path, err))?;
        let source = source_of(&self.path);
        let mut metadata = HashMap::new();
        metadata.insert(SOURCE_KEY.to_string(), Value::String(source.clone()));

        Ok(vec![Document {
            id: source,
            content,
            metadata,
            embedding: None,
        }])
    }
}

/// Loads a PDF as one document per page.
///
/// Each page carries `source`, a zero-based `page` and `total_pages` in its
/// metadata, and is identified as `"{source}:{page}"`.
pub struct PdfLoader {
    path: PathBuf,
}

impl PdfLoader {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn load(&self) -> Result<Vec<Document>, IngestionError> {
        let pages = extract_pages(&self.path)?;
        let source = source_of(&self.path);
        let total_pages = pages.len();
        tracing::debug!(path = %self.path.display(), pages = total_pages, "extracted pdf pages");

        Ok(pages
            .into_iter()
            .enumerate()
            .map(|(page, content)| {
                let mut metadata = HashMap::new();
                metadata.insert(SOURCE_KEY.to_string(), Value::String(source.clone()));
                metadata.insert("page".to_string(), Value::from(page));
                metadata.insert("total_pages".to_string(), Value::from(total_pages));

                Document {
                    id: format!("{source}:{page}"),
                    content,
                    metadata,
                    embedding: None,
                }
            })
            .collect())
    }
}

#[cfg(feature = "pdf")]
fn extract_pages(path: &Path) -> Result<Vec<String>, IngestionError> {
    // Read up front so a missing file is reported as a filesystem error.
    let bytes = fs::read(path).map_err(|err| read_error(path, err))?;
    pdf_extract::extract_text_from_mem_by_pages(&bytes).map_err(|err| IngestionError::Parse {
        path: path.to_path_buf(),
        message: err.to_string(),
    })
}

#[cfg(not(feature = "pdf"))]
fn extract_pages(path: &Path) -> Result<Vec<String>, IngestionError> {
    Err(IngestionError::UnsupportedExtension {
        path: path.to_path_buf(),
        extension: "pdf".to_string(),
    })
}

/// Loads a single file, choosing the loader from its extension.
pub fn load_file(path: &Path) -> Result<Vec<Document>, IngestionError> {
    let extension = path
        .extension()
        .map(|ext| ext.to_string_lossy().to_ascii_lowercase())
        .unwrap_or_default();

    match extension.as_str() {
        "pdf" => PdfLoader::new(path.to_path_buf()).load(),
        "txt" | "md" => TextLoader::new(path.to_path_buf()).load(),
        _ => Err(IngestionError::UnsupportedExtension {
            path: path.to_path_buf(),
            extension,
        }),
    }
}

/// Loads every file in a directory that matches a glob pattern.
///
/// The pattern is relative to the directory and defaults to `*.pdf`. Files
/// are visited in sorted path order and their documents concatenated.
#[derive(Clone, Debug)]
pub struct DirectoryLoader {
    dir: PathBuf,
    glob: String,
    silent_errors: bool,
}

impl DirectoryLoader {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            glob: DEFAULT_PDF_GLOB.to_string(),
            silent_errors: false,
        }
    }

    pub fn glob(mut self, pattern: impl Into<String>) -> Self {
        self.glob = pattern.into();
        self
    }

    /// Skip files that fail to load instead of aborting the whole load.
    pub fn silent_errors(mut self, value: bool) -> Self {
        self.silent_errors = value;
        self
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn matching_paths(&self) -> Result<Vec<PathBuf>, IngestionError> {
        let meta = fs::metadata(&self.dir).map_err(|err| read_error(&self.dir, err))?;
        if !meta.is_dir() {
            return Err(read_error(&self.dir, io::Error::other("not a directory")));
        }

        let dir = glob::Pattern::escape(&self.dir.to_string_lossy());
        let pattern = format!("{}/{}", dir.trim_end_matches('/'), self.glob);
        let options = glob::MatchOptions {
            require_literal_leading_dot: true,
            ..Default::default()
        };
        let entries =
            glob::glob_with(&pattern, options).map_err(|err| IngestionError::InvalidPattern {
                pattern: self.glob.clone(),
                message: err.to_string(),
            })?;

        let mut paths = Vec::new();
        for entry in entries {
            let path = entry.map_err(|err| {
                let path = err.path().to_path_buf();
                read_error(&path, io::Error::from(err))
            })?;
            if path.is_file() {
                paths.push(path);
            }
        }
        Ok(paths)
    }

    pub fn load(&self) -> Result<Vec<Document>, IngestionError> {
        let paths = self.matching_paths()?;
        tracing::info!(
            dir = %self.dir.display(),
            pattern = %self.glob,
            files = paths.len(),
            "loading directory"
        );

        let mut documents = Vec::new();
        for path in paths {
            match load_file(&path) {
                Ok(mut docs) => documents.append(&mut docs),
                Err(err) if self.silent_errors => {
                    tracing::warn!(path = %path.display(), error = %err, "skipping unloadable file");
                }
                Err(err) => return Err(err),
            }
        }
        Ok(documents)
    }
}

fn join_error(err: tokio::task::JoinError) -> IngestionError {
    IngestionError::Join(err.to_string())
}

pub async fn load_file_async(path: PathBuf) -> Result<Vec<Document>, IngestionError> {
    tokio::task::spawn_blocking(move || load_file(&path))
        .await
        .map_err(join_error)?
}

pub async fn load_files_async(paths: Vec<PathBuf>) -> Result<Vec<Document>, IngestionError> {
    let mut documents = Vec::new();
    for path in paths {
        let mut docs = load_file_async(path).await?;
        documents.append(&mut docs);
    }
    Ok(documents)
}

pub async fn load_directory_async(loader: DirectoryLoader) -> Result<Vec<Document>, IngestionError> {
    tokio::task::spawn_blocking(move || loader.load())
        .await
        .map_err(join_error)?
}
