use std::fs;

use ragkit_retrieval::{
    load_directory_async, load_file_async, load_files_async, DirectoryLoader, IngestionError,
};
use tempfile::tempdir;

#[tokio::test]
async fn async_loader_reads_txt_document() {
    let dir = tempdir().expect("temp dir");
    let path = dir.path().join("demo.txt");
    fs::write(&path, "Hello async ingestion!").expect("write temp file");

    let documents = load_file_async(path.clone())
        .await
        .expect("load txt asynchronously");

    assert_eq!(documents.len(), 1);
    assert_eq!(documents[0].id, path.to_string_lossy());
    assert_eq!(documents[0].content, "Hello async ingestion!");
}

#[tokio::test]
async fn async_loader_returns_unsupported_extension_error() {
    let dir = tempdir().expect("temp dir");
    let path = dir.path().join("demo.xyz");
    fs::write(&path, "unsupported content").expect("write temp file");

    let error = load_file_async(path.clone())
        .await
        .expect_err("unsupported extension should error");

    assert!(matches!(
        error,
        IngestionError::UnsupportedExtension {
            path: error_path,
            extension,
        } if error_path == path && extension == "xyz"
    ));
}

#[tokio::test]
async fn async_loader_keeps_input_order() {
    let dir = tempdir().expect("temp dir");
    let second = dir.path().join("b.txt");
    let first = dir.path().join("a.txt");
    fs::write(&second, "second").expect("write file");
    fs::write(&first, "first").expect("write file");

    let documents = load_files_async(vec![second, first])
        .await
        .expect("load files");

    let contents: Vec<&str> = documents.iter().map(|d| d.content.as_str()).collect();
    assert_eq!(contents, vec!["second", "first"]);
}

#[tokio::test]
async fn async_directory_loader_reports_missing_directory() {
    let dir = tempdir().expect("temp dir");
    let missing = dir.path().join("absent");

    let error = load_directory_async(DirectoryLoader::new(&missing))
        .await
        .expect_err("missing dir should error");

    assert!(matches!(error, IngestionError::Read { path, .. } if path == missing));
}

#[tokio::test]
#[cfg(feature = "pdf")]
async fn async_loader_routes_pdf_extension_when_feature_enabled() {
    let dir = tempdir().expect("temp dir");
    let path = dir.path().join("missing.pdf");

    let error = load_file_async(path.clone())
        .await
        .expect_err("missing pdf should return read error");

    assert!(matches!(
        &error,
        IngestionError::Read {
            path: error_path,
            ..
        } if error_path == &path
    ));
}
