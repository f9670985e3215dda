use std::env;
use std::path::PathBuf;

use ragkit::retrieval::{load_directory_async, DirectoryLoader};
use ragkit::{filter_to_minimal_doc, text_splitter, Embedding};
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let data_dir = env::var("RAGKIT_DATA_DIR")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("data"));
    let embed = env::var("RAG_EMBED").is_ok_and(|value| value == "1");

    let pages = load_directory_async(DirectoryLoader::new(&data_dir)).await?;
    info!(dir = %data_dir.display(), pages = pages.len(), "loaded pdf pages");

    let minimal = filter_to_minimal_doc(&pages);
    let chunks = text_splitter(&minimal);
    info!(chunks = chunks.len(), "split pages into chunks");

    if let Some(first) = chunks.first() {
        println!("first chunk ({}):\n{}", first.id, first.content);
    }

    if embed {
        let model = tokio::task::spawn_blocking(ragkit::download_embeddings_model).await??;
        info!(model_id = model.model_id(), target = ?model.target(), "embedding model ready");
        if let Some(first) = chunks.first() {
            let vector = model.embed(&first.content).await?;
            println!("first chunk embedding: {} dimensions", vector.len());
        }
    }

    Ok(())
}
