use std::env;
use std::error::Error;

use ragkit_retrieval::{
    filter_to_minimal_doc, load_directory_async, DirectoryLoader, RecursiveCharacterTextSplitter,
};

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    let dir = env::args().nth(1).unwrap_or_else(|| "data".to_string());
    let splitter = RecursiveCharacterTextSplitter::builder()
        .chunk_size(1000)
        .chunk_overlap(200)
        .add_start_index(true)
        .build()?;

    let pages = load_directory_async(DirectoryLoader::new(&dir)).await?;
    let chunks = splitter.split_documents(&filter_to_minimal_doc(&pages));

    println!("Loaded {} pages from {dir}, split into {} chunks:", pages.len(), chunks.len());
    for (i, chunk) in chunks.iter().take(3).enumerate() {
        let preview: String = chunk.content.chars().take(50).collect();
        println!("  Chunk {}: {}...", i + 1, preview);
        println!("    Metadata: {:?}", chunk.metadata);
    }

    Ok(())
}
