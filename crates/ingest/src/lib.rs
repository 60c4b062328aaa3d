pub mod chunk;
pub mod chunker;
pub mod error;
pub mod reader;

pub use chunk::Chunk;
pub use chunker::{Chunker, ChunkerConfig};
pub use error::IngestError;
pub use reader::CorpusReader;

use std::path::Path;

/// Load the corpus file as a single text blob.
pub async fn load_corpus(path: &Path) -> Result<String, IngestError> {
    CorpusReader::read_file(path).await
}

/// Load and chunk a corpus file
pub async fn ingest_file(path: &Path, config: ChunkerConfig) -> Result<Vec<Chunk>, IngestError> {
    let chunker = Chunker::new(config)?;
    let content = load_corpus(path).await?;
    let source = path.to_string_lossy();

    let chunks = chunker.chunk_text(&content, &source);
    tracing::debug!(
        source = %source,
        chars = content.chars().count(),
        chunks = chunks.len(),
        "Corpus chunked"
    );

    Ok(chunks)
}
