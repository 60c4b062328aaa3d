pub mod embeddings;
pub mod error;
pub mod vector_index;

pub use embeddings::EmbeddingClient;
pub use error::RetrievalError;
pub use vector_index::{ScoredChunk, VectorIndex, cosine_similarity};

use std::path::Path;
use std::time::Instant;

use ingest::ChunkerConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetrievalConfig {
    pub chunker: ChunkerConfig,
    pub top_k: usize,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            chunker: ChunkerConfig::default(),
            top_k: 5,
        }
    }
}

/// Builds retrieval-augmented context for a requirement.
///
/// The index is rebuilt from the corpus on every call; nothing is shared
/// between requests.
#[derive(Clone)]
pub struct ContextRetriever {
    embedding_client: EmbeddingClient,
    config: RetrievalConfig,
}

impl ContextRetriever {
    pub fn new(embedding_client: EmbeddingClient, config: RetrievalConfig) -> Self {
        Self {
            embedding_client,
            config,
        }
    }

    /// Retrieve with the configured `top_k`
    pub async fn retrieve_default(
        &self,
        requirement: &str,
        corpus_path: &Path,
    ) -> Result<String, RetrievalError> {
        self.retrieve(requirement, corpus_path, self.config.top_k).await
    }

    /// Return the `k` chunks most similar to `requirement`, newline-joined,
    /// best match first.
    pub async fn retrieve(
        &self,
        requirement: &str,
        corpus_path: &Path,
        k: usize,
    ) -> Result<String, RetrievalError> {
        let start = Instant::now();

        let chunks = ingest::ingest_file(corpus_path, self.config.chunker).await?;

        if chunks.is_empty() || k == 0 {
            tracing::info!(chunks = chunks.len(), k, "Nothing to retrieve");
            return Ok(String::new());
        }

        // Step 1: Embed chunks and requirement in the same space
        let texts: Vec<String> = chunks.iter().map(|c| c.text.clone()).collect();
        let embeddings = self.embedding_client.embed_documents(&texts).await?;
        let query_embedding = self.embedding_client.embed_query(requirement).await?;

        // Step 2: Rank
        let index = VectorIndex::new(chunks, embeddings)?;
        let hits = index.search(&query_embedding, k);

        tracing::info!(
            chunks = index.len(),
            selected = hits.len(),
            best_score = hits.first().map(|h| h.score).unwrap_or(0.0),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Context retrieved"
        );

        // Step 3: Build context
        let context = hits
            .iter()
            .map(|hit| hit.chunk.text.as_str())
            .collect::<Vec<_>>()
            .join("\n");

        Ok(context)
    }
}
