use thiserror::Error;

#[derive(Debug, Error)]
pub enum RetrievalError {
    #[error(transparent)]
    Ingest(#[from] ingest::IngestError),

    #[error("embedding request failed: {0}")]
    Request(#[source] reqwest::Error),

    #[error("{0}")]
    Embedding(String),

    #[error("index expects {expected} embeddings, got {actual}")]
    EmbeddingCount { expected: usize, actual: usize },
}

impl RetrievalError {
    /// True when the corpus itself could not be read.
    pub fn is_io(&self) -> bool {
        matches!(self, RetrievalError::Ingest(ingest::IngestError::Io { .. }))
    }
}
