use ingest::Chunk;

use crate::error::RetrievalError;

/// Ephemeral in-memory index over one corpus.
pub struct VectorIndex {
    entries: Vec<(Chunk, Vec<f32>)>,
}

#[derive(Debug, Clone, Copy)]
pub struct ScoredChunk<'a> {
    pub chunk: &'a Chunk,
    pub score: f32,
}

impl VectorIndex {
    pub fn new(chunks: Vec<Chunk>, embeddings: Vec<Vec<f32>>) -> Result<Self, RetrievalError> {
        if chunks.len() != embeddings.len() {
            return Err(RetrievalError::EmbeddingCount {
                expected: chunks.len(),
                actual: embeddings.len(),
            });
        }

        Ok(Self {
            entries: chunks.into_iter().zip(embeddings).collect(),
        })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Top-k chunks by cosine similarity, best first. Ties keep corpus order.
    pub fn search(&self, query: &[f32], top_k: usize) -> Vec<ScoredChunk<'_>> {
        let mut scored: Vec<ScoredChunk<'_>> = self
            .entries
            .iter()
            .map(|(chunk, embedding)| ScoredChunk {
                chunk,
                score: cosine_similarity(query, embedding),
            })
            .collect();

        // sort_by is stable
        scored.sort_by(|a, b| b.score.total_cmp(&a.score));
        scored.truncate(top_k);
        scored
    }
}

pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let mag_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let mag_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if mag_a == 0.0 || mag_b == 0.0 {
        0.0
    } else {
        dot / (mag_a * mag_b)
    }
}
