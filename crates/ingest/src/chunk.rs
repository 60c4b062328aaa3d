use sha2::{Digest, Sha256};

/// A contiguous slice of the knowledge corpus, used as a retrieval unit.
#[derive(Debug, Clone, PartialEq)]
pub struct Chunk {
    pub chunk_id: String,
    pub index: usize, // position in corpus order
    pub source: String,
    pub text: String,
}

impl Chunk {
    pub fn new(source: &str, index: usize, text: String) -> Self {
        let chunk_id = Self::generate_chunk_id(source, index, &text);

        Self {
            chunk_id,
            index,
            source: source.to_string(),
            text,
        }
    }

    fn generate_chunk_id(source: &str, index: usize, text: &str) -> String {
        let mut hasher = Sha256::new();
        hasher.update(source.as_bytes());
        hasher.update(index.to_string().as_bytes());
        hasher.update(text.as_bytes());
        let result = hasher.finalize();
        hex::encode(&result[..16]) // Use first 16 bytes (32 hex chars)
    }

    /// Length in characters, the unit chunk bounds are expressed in.
    pub fn char_len(&self) -> usize {
        self.text.chars().count()
    }
}
