use unicode_segmentation::UnicodeSegmentation;

use crate::chunk::Chunk;
use crate::error::IngestError;

/// Boundaries tried in order: paragraph, line, sentence, word. The empty
/// separator is the hard cut and always matches.
const SEPARATORS: [&str; 5] = ["\n\n", "\n", ". ", " ", ""];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChunkerConfig {
    pub chunk_size: usize,
    pub chunk_overlap: usize,
}

impl Default for ChunkerConfig {
    fn default() -> Self {
        Self {
            chunk_size: 2000,
            chunk_overlap: 100,
        }
    }
}

impl ChunkerConfig {
    pub fn validate(&self) -> Result<(), IngestError> {
        if self.chunk_size == 0 {
            return Err(IngestError::InvalidConfig(
                "chunk_size must be greater than zero".to_string(),
            ));
        }
        if self.chunk_overlap >= self.chunk_size {
            return Err(IngestError::InvalidConfig(format!(
                "chunk_overlap ({}) must be smaller than chunk_size ({})",
                self.chunk_overlap, self.chunk_size
            )));
        }
        Ok(())
    }
}

/// Recursive, boundary-seeking splitter.
///
/// Splits on the coarsest separator present in the text, merges the pieces
/// back up to `chunk_size` characters with `chunk_overlap` characters
/// carried between neighbours, and re-splits any piece that is still too
/// large with the next finer separator.
#[derive(Debug, Clone)]
pub struct Chunker {
    config: ChunkerConfig,
}

impl Chunker {
    pub fn new(config: ChunkerConfig) -> Result<Self, IngestError> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn chunk_text(&self, text: &str, source: &str) -> Vec<Chunk> {
        self.split_text(text, &SEPARATORS)
            .into_iter()
            .enumerate()
            .map(|(index, text)| Chunk::new(source, index, text))
            .collect()
    }

    fn split_text(&self, text: &str, separators: &[&str]) -> Vec<String> {
        let mut final_chunks = Vec::new();

        // Pick the first separator that actually occurs
        let mut separator = "";
        let mut finer: &[&str] = &[];
        for (i, candidate) in separators.iter().enumerate() {
            if candidate.is_empty() {
                separator = candidate;
                break;
            }
            if text.contains(candidate) {
                separator = candidate;
                finer = &separators[i + 1..];
                break;
            }
        }

        let mut good_splits: Vec<&str> = Vec::new();
        for piece in split_keeping_separator(text, separator) {
            if char_len(piece) < self.config.chunk_size {
                good_splits.push(piece);
                continue;
            }

            if !good_splits.is_empty() {
                final_chunks.extend(self.merge_splits(&good_splits));
                good_splits.clear();
            }

            if finer.is_empty() {
                let trimmed = piece.trim();
                if !trimmed.is_empty() {
                    final_chunks.push(trimmed.to_string());
                }
            } else {
                final_chunks.extend(self.split_text(piece, finer));
            }
        }

        if !good_splits.is_empty() {
            final_chunks.extend(self.merge_splits(&good_splits));
        }

        final_chunks
    }

    /// Greedily join small pieces into chunks, keeping a trailing window of
    /// at most `chunk_overlap` characters to seed the next chunk.
    fn merge_splits(&self, splits: &[&str]) -> Vec<String> {
        let ChunkerConfig {
            chunk_size,
            chunk_overlap,
        } = self.config;

        let mut docs = Vec::new();
        let mut window: Vec<(&str, usize)> = Vec::new();
        let mut start = 0;
        let mut total = 0;

        for &piece in splits {
            let len = char_len(piece);

            if total + len > chunk_size && start < window.len() {
                push_joined(&mut docs, &window[start..]);

                while start < window.len()
                    && (total > chunk_overlap || total + len > chunk_size)
                {
                    total -= window[start].1;
                    start += 1;
                }
            }

            window.push((piece, len));
            total += len;
        }

        push_joined(&mut docs, &window[start..]);
        docs
    }
}

fn push_joined(docs: &mut Vec<String>, pieces: &[(&str, usize)]) {
    let joined: String = pieces.iter().map(|(piece, _)| *piece).collect();
    let trimmed = joined.trim();
    if !trimmed.is_empty() {
        docs.push(trimmed.to_string());
    }
}

/// Split `text` on `separator`, attaching each separator to the start of
/// the piece that follows it. Empty pieces are dropped.
fn split_keeping_separator<'a>(text: &'a str, separator: &str) -> Vec<&'a str> {
    if separator.is_empty() {
        return text.graphemes(true).collect();
    }

    let mut pieces = Vec::new();
    let mut start = 0;
    for (idx, _) in text.match_indices(separator) {
        if idx > start {
            pieces.push(&text[start..idx]);
        }
        start = idx;
    }
    pieces.push(&text[start..]);

    pieces.retain(|piece| !piece.is_empty());
    pieces
}

fn char_len(text: &str) -> usize {
    text.chars().count()
}
