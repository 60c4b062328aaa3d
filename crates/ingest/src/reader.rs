use std::path::Path;

use tokio::fs;

use crate::error::IngestError;

pub struct CorpusReader;

impl CorpusReader {
    /// Read the whole corpus as one UTF-8 blob.
    pub async fn read_file(path: &Path) -> Result<String, IngestError> {
        fs::read_to_string(path)
            .await
            .map_err(|source| IngestError::Io {
                path: path.to_path_buf(),
                source,
            })
    }
}
