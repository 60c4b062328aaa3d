use serde::{Deserialize, Serialize};

use crate::error::RetrievalError;

pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_MODEL: &str = "text-embedding-ada-002";

#[derive(Clone)]
pub struct EmbeddingClient {
    base_url: String,
    model: String,
    api_key: Option<String>,
    batch_size: usize,
    client: reqwest::Client,
}

#[derive(Serialize)]
struct EmbeddingRequest<'a> {
    model: &'a str,
    input: &'a [String],
}

#[derive(Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingData>,
}

#[derive(Deserialize)]
struct EmbeddingData {
    embedding: Vec<f32>,
    #[serde(default)]
    index: usize,
}

impl EmbeddingClient {
    pub fn new(base_url: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            model: model.into(),
            api_key: None,
            batch_size: 1000,
            client: reqwest::Client::new(),
        }
    }

    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size.max(1);
        self
    }

    /// Embed a query string
    pub async fn embed_query(&self, text: &str) -> Result<Vec<f32>, RetrievalError> {
        let mut embeddings = self.request(&[text.to_string()]).await?;
        embeddings.pop().ok_or_else(|| {
            RetrievalError::Embedding("embedding response contained no vectors".to_string())
        })
    }

    /// Embed documents in batches, preserving input order.
    pub async fn embed_documents(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, RetrievalError> {
        let mut embeddings = Vec::with_capacity(texts.len());
        for batch in texts.chunks(self.batch_size) {
            embeddings.extend(self.request(batch).await?);
        }
        Ok(embeddings)
    }

    async fn request(&self, input: &[String]) -> Result<Vec<Vec<f32>>, RetrievalError> {
        let url = format!("{}/embeddings", self.base_url);

        let request = EmbeddingRequest {
            model: &self.model,
            input,
        };

        let mut builder = self.client.post(&url).json(&request);
        if let Some(key) = &self.api_key {
            builder = builder.bearer_auth(key);
        }

        let response = builder.send().await.map_err(RetrievalError::Request)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(RetrievalError::Embedding(format!(
                "embedding request failed with {}: {}",
                status, body
            )));
        }

        let mut parsed: EmbeddingResponse = response
            .json()
            .await
            .map_err(RetrievalError::Request)?;

        if parsed.data.len() != input.len() {
            return Err(RetrievalError::Embedding(format!(
                "expected {} embeddings, got {}",
                input.len(),
                parsed.data.len()
            )));
        }

        parsed.data.sort_by_key(|d| d.index);
        Ok(parsed.data.into_iter().map(|d| d.embedding).collect())
    }
}
