use std::path::PathBuf;
use std::sync::Arc;

use anyhow::anyhow;
use generate::{ChatClient, SpecGenerator};
use index::{ContextRetriever, EmbeddingClient};
use render::DocxRenderer;
use uuid::Uuid;

use crate::config::{AppConfig, OutputConfig, RetentionPolicy};
use crate::error::ApiError;
use crate::metrics::{Metrics, TimedOperation};
use crate::retention;

/// requirement -> retrieved context -> generated text -> rendered file
pub struct SpecPipeline {
    retriever: ContextRetriever,
    generator: SpecGenerator,
    renderer: DocxRenderer,
    corpus_path: PathBuf,
    output: OutputConfig,
    metrics: Arc<Metrics>,
}

impl SpecPipeline {
    pub fn from_config(config: &AppConfig, metrics: Arc<Metrics>) -> Self {
        let mut embedding_client =
            EmbeddingClient::new(config.openai.base_url.as_str(), config.openai.embedding_model.as_str());
        let mut chat_client = ChatClient::new(config.openai.base_url.as_str(), config.generation.clone());
        if let Some(key) = &config.openai.api_key {
            embedding_client = embedding_client.with_api_key(key.as_str());
            chat_client = chat_client.with_api_key(key.as_str());
        }

        Self {
            retriever: ContextRetriever::new(embedding_client, config.retrieval),
            generator: SpecGenerator::new(chat_client),
            renderer: DocxRenderer::default(),
            corpus_path: config.corpus_path.clone(),
            output: config.output.clone(),
            metrics,
        }
    }

    pub fn output(&self) -> &OutputConfig {
        &self.output
    }

    /// Run the whole pipeline and return the path of the rendered document.
    /// No partial document is written if an earlier stage fails.
    pub async fn create_spec_document(
        &self,
        requirement: &str,
        template: &str,
    ) -> Result<PathBuf, ApiError> {
        // Step 1: Retrieval-augmented context
        let timer = TimedOperation::start();
        let context = self
            .retriever
            .retrieve_default(requirement, &self.corpus_path)
            .await?;
        self.metrics.record_retrieve(timer.elapsed());

        // Step 2: Expand the requirement
        let timer = TimedOperation::start();
        let text = self.generator.generate(requirement, &context, template).await?;
        self.metrics.record_generate(timer.elapsed(), text.chars().count());

        // Step 3: Render
        if let RetentionPolicy::MaxAge(max_age) = self.output.retention {
            match retention::sweep_expired(&self.output.dir, max_age).await {
                Ok(removed) => self.metrics.record_files_removed(removed),
                Err(e) => tracing::warn!(error = %e, "Retention sweep failed"),
            }
        }

        let output_path = self
            .output
            .dir
            .join(format!("spec_{}.docx", Uuid::new_v4().simple()));

        let timer = TimedOperation::start();
        let renderer = self.renderer.clone();
        let path = tokio::task::spawn_blocking(move || renderer.render(&text, &output_path))
            .await
            .map_err(|e| ApiError::Internal(anyhow!("render task failed: {e}")))??;
        self.metrics.record_render(timer.elapsed());

        Ok(path)
    }
}
