pub mod error;
pub mod llm;
pub mod prompt;
pub mod response;

pub use error::GenerationError;
pub use llm::{ChatClient, ChatMessage, GenerationConfig};
pub use response::ModelResponse;

use std::time::Instant;

/// Expands a requirement into a long-form specification document.
#[derive(Clone)]
pub struct SpecGenerator {
    llm_client: ChatClient,
}

impl SpecGenerator {
    pub fn new(llm_client: ChatClient) -> Self {
        Self { llm_client }
    }

    /// Generate the specification text (loosely-formed markdown).
    pub async fn generate(
        &self,
        requirement: &str,
        context: &str,
        template: &str,
    ) -> Result<String, GenerationError> {
        let start = Instant::now();

        let system_prompt = prompt::build_system_prompt(requirement, context, template);
        let messages = [
            ChatMessage {
                role: "system",
                content: &system_prompt,
            },
            ChatMessage {
                role: "user",
                content: prompt::USER_INSTRUCTION,
            },
        ];

        let text = self.llm_client.complete(&messages).await?;

        tracing::info!(
            model = %self.llm_client.config().model,
            prompt_chars = system_prompt.len(),
            output_chars = text.len(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Specification generated"
        );

        Ok(text)
    }
}
