use serde::Deserialize;

use crate::error::GenerationError;

/// The response shapes a text-generation endpoint may return.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum ModelResponse {
    /// `{"choices": [...]}`: chat or legacy completion
    Chat { choices: Vec<Choice> },
    /// `{"content": ...}`
    Content { content: MessageContent },
    /// `{"text": "..."}`
    Text { text: String },
    /// A bare JSON string
    Raw(String),
}

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum Choice {
    Message { message: Message },
    Text { text: String },
}

#[derive(Debug, Clone, Deserialize)]
pub struct Message {
    #[serde(default)]
    pub content: Option<MessageContent>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum MessageContent {
    Text(String),
    Parts(Vec<ContentPart>),
}

#[derive(Debug, Clone, Deserialize)]
pub struct ContentPart {
    #[serde(default)]
    pub text: Option<String>,
}

impl MessageContent {
    fn into_text(self) -> Option<String> {
        match self {
            MessageContent::Text(text) => Some(text),
            MessageContent::Parts(parts) => {
                let texts: Vec<String> = parts.into_iter().filter_map(|p| p.text).collect();
                if texts.is_empty() {
                    None
                } else {
                    Some(texts.concat())
                }
            }
        }
    }
}

impl ModelResponse {
    pub fn parse(body: &str) -> Result<Self, GenerationError> {
        serde_json::from_str(body).map_err(|e| {
            GenerationError::UnrecognizedResponse(format!("response is not a known shape: {e}"))
        })
    }

    /// Extract the generated text, whatever the shape.
    pub fn into_text(self) -> Result<String, GenerationError> {
        let text = match self {
            ModelResponse::Chat { choices } => match choices.into_iter().next() {
                Some(Choice::Message { message }) => message.content.and_then(MessageContent::into_text),
                Some(Choice::Text { text }) => Some(text),
                None => None,
            },
            ModelResponse::Content { content } => content.into_text(),
            ModelResponse::Text { text } => Some(text),
            ModelResponse::Raw(text) => Some(text),
        };

        text.ok_or_else(|| {
            GenerationError::UnrecognizedResponse("response carried no text".to_string())
        })
    }
}
