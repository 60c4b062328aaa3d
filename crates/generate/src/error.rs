use thiserror::Error;

#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("model request failed: {0}")]
    Request(#[source] reqwest::Error),

    #[error("model returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("unrecognized model response: {0}")]
    UnrecognizedResponse(String),
}
