use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

use generate::GenerationError;
use index::RetrievalError;
use render::RenderError;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("context retrieval failed: {0}")]
    Retrieval(#[from] RetrievalError),

    #[error("specification generation failed: {0}")]
    Generation(#[from] GenerationError),

    #[error("document rendering failed: {0}")]
    Render(#[from] RenderError),

    #[error("internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Generation(_) => StatusCode::BAD_GATEWAY,
            ApiError::Retrieval(_) | ApiError::Render(_) | ApiError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        tracing::error!(error = %self, status = status.as_u16(), "Request failed");

        let body = Json(json!({
            "error": self.to_string(),
            "status": status.as_u16(),
        }));

        (status, body).into_response()
    }
}
