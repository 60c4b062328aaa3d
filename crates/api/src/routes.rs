use std::sync::Arc;

use axum::{
    Form, Json, Router, async_trait,
    extract::{FromRequest, Multipart, Request, State},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde::{Deserialize, Serialize};

use crate::config::{AppConfig, RetentionPolicy};
use crate::error::ApiError;
use crate::metrics::{Metrics, MetricsSnapshot};
use crate::pipeline::SpecPipeline;
use crate::retention;

pub const DOCX_CONTENT_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document";

pub struct AppState {
    pub pipeline: SpecPipeline,
    pub metrics: Arc<Metrics>,
}

impl AppState {
    pub fn from_config(config: &AppConfig) -> Arc<Self> {
        let metrics = Metrics::new();
        Arc::new(Self {
            pipeline: SpecPipeline::from_config(config, metrics.clone()),
            metrics,
        })
    }
}

#[derive(Deserialize)]
pub struct GenerateSpecForm {
    requirement: String,
    template: String,
}

/// Accepts the fields either url-encoded or as `multipart/form-data`.
#[async_trait]
impl<S> FromRequest<S> for GenerateSpecForm
where
    S: Send + Sync,
{
    type Rejection = Response;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let is_multipart = req
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .is_some_and(|value| value.starts_with("multipart/form-data"));

        if !is_multipart {
            let Form(form) = Form::<GenerateSpecForm>::from_request(req, state)
                .await
                .map_err(IntoResponse::into_response)?;
            return Ok(form);
        }

        let mut multipart = Multipart::from_request(req, state)
            .await
            .map_err(IntoResponse::into_response)?;

        let mut requirement = None;
        let mut template = None;
        while let Some(field) = multipart
            .next_field()
            .await
            .map_err(IntoResponse::into_response)?
        {
            let slot = match field.name() {
                Some("requirement") => &mut requirement,
                Some("template") => &mut template,
                _ => continue,
            };
            *slot = Some(field.text().await.map_err(IntoResponse::into_response)?);
        }

        match (requirement, template) {
            (Some(requirement), Some(template)) => Ok(Self {
                requirement,
                template,
            }),
            (None, _) => Err(missing_field("requirement")),
            (_, None) => Err(missing_field("template")),
        }
    }
}

fn missing_field(name: &str) -> Response {
    (
        StatusCode::UNPROCESSABLE_ENTITY,
        format!("Failed to deserialize form body: missing field `{name}`"),
    )
        .into_response()
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/metrics", get(get_metrics))
        .route("/generate_spec", post(generate_spec))
        .route("/generate_spec/", post(generate_spec))
        .with_state(state)
}

async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse { status: "ok" })
}

async fn get_metrics(State(state): State<Arc<AppState>>) -> Json<MetricsSnapshot> {
    Json(state.metrics.snapshot())
}

async fn generate_spec(
    State(state): State<Arc<AppState>>,
    form: GenerateSpecForm,
) -> Result<impl IntoResponse, ApiError> {
    let result = build_document(&state, &form).await;
    state.metrics.record_request(result.is_ok());
    let bytes = result?;

    let output = state.pipeline.output();
    let headers = [
        (header::CONTENT_TYPE, DOCX_CONTENT_TYPE.to_string()),
        (
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{}\"", output.download_filename),
        ),
    ];

    Ok((headers, bytes))
}

async fn build_document(state: &AppState, form: &GenerateSpecForm) -> Result<Vec<u8>, ApiError> {
    tracing::info!(
        requirement_chars = form.requirement.len(),
        template_chars = form.template.len(),
        "Generating specification"
    );

    let path = state
        .pipeline
        .create_spec_document(&form.requirement, &form.template)
        .await?;

    let bytes = tokio::fs::read(&path)
        .await
        .map_err(|e| ApiError::Internal(anyhow::Error::new(e).context(format!("reading {}", path.display()))))?;

    if state.pipeline.output().retention == RetentionPolicy::DeleteAfterSend
        && retention::remove_served(&path).await
    {
        state.metrics.record_files_removed(1);
    }

    Ok(bytes)
}
