use crate::application::batch_service::BatchService;
use crate::application::config::AppConfig;
use crate::application::error::ApplicationError;
use crate::domain::batch::BatchSummary;
use crate::domain::position::Position;
use crate::domain::text_style::TextStyle;
use axum::{
    body::Body,
    extract::{Multipart, Query, State},
    http::header::HeaderName,
    response::{IntoResponse, Response},
    routing::post,
    Json, Router,
};
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tracing::info;

#[derive(Clone)]
pub struct AppState {
    pub batch_service: Arc<BatchService>,
    pub config: Arc<AppConfig>,
}

/// Optional per-request overrides of the configured text overlay.
#[derive(Deserialize, Debug, Default)]
pub struct PreviewParams {
    pub text: Option<String>,
    #[serde(rename = "textColor")]
    pub text_color: Option<String>,
    #[serde(rename = "textPosition")]
    pub text_position: Option<String>,
}

impl PreviewParams {
    fn apply(self, configured: Option<TextStyle>) -> Result<Option<TextStyle>, ApplicationError> {
        if self.text.is_none() && self.text_color.is_none() && self.text_position.is_none() {
            return Ok(configured);
        }
        let mut style = configured.unwrap_or_default();
        if let Some(text) = self.text {
            style.content = text;
        }
        if let Some(color) = self.text_color {
            style.color = color;
        }
        if let Some(position) = self.text_position {
            style.position = position.parse::<Position>()?;
        }
        Ok(Some(style))
    }
}

pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_headers(vec![HeaderName::from_static("content-type")]);

    Router::new()
        .route("/preview", post(preview_image_handler))
        .route("/batch", post(run_batch_handler))
        .route("/setup", post(setup_handler))
        .layer(cors)
        .with_state(state)
}

pub async fn preview_image_handler(
    State(state): State<AppState>,
    Query(params): Query<PreviewParams>,
    mut multipart: Multipart,
) -> Result<impl IntoResponse, ApplicationError> {
    let field = multipart
        .next_field()
        .await
        .map_err(|e| ApplicationError::InvalidRequest(format!("Multipart error: {}", e)))?
        .ok_or_else(|| ApplicationError::InvalidRequest("No image field in upload".to_string()))?;
    let data = field
        .bytes()
        .await
        .map_err(|e| ApplicationError::InvalidRequest(format!("Failed to read bytes from multipart field: {}", e)))?;

    let mut settings = state.config.render_settings();
    settings.text = params.apply(settings.text)?;

    let (processed_image_data, content_type) = state
        .batch_service
        .preview(
            data.to_vec(),
            state.config.asset_paths(),
            state.config.opacity,
            settings,
        )
        .await?;

    Response::builder()
        .header("Content-Type", content_type)
        .body(Body::from(processed_image_data))
        .map_err(|e| ApplicationError::BatchFailed(format!("Failed to build preview response: {}", e)))
}

pub async fn run_batch_handler(
    State(state): State<AppState>,
) -> Result<Json<BatchSummary>, ApplicationError> {
    let inputs = state
        .batch_service
        .discover_inputs(&state.config.directories.raw)
        .await?;
    info!("Batch requested over HTTP for {} images", inputs.len());
    let summary = state
        .batch_service
        .run_batch(state.config.batch_request(inputs), None)
        .await?;
    Ok(Json(summary))
}

pub async fn setup_handler(State(state): State<AppState>) -> Result<Json<Value>, ApplicationError> {
    let created = state
        .batch_service
        .setup_directories(&state.config.directories.all())
        .await?;
    Ok(Json(json!({ "created": created })))
}
