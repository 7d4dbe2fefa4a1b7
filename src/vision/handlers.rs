use std::time::Instant;

use axum::{extract::State, http::StatusCode, routing::post, Json, Router};
use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use tracing::instrument;

use crate::{
    auth::services::AuthUser,
    state::AppState,
    vision::dto::{AnalyzeRequest, AnalyzeResponse},
};

pub fn router() -> Router<AppState> {
    Router::new().route("/vision/analyze", post(analyze))
}

#[instrument(skip(state, body))]
async fn analyze(
    State(state): State<AppState>,
    AuthUser(_user_id): AuthUser,
    Json(body): Json<AnalyzeRequest>,
) -> Result<Json<AnalyzeResponse>, (StatusCode, String)> {
    // Reject non-images before spending a vision call on them.
    let decoded = BASE64
        .decode(body.image_base64.trim())
        .map_err(|_| (StatusCode::BAD_REQUEST, "Image en base64 invalide".to_string()))?;
    if decoded.is_empty() {
        return Err((StatusCode::BAD_REQUEST, "Image vide".to_string()));
    }

    let started = Instant::now();
    let estimate = state.vision.analyze(body.image_base64.trim(), body.meal_type).await;
    let elapsed_ms = started.elapsed().as_millis() as u64;

    Ok(Json(AnalyzeResponse::from_estimate(estimate, elapsed_ms)))
}
