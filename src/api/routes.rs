use std::net::SocketAddr;
use std::sync::Arc;

use axum::extract::{DefaultBodyLimit, State};
use axum::routing::{get, post};
use axum::{Json, Router};
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use serde::{Deserialize, Serialize};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use super::ApiError;
use crate::budget::{BudgetStatus, CostGovernor};
use crate::config::Config;
use crate::pipeline::{MenuPipeline, RankingMode, RecommendOptions, Recommendation};
use crate::profile::UserProfile;

/// Menu photos arrive base64-encoded inside JSON.
const MAX_BODY_BYTES: usize = 20 * 1024 * 1024;

#[derive(Clone)]
pub struct AppState {
    pub pipeline: Arc<MenuPipeline>,
    pub governor: Arc<CostGovernor>,
}

#[derive(Debug, Deserialize)]
pub struct RecommendationRequest {
    /// JPEG bytes, base64; a `data:image/...;base64,` prefix is accepted.
    pub image_base64: String,
    pub profile: UserProfile,
    #[serde(default)]
    pub mode: RankingMode,
    #[serde(default)]
    pub explain: bool,
}

#[derive(Debug, Serialize)]
pub struct RecommendationResponse {
    pub recommendations: Vec<Recommendation>,
    pub budget: BudgetStatus,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/health", get(health))
        .route("/api/budget", get(budget))
        .route("/api/recommendations", post(recommendations))
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Bind and serve until the process is stopped.
pub async fn serve(config: &Config, state: AppState) -> anyhow::Result<()> {
    let addr = SocketAddr::new(config.host, config.port);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("Menu sommelier listening on {}", addr);
    axum::serve(listener, router(state)).await?;
    Ok(())
}

async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

async fn budget(State(state): State<AppState>) -> Result<Json<BudgetStatus>, ApiError> {
    Ok(Json(state.governor.status().await?))
}

async fn recommendations(
    State(state): State<AppState>,
    Json(request): Json<RecommendationRequest>,
) -> Result<Json<RecommendationResponse>, ApiError> {
    let image = decode_image(&request.image_base64)?;
    let options = RecommendOptions {
        mode: request.mode,
        explain: request.explain,
    };

    let recommendations = state
        .pipeline
        .recommend(&image, &request.profile, options)
        .await?;

    tracing::info!(
        profile_id = %request.profile.id,
        mode = ?options.mode,
        returned = recommendations.len(),
        "Recommendations served"
    );

    Ok(Json(RecommendationResponse {
        recommendations,
        budget: state.governor.status().await?,
    }))
}

fn decode_image(encoded: &str) -> Result<Vec<u8>, ApiError> {
    let trimmed = encoded.trim();
    let payload = match trimmed.split_once(";base64,") {
        Some((prefix, data)) if prefix.starts_with("data:") => data,
        _ => trimmed,
    };
    let bytes = BASE64
        .decode(payload)
        .map_err(|e| ApiError::BadRequest(format!("image_base64 is not valid base64: {}", e)))?;
    if bytes.is_empty() {
        return Err(ApiError::BadRequest("image_base64 is empty".to_string()));
    }
    Ok(bytes)
}
