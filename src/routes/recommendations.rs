use std::sync::Arc;

use axum::{extract::State, Extension, Json};
use serde::Deserialize;

use crate::{
    error::AppResult, middleware::request_id::RequestId, models::Recommendation,
    routes::AppState,
};

#[derive(Debug, Deserialize)]
pub struct RecommendationRequest {
    pub title: String,
    /// Whether to enrich results from the metadata API; on by default
    #[serde(default = "default_enrich")]
    pub enrich: bool,
}

fn default_enrich() -> bool {
    true
}

/// Handler for the recommendations endpoint
pub async fn recommend(
    State(state): State<Arc<AppState>>,
    Extension(request_id): Extension<RequestId>,
    Json(request): Json<RecommendationRequest>,
) -> AppResult<Json<Vec<Recommendation>>> {
    tracing::info!(
        request_id = %request_id,
        title = %request.title,
        enrich = request.enrich,
        "Processing recommendation request"
    );

    let results = state.engine.recommend(&request.title, request.enrich).await?;

    tracing::info!(
        request_id = %request_id,
        results = results.len(),
        "Recommendation completed"
    );

    Ok(Json(results))
}
