use std::sync::Arc;

use axum::{extract::State, Json};

use crate::{models::CatalogItem, routes::AppState};

/// Handler for the catalog listing endpoint
///
/// Backs the title selection input: the caller picks from exactly this list.
pub async fn list(State(state): State<Arc<AppState>>) -> Json<Vec<CatalogItem>> {
    Json(state.dataset.catalog().items().to_vec())
}
