//! HTTP request handlers

use super::state::AppState;
use crate::error::EventSearchError;
use crate::search::SearchResult;
use axum::{
    extract::{Query, State},
    response::IntoResponse,
    Json,
};
use serde::Deserialize;

/// Query parameters for event search
#[derive(Debug, Deserialize)]
pub struct SearchParams {
    /// Speaker name
    pub name: Option<String>,
    /// Modality filter: in-person or online
    pub filter: Option<String>,
}

/// Event search handler
pub async fn search_events(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> Result<Json<SearchResult>, EventSearchError> {
    let result = state
        .search
        .search(params.name.as_deref(), params.filter.as_deref())
        .await?;
    Ok(Json(result))
}

/// Health check handler
pub async fn health(State(state): State<AppState>) -> impl IntoResponse {
    let platforms: Vec<&str> = state.search.platforms().collect();
    Json(serde_json::json!({
        "status": "ok",
        "version": crate::VERSION,
        "platforms": platforms,
    }))
}
