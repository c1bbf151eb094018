//! HTTP request handlers.

use crate::server::AppState;
use axum::{
    extract::{Query, State},
    http::{StatusCode, Uri},
    response::{IntoResponse, Response},
    Json,
};
use eve_guess::{Category, GuessError};
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use tracing::{debug, error};

/// Query string of the search endpoints.
#[derive(Debug, Deserialize)]
pub struct SearchParams {
    pub q: Option<String>,
}

/// Library error rendered as a JSON response.
pub struct ApiError(GuessError);

impl From<GuessError> for ApiError {
    fn from(err: GuessError) -> Self {
        ApiError(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.0.http_status())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        if status.is_server_error() {
            error!("Request failed: {}", self.0);
        }
        let kind = match &self.0 {
            GuessError::Validation { .. } | GuessError::UnknownCategory(_) => "invalid_query",
            GuessError::CatalogNotLoaded(_) => "not_ready",
            _ => "internal",
        };
        (
            status,
            Json(json!({ "error": kind, "message": self.0.to_string() })),
        )
            .into_response()
    }
}

async fn search(
    state: Arc<AppState>,
    category: Category,
    params: SearchParams,
) -> Result<Response, ApiError> {
    let query = params
        .q
        .ok_or_else(|| GuessError::invalid_query("Missing q parameter"))?;
    debug!("Search {} for {:?}", category, query);

    match state.guesser.resolve(category, &query).await? {
        Some(entity) => Ok(Json(entity).into_response()),
        None => Ok((
            StatusCode::NOT_FOUND,
            Json(json!({
                "error": "not_found",
                "category": category,
                "query": query,
            })),
        )
            .into_response()),
    }
}

pub async fn handle_type(
    State(state): State<Arc<AppState>>,
    Query(params): Query<SearchParams>,
) -> Result<Response, ApiError> {
    search(state, Category::InventoryType, params).await
}

pub async fn handle_system(
    State(state): State<Arc<AppState>>,
    Query(params): Query<SearchParams>,
) -> Result<Response, ApiError> {
    search(state, Category::System, params).await
}

pub async fn handle_constellation(
    State(state): State<Arc<AppState>>,
    Query(params): Query<SearchParams>,
) -> Result<Response, ApiError> {
    search(state, Category::Constellation, params).await
}

pub async fn handle_region(
    State(state): State<Arc<AppState>>,
    Query(params): Query<SearchParams>,
) -> Result<Response, ApiError> {
    search(state, Category::Region, params).await
}

/// The abbreviation table as `[[key, expansion], ...]`.
pub async fn handle_shortcuts(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(state.guesser.shortcuts())
}

/// Health check endpoint.
pub async fn handle_health(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(json!({
        "status": "ok",
        "longest_query": state.guesser.longest_known_name_length(),
        "next_refresh": state.guesser.next_refresh_at(),
    }))
}

/// Any path no route claims.
pub async fn handle_not_found(uri: Uri) -> impl IntoResponse {
    (
        StatusCode::NOT_FOUND,
        Json(json!({ "error": "not_found", "path": uri.path() })),
    )
}
