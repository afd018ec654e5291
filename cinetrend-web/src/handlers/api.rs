//! API handlers for trending searches

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::Json;
use cinetrend_core::{SearchEvent, TrendingEntry, TrendingFeed};
use serde_json::{Value, json};

use crate::server::AppState;

type ApiError = (StatusCode, Json<Value>);

fn api_error(status: StatusCode, message: &str) -> ApiError {
    (status, Json(json!({ "error": message })))
}

/// Records one search whose top result was `movieId`.
///
/// Answers 400 for a blank search term and 503 when the store cannot
/// persist the increment.
pub async fn api_record_search(
    State(state): State<AppState>,
    Json(event): Json<SearchEvent>,
) -> Result<Json<TrendingEntry>, ApiError> {
    if event.term.trim().is_empty() {
        return Err(api_error(
            StatusCode::BAD_REQUEST,
            "searchTerm must not be empty",
        ));
    }

    match state.trending.try_record_search(&event).await {
        Ok(entry) => Ok(Json(entry)),
        Err(e) => {
            tracing::warn!("Failed to record search '{}': {e}", event.term);
            Err(api_error(
                StatusCode::SERVICE_UNAVAILABLE,
                "Trending store is unavailable",
            ))
        }
    }
}

/// Returns the trending list; store failures yield an empty array.
pub async fn api_trending(State(state): State<AppState>) -> Json<Vec<TrendingEntry>> {
    Json(state.trending.trending().await)
}

pub async fn api_health(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "status": "ok",
        "topN": state.trending.top_n(),
        "uptimeSeconds": state.started_at.elapsed().as_secs(),
    }))
}
