//! Trending HTTP server for Cinetrend
//!
//! Serves the trending service's JSON surface to search clients. The
//! service is the only writer to the search-count store; handlers reach it
//! through `AppState`.

use std::sync::Arc;
use std::time::Instant;

use axum::Router;
use axum::http::{HeaderValue, Method, header};
use axum::routing::{get, post};
use cinetrend_core::{CinetrendConfig, CinetrendError, SearchCountStore, TrendingService};
use tower::ServiceBuilder;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::handlers::{api_health, api_record_search, api_trending};

/// Shared state handed to every handler.
#[derive(Debug, Clone)]
pub struct AppState {
    pub trending: TrendingService,
    pub started_at: Instant,
}

impl AppState {
    /// Creates state for a trending service over `store`.
    pub fn new(store: Arc<dyn SearchCountStore>, top_n: usize) -> Self {
        Self {
            trending: TrendingService::new(store, top_n),
            started_at: Instant::now(),
        }
    }
}

/// Builds the application router with tracing and CORS layers.
///
/// Origins that are not valid header values are skipped with a warning.
pub fn build_router(state: AppState, cors_origins: &[String]) -> Router {
    let origins: Vec<HeaderValue> = cors_origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("Ignoring invalid CORS origin '{origin}'");
                None
            }
        })
        .collect();

    let cors = CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE]);

    Router::new()
        .route("/health", get(api_health))
        .route("/trending", get(api_trending))
        .route("/trending/search", post(api_record_search))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors),
        )
        .with_state(state)
}

/// Runs the trending server until interrupted.
///
/// # Errors
///
/// - `CinetrendError::Io` - If the listen address cannot be bound
/// - `CinetrendError::Server` - If serving fails after startup
pub async fn run_server(
    config: CinetrendConfig,
    store: Arc<dyn SearchCountStore>,
) -> Result<(), CinetrendError> {
    let state = AppState::new(store, config.trending.top_n);
    let app = build_router(state, &config.server.cors_origins);

    let address = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&address).await?;
    let local_addr = listener.local_addr()?;

    tracing::info!(
        mode = %config.runtime_mode,
        top_n = config.trending.top_n,
        "Cinetrend trending service running on http://{local_addr}"
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| CinetrendError::Server {
            reason: e.to_string(),
        })?;

    tracing::info!("Cinetrend trending service stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!("Failed to listen for shutdown signal: {e}");
        std::future::pending::<()>().await;
    }
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;
    use axum::body::{Body, to_bytes};
    use axum::http::{Request, StatusCode};
    use cinetrend_core::{InMemorySearchCountStore, StoreError, TrendingEntry};
    use serde_json::{Value, json};
    use tower::ServiceExt;

    use super::*;

    #[derive(Debug)]
    struct UnavailableStore;

    #[async_trait]
    impl SearchCountStore for UnavailableStore {
        async fn increment(&self, _: u64, _: &str, _: &str) -> Result<TrendingEntry, StoreError> {
            Err(StoreError::StoreUnavailable {
                reason: "disk full".to_string(),
            })
        }

        async fn top_n(&self, _: usize) -> Result<Vec<TrendingEntry>, StoreError> {
            Err(StoreError::StoreUnavailable {
                reason: "disk full".to_string(),
            })
        }
    }

    fn app(store: Arc<dyn SearchCountStore>) -> Router {
        build_router(
            AppState::new(store, 5),
            &["http://localhost:5173".to_string()],
        )
    }

    fn record_request(body: Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/trending/search")
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn json_body(response: axum::response::Response) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_record_search_returns_updated_entry() {
        let app = app(Arc::new(InMemorySearchCountStore::new()));
        let event = json!({"searchTerm": "inception", "movieId": 27205, "posterUrl": "/p.jpg"});

        let first = app.clone().oneshot(record_request(event.clone())).await.unwrap();
        assert_eq!(first.status(), StatusCode::OK);
        assert_eq!(json_body(first).await["count"], 1);

        let second = app.oneshot(record_request(event)).await.unwrap();
        let body = json_body(second).await;
        assert_eq!(body["movieId"], 27205);
        assert_eq!(body["searchTerm"], "inception");
        assert_eq!(body["count"], 2);
    }

    #[tokio::test]
    async fn test_blank_search_term_rejected() {
        let app = app(Arc::new(InMemorySearchCountStore::new()));

        let response = app
            .oneshot(record_request(json!({"searchTerm": "  ", "movieId": 1})))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_store_failure_maps_to_unavailable() {
        let app = app(Arc::new(UnavailableStore));

        let response = app
            .clone()
            .oneshot(record_request(json!({"searchTerm": "heat", "movieId": 949})))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);

        let response = app
            .oneshot(Request::get("/trending").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(json_body(response).await, json!([]));
    }

    #[tokio::test]
    async fn test_trending_ordered_by_count() {
        let store = Arc::new(InMemorySearchCountStore::new());
        for (id, times) in [(1, 1), (2, 3), (3, 2)] {
            for _ in 0..times {
                store.increment(id, "q", "").await.unwrap();
            }
        }

        let response = app(store)
            .oneshot(Request::get("/trending").body(Body::empty()).unwrap())
            .await
            .unwrap();
        let body = json_body(response).await;
        let ids: Vec<u64> = body
            .as_array()
            .unwrap()
            .iter()
            .map(|entry| entry["movieId"].as_u64().unwrap())
            .collect();
        assert_eq!(ids, vec![2, 3, 1]);
    }

    #[tokio::test]
    async fn test_cors_preflight_allows_configured_origin() {
        let app = app(Arc::new(InMemorySearchCountStore::new()));

        let request = Request::builder()
            .method("OPTIONS")
            .uri("/trending/search")
            .header("origin", "http://localhost:5173")
            .header("access-control-request-method", "POST")
            .body(Body::empty())
            .unwrap();
        let response = app.oneshot(request).await.unwrap();

        assert_eq!(
            response.headers().get("access-control-allow-origin").unwrap(),
            "http://localhost:5173"
        );
    }

    #[tokio::test]
    async fn test_health_reports_ok() {
        let app = app(Arc::new(InMemorySearchCountStore::new()));

        let response = app
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(body["status"], "ok");
        assert_eq!(body["topN"], 5);
    }
}
