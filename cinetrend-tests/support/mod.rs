//! Shared fixtures: fake catalog upstream and ephemeral servers.

#![allow(dead_code)]

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use axum::extract::{Path, Query};
use axum::http::{HeaderMap, StatusCode, header};
use axum::response::{IntoResponse, Json, Response};
use axum::routing::get;
use cinetrend_core::config::CatalogConfig;
use cinetrend_core::{InMemorySearchCountStore, SearchCountStore};
use cinetrend_search::{HttpTrendingClient, TmdbCatalog};
use cinetrend_web::{AppState, build_router};
use serde::Deserialize;
use serde_json::{Value, json};
use tokio::net::TcpListener;

/// Bearer token the fake catalog accepts.
pub const TOKEN: &str = "test-token";

/// Latency of the fake catalog's `slow` search.
pub const SLOW_SEARCH: Duration = Duration::from_millis(300);

/// Serves `app` on an ephemeral loopback port.
pub async fn spawn_app(app: Router) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    addr
}

/// Address on loopback that nothing listens on.
pub async fn closed_addr() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    listener.local_addr().unwrap()
}

/// Starts the fake catalog and returns its API base URL.
pub async fn spawn_fake_catalog() -> String {
    let app = Router::new()
        .route("/3/search/movie", get(search))
        .route("/3/trending/movie/week", get(popular))
        .route("/3/movie/{id}", get(details));
    let addr = spawn_app(app).await;
    format!("http://{addr}/3")
}

/// Catalog client pointed at `base_url` with the accepted token.
pub fn catalog_client(base_url: &str) -> TmdbCatalog {
    TmdbCatalog::new(CatalogConfig {
        base_url: base_url.to_string(),
        bearer_token: Some(TOKEN.to_string()),
        request_timeout: Duration::from_secs(5),
        ..CatalogConfig::default()
    })
    .unwrap()
}

/// Trending client pointed at `base_url`.
pub fn trending_client(base_url: impl Into<String>) -> HttpTrendingClient {
    HttpTrendingClient::new(base_url, Duration::from_secs(5)).unwrap()
}

/// Starts the trending service over `store` and returns its base URL.
pub async fn spawn_trending_server(store: Arc<dyn SearchCountStore>) -> String {
    let app = build_router(AppState::new(store, 5), &[]);
    let addr = spawn_app(app).await;
    format!("http://{addr}")
}

/// Starts the trending service over a fresh in-memory store.
pub async fn spawn_memory_trending_server() -> String {
    spawn_trending_server(Arc::new(InMemorySearchCountStore::new())).await
}

#[derive(Deserialize)]
struct SearchParams {
    query: String,
}

fn authorized(headers: &HeaderMap) -> bool {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        == Some(format!("Bearer {TOKEN}").as_str())
}

fn unauthorized() -> Response {
    (
        StatusCode::UNAUTHORIZED,
        Json(json!({"status_code": 7, "status_message": "Invalid API key"})),
    )
        .into_response()
}

fn list(items: &[(u64, &str)]) -> Value {
    let results: Vec<Value> = items
        .iter()
        .map(|(id, title)| {
            json!({
                "id": id,
                "title": title,
                "poster_path": format!("/{id}.jpg"),
                "vote_average": 7.5,
                "release_date": "1999-03-30",
                "original_language": "en"
            })
        })
        .collect();
    json!({"page": 1, "results": results, "total_results": items.len()})
}

async fn search(headers: HeaderMap, Query(params): Query<SearchParams>) -> Response {
    if !authorized(&headers) {
        return unauthorized();
    }

    match params.query.as_str() {
        "matrix" => Json(list(&[(603, "The Matrix"), (604, "The Matrix Reloaded")])).into_response(),
        "neo" => Json(list(&[(603, "The Matrix")])).into_response(),
        "slow" => {
            tokio::time::sleep(SLOW_SEARCH).await;
            Json(list(&[(1, "Slow Movie")])).into_response()
        }
        "broken" => StatusCode::INTERNAL_SERVER_ERROR.into_response(),
        "garbage" => Json(json!({"page": 1})).into_response(),
        "marker" => Json(json!({"Response": "False", "Error": "Invalid API key!"})).into_response(),
        _ => Json(list(&[])).into_response(),
    }
}

async fn popular(headers: HeaderMap) -> Response {
    if !authorized(&headers) {
        return unauthorized();
    }
    Json(list(&[(550, "Fight Club"), (155, "The Dark Knight")])).into_response()
}

async fn details(
    headers: HeaderMap,
    Path(id): Path<u64>,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    if !authorized(&headers) {
        return unauthorized();
    }
    if id != 550 {
        return (
            StatusCode::NOT_FOUND,
            Json(json!({"status_code": 34, "status_message": "The resource you requested could not be found."})),
        )
            .into_response();
    }

    let mut body = json!({
        "id": 550,
        "title": "Fight Club",
        "poster_path": "/pB8BM7pdSp6B6Ih7QZ4DrQ3PmJK.jpg",
        "backdrop_path": "/hZkgoQYus5vegHoetLkCJzb17zJ.jpg",
        "tagline": "Mischief. Mayhem. Soap.",
        "overview": "A ticking-time-bomb insomniac and a slippery soap salesman channel primal male aggression.",
        "runtime": 139,
        "status": "Released",
        "genres": [{"id": 18, "name": "Drama"}],
        "budget": 63000000,
        "revenue": 100853753,
        "homepage": "",
        "production_companies": [{"id": 508, "name": "Regency Enterprises", "logo_path": null}],
        "production_countries": [{"iso_3166_1": "US", "name": "United States of America"}],
        "original_language": "en",
        "vote_average": 8.4,
        "release_date": "1999-10-15"
    });

    let sections = params
        .get("append_to_response")
        .map(String::as_str)
        .unwrap_or("");
    if sections.split(',').any(|section| section == "credits") {
        let cast: Vec<Value> = (0..15)
            .map(|i| json!({"id": 1000 + i, "name": format!("Actor {i}"), "character": format!("Role {i}")}))
            .collect();
        body["credits"] = json!({"cast": cast});
    }
    if sections.split(',').any(|section| section == "videos") {
        body["videos"] = json!({"results": [
            {"key": "BdJKm16Co6M", "name": "Behind the scenes", "site": "YouTube", "type": "Featurette"},
            {"key": "qtRKdVHc-cE", "name": "Official Trailer", "site": "YouTube", "type": "Trailer"}
        ]});
    }

    Json(body).into_response()
}
