//! Trending service over HTTP, durable storage and graceful degradation.

use std::sync::Arc;

use cinetrend_core::{FileSearchCountStore, SearchCountStore, SearchEvent, TrendingFeed};
use cinetrend_search::{ImageUrls, ListingPhase, SearchOrchestrator};
use futures::future::join_all;
use serde_json::json;

use crate::support::{
    catalog_client, closed_addr, spawn_fake_catalog, spawn_memory_trending_server,
    spawn_trending_server, trending_client,
};

fn event(term: &str, id: u64) -> SearchEvent {
    SearchEvent {
        term: term.to_string(),
        top_item_id: id,
        poster_url: format!("https://image.tmdb.org/t/p/w500/{id}.jpg"),
    }
}

#[tokio::test]
async fn test_recorded_searches_rank_by_count() {
    let client = trending_client(spawn_memory_trending_server().await);

    for (term, id) in [("heat", 949), ("alien", 348), ("aliens", 348), ("up", 14160)] {
        client.try_record(&event(term, id)).await.unwrap();
    }
    let entry = client.try_record(&event("alien 1979", 348)).await.unwrap();
    assert_eq!(entry.count, 3);
    assert_eq!(entry.search_term, "alien 1979");

    let trending = client.try_trending().await.unwrap();
    let ranked: Vec<(u64, u64)> = trending.iter().map(|e| (e.item_id, e.count)).collect();
    assert_eq!(ranked, vec![(348, 3), (14160, 1), (949, 1)]);
}

#[tokio::test]
async fn test_trending_capped_at_five() {
    let client = trending_client(spawn_memory_trending_server().await);

    for id in 1..=8 {
        client.try_record(&event("q", id)).await.unwrap();
    }

    assert_eq!(client.trending().await.len(), 5);
}

#[tokio::test]
async fn test_concurrent_posts_survive_restart() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("counts.json");
    let store = Arc::new(FileSearchCountStore::open(&path, ".tmp").await.unwrap());
    let client = trending_client(spawn_trending_server(store).await);

    let posts = (0..40).map(|_| {
        let client = client.clone();
        async move { client.try_record(&event("fight club", 550)).await }
    });
    for result in join_all(posts).await {
        result.unwrap();
    }

    let reopened = FileSearchCountStore::open(&path, ".tmp").await.unwrap();
    let top = reopened.top_n(5).await.unwrap();
    assert_eq!(top.len(), 1);
    assert_eq!(top[0].item_id, 550);
    assert_eq!(top[0].count, 40);
}

#[tokio::test]
async fn test_blank_term_is_rejected() {
    let base_url = spawn_memory_trending_server().await;

    let response = reqwest::Client::new()
        .post(format!("{base_url}/trending/search"))
        .json(&json!({"searchTerm": " ", "movieId": 1, "posterUrl": ""}))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), reqwest::StatusCode::BAD_REQUEST);

    let client = trending_client(base_url);
    assert!(client.try_record(&event("", 1)).await.is_err());
    assert!(client.trending().await.is_empty());
}

#[tokio::test]
async fn test_unreachable_service_degrades() {
    let client = trending_client(format!("http://{}", closed_addr().await));

    client.record_search(event("heat", 949)).await;
    assert!(client.trending().await.is_empty());
    assert!(client.try_trending().await.is_err());
}

#[tokio::test]
async fn test_searches_recorded_through_http() {
    let catalog = Arc::new(catalog_client(&spawn_fake_catalog().await));
    let trending = Arc::new(trending_client(spawn_memory_trending_server().await));
    let orchestrator = SearchOrchestrator::new(catalog, trending.clone(), ImageUrls::default());

    orchestrator.run_query("neo").await;
    orchestrator.run_query("matrix").await;
    orchestrator.run_query("no such movie").await;
    orchestrator.run_query("").await;

    let entries = trending.try_trending().await.unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].item_id, 603);
    assert_eq!(entries[0].count, 2);
    assert_eq!(entries[0].search_term, "matrix");
    assert_eq!(entries[0].poster_url, "https://image.tmdb.org/t/p/w500/603.jpg");
}

#[tokio::test]
async fn test_search_unaffected_when_trending_down() {
    let catalog = Arc::new(catalog_client(&spawn_fake_catalog().await));
    let trending = Arc::new(trending_client(format!("http://{}", closed_addr().await)));
    let orchestrator = SearchOrchestrator::new(catalog, trending, ImageUrls::default());

    let view = orchestrator.run_query("matrix").await;
    assert_eq!(view.phase, ListingPhase::Displayed);
    assert_eq!(view.movies.len(), 2);
    assert_eq!(view.error, None);
    assert!(orchestrator.load_trending().await.is_empty());
}
