//! Live search session against real servers.

use std::sync::Arc;
use std::time::Duration;

use cinetrend_core::TrendingEntry;
use cinetrend_search::{
    HttpTrendingClient, ImageUrls, ListingPhase, SearchOrchestrator, SearchSessionHandle,
    SearchView, spawn_search_session,
};
use tokio::time::{sleep, timeout};

use crate::support::{
    SLOW_SEARCH, catalog_client, closed_addr, spawn_fake_catalog, spawn_memory_trending_server,
    trending_client,
};

const WINDOW: Duration = Duration::from_millis(50);

async fn start_session(trending_url: String) -> (SearchSessionHandle, HttpTrendingClient) {
    let catalog = Arc::new(catalog_client(&spawn_fake_catalog().await));
    let trending = trending_client(trending_url);
    let orchestrator = Arc::new(SearchOrchestrator::new(
        catalog,
        Arc::new(trending.clone()),
        ImageUrls::default(),
    ));
    (spawn_search_session(orchestrator, WINDOW), trending)
}

async fn wait_for_view(
    handle: &SearchSessionHandle,
    mut predicate: impl FnMut(&SearchView) -> bool,
) -> SearchView {
    let mut views = handle.subscribe();
    let view = timeout(Duration::from_secs(5), views.wait_for(|view| predicate(view)))
        .await
        .expect("view never reached the expected state")
        .expect("session stopped")
        .clone();
    view
}

async fn wait_for_trending(
    client: &HttpTrendingClient,
    mut predicate: impl FnMut(&[TrendingEntry]) -> bool,
) -> Vec<TrendingEntry> {
    timeout(Duration::from_secs(5), async {
        loop {
            let entries = client.try_trending().await.unwrap();
            if predicate(&entries) {
                return entries;
            }
            sleep(Duration::from_millis(20)).await;
        }
    })
    .await
    .expect("trending never reached the expected state")
}

fn ids(view: &SearchView) -> Vec<u64> {
    view.movies.iter().map(|movie| movie.id).collect()
}

#[tokio::test]
async fn test_session_starts_with_popular_listing() {
    let (handle, _) = start_session(spawn_memory_trending_server().await).await;

    let view = wait_for_view(&handle, |view| view.phase == ListingPhase::Displayed).await;
    assert_eq!(view.settled_query, "");
    assert_eq!(ids(&view), vec![550, 155]);
}

#[tokio::test]
async fn test_typing_settles_once_and_records_top_hit() {
    let (handle, trending) = start_session(spawn_memory_trending_server().await).await;

    for text in ["m", "ma", "mat", "matrix"] {
        handle.input(text).await.unwrap();
        sleep(Duration::from_millis(5)).await;
    }

    let view = wait_for_view(&handle, |view| {
        view.settled_query == "matrix" && view.phase == ListingPhase::Displayed
    })
    .await;
    assert_eq!(ids(&view), vec![603, 604]);

    let entries = wait_for_trending(&trending, |entries| !entries.is_empty()).await;
    sleep(WINDOW * 4).await;
    let entries_later = trending.try_trending().await.unwrap();

    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].item_id, 603);
    assert_eq!(entries_later, entries);
    assert_eq!(entries_later[0].count, 1);
}

#[tokio::test]
async fn test_slow_stale_response_is_discarded() {
    let (handle, trending) = start_session(spawn_memory_trending_server().await).await;

    handle.input("slow").await.unwrap();
    sleep(WINDOW * 2).await;
    handle.input("matrix").await.unwrap();

    wait_for_view(&handle, |view| ids(view) == vec![603, 604]).await;
    sleep(SLOW_SEARCH * 2).await;

    let view = handle.view();
    assert_eq!(view.settled_query, "matrix");
    assert_eq!(ids(&view), vec![603, 604]);

    let entries = trending.try_trending().await.unwrap();
    assert!(entries.iter().all(|entry| entry.item_id != 1));
}

#[tokio::test]
async fn test_error_state_is_exclusive_and_recovers() {
    let (handle, _) = start_session(spawn_memory_trending_server().await).await;
    wait_for_view(&handle, |view| view.phase == ListingPhase::Displayed).await;

    handle.input("broken").await.unwrap();
    let view = wait_for_view(&handle, |view| view.phase == ListingPhase::ErrorDisplayed).await;
    assert!(view.movies.is_empty());
    assert_eq!(
        view.error.as_deref(),
        Some("Failed to fetch movies: HTTP 500 Internal Server Error")
    );

    handle.input("").await.unwrap();
    let view = wait_for_view(&handle, |view| {
        view.settled_query.is_empty() && view.phase == ListingPhase::Displayed
    })
    .await;
    assert_eq!(view.error, None);
    assert_eq!(ids(&view), vec![550, 155]);
}

#[tokio::test]
async fn test_session_works_without_trending_service() {
    let (handle, _) = start_session(format!("http://{}", closed_addr().await)).await;

    handle.input("matrix").await.unwrap();
    let view = wait_for_view(&handle, |view| {
        view.settled_query == "matrix" && view.phase == ListingPhase::Displayed
    })
    .await;

    assert_eq!(ids(&view), vec![603, 604]);
    assert!(view.trending.is_empty());

    let view = handle.shutdown().await;
    assert_eq!(view.error, None);
}
