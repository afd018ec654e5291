//! Catalog client against a fake upstream API.

use cinetrend_core::config::CatalogConfig;
use cinetrend_search::{CatalogError, CatalogProvider, Extra, TmdbCatalog, format_money};

use crate::support::{catalog_client, closed_addr, spawn_fake_catalog};

fn ids(items: &[cinetrend_search::CatalogItem]) -> Vec<u64> {
    items.iter().map(|item| item.id).collect()
}

#[tokio::test]
async fn test_search_preserves_upstream_order() {
    let catalog = catalog_client(&spawn_fake_catalog().await);

    let results = catalog.search("matrix").await.unwrap();
    assert_eq!(ids(&results), vec![603, 604]);
    assert_eq!(results[0].poster_path.as_deref(), Some("/603.jpg"));
    assert_eq!(results[0].release_year(), Some("1999"));
}

#[tokio::test]
async fn test_zero_results_is_success() {
    let catalog = catalog_client(&spawn_fake_catalog().await);

    assert!(catalog.search("no such movie").await.unwrap().is_empty());
}

#[tokio::test]
async fn test_browse_popular() {
    let catalog = catalog_client(&spawn_fake_catalog().await);

    assert_eq!(ids(&catalog.browse_popular().await.unwrap()), vec![550, 155]);
}

#[tokio::test]
async fn test_http_error_status_is_unavailable() {
    let catalog = catalog_client(&spawn_fake_catalog().await);

    let error = catalog.search("broken").await.unwrap_err();
    assert_eq!(
        error,
        CatalogError::UpstreamUnavailable {
            reason: "HTTP 500 Internal Server Error".to_string()
        }
    );
}

#[tokio::test]
async fn test_unexpected_shape_is_malformed() {
    let catalog = catalog_client(&spawn_fake_catalog().await);

    let error = catalog.search("garbage").await.unwrap_err();
    assert!(matches!(error, CatalogError::UpstreamMalformed { .. }));
}

#[tokio::test]
async fn test_failure_marker_on_success_status() {
    let catalog = catalog_client(&spawn_fake_catalog().await);

    let error = catalog.search("marker").await.unwrap_err();
    assert_eq!(
        error,
        CatalogError::UpstreamUnavailable {
            reason: "Invalid API key!".to_string()
        }
    );
}

#[tokio::test]
async fn test_missing_token_is_rejected() {
    let catalog = TmdbCatalog::new(CatalogConfig {
        base_url: spawn_fake_catalog().await,
        ..CatalogConfig::default()
    })
    .unwrap();

    let error = catalog.search("matrix").await.unwrap_err();
    assert_eq!(
        error,
        CatalogError::UpstreamUnavailable {
            reason: "HTTP 401 Unauthorized".to_string()
        }
    );
}

#[tokio::test]
async fn test_unreachable_upstream_is_unavailable() {
    let addr = closed_addr().await;
    let catalog = catalog_client(&format!("http://{addr}/3"));

    let error = catalog.browse_popular().await.unwrap_err();
    assert!(matches!(error, CatalogError::UpstreamUnavailable { .. }));
}

#[tokio::test]
async fn test_details_with_cast_and_media() {
    let catalog = catalog_client(&spawn_fake_catalog().await);

    let details = catalog
        .fetch_by_id(550, &[Extra::Cast, Extra::Media])
        .await
        .unwrap();

    assert_eq!(details.item.title, "Fight Club");
    assert_eq!(details.tagline.as_deref(), Some("Mischief. Mayhem. Soap."));
    assert_eq!(details.homepage, None);
    assert_eq!(details.top_cast(12).len(), 12);
    assert_eq!(details.top_cast(12)[0].name, "Actor 0");
    assert_eq!(details.trailer().unwrap().key, "qtRKdVHc-cE");
    assert_eq!(format_money(details.budget), "$63,000,000");
    assert_eq!(details.countries_label(), "United States of America");
}

#[tokio::test]
async fn test_details_without_extras() {
    let catalog = catalog_client(&spawn_fake_catalog().await);

    let details = catalog.fetch_by_id(550, &[]).await.unwrap();
    assert_eq!(details.cast, None);
    assert_eq!(details.videos, None);
    assert!(details.top_cast(12).is_empty());
}

#[tokio::test]
async fn test_details_unknown_id_is_not_found() {
    let catalog = catalog_client(&spawn_fake_catalog().await);

    let error = catalog.fetch_by_id(42, &[Extra::Cast]).await.unwrap_err();
    assert_eq!(error, CatalogError::NotFound { id: 42 });
    assert_eq!(error.user_message(), "Movie 42 was not found");
}
