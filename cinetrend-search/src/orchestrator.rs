//! Search orchestration
//!
//! Composes the catalog, the trending feed and the displayed listing. The
//! orchestrator owns no timing logic; it turns one settled query into one
//! catalog fetch, folds the outcome into a `SearchView`, and reports the
//! top hit of successful searches to the trending feed.

use std::sync::Arc;

use cinetrend_core::{SearchEvent, TrendingEntry, TrendingFeed};

use crate::errors::CatalogError;
use crate::images::ImageUrls;
use crate::providers::CatalogProvider;
use crate::types::{CatalogItem, Extra, MovieDetails};

/// Catalog endpoint used for a settled query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchKind {
    /// Empty query, browse popular movies
    Popular,
    /// Non-empty query, search by term
    Search,
}

impl FetchKind {
    /// Selects the endpoint for `query`; whitespace-only counts as empty.
    pub fn for_query(query: &str) -> Self {
        if query.trim().is_empty() {
            FetchKind::Popular
        } else {
            FetchKind::Search
        }
    }
}

/// Result of one catalog fetch for a settled query.
#[derive(Debug, Clone, PartialEq)]
pub struct FetchOutcome {
    /// Settled query the fetch was issued for
    pub query: String,
    /// Endpoint that served the fetch
    pub kind: FetchKind,
    /// Items in upstream order, or the failure
    pub result: Result<Vec<CatalogItem>, CatalogError>,
}

/// Listing state shown to the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ListingPhase {
    /// Nothing requested yet
    #[default]
    Idle,
    /// Popular list requested, previous list still shown
    FetchingPopular,
    /// Search requested, previous list still shown
    FetchingSearch,
    /// Latest committed list is shown
    Displayed,
    /// Latest committed fetch failed; no list is shown
    ErrorDisplayed,
}

/// Everything the presentation layer renders for the search page.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SearchView {
    /// Input exactly as typed
    pub raw_input: String,
    /// Query the listing belongs to
    pub settled_query: String,
    /// Listing state
    pub phase: ListingPhase,
    /// Displayed movies in upstream order
    pub movies: Vec<CatalogItem>,
    /// User-facing error, exclusive with `movies`
    pub error: Option<String>,
    /// Trending rail loaded at session start
    pub trending: Vec<TrendingEntry>,
}

impl SearchView {
    /// Checks if a fetch is outstanding for the settled query.
    pub fn is_loading(&self) -> bool {
        matches!(
            self.phase,
            ListingPhase::FetchingPopular | ListingPhase::FetchingSearch
        )
    }
}

/// Outcome of the single detail-fetch path.
#[derive(Debug, Clone, PartialEq)]
pub enum DetailView {
    /// Details with cast and media sections
    Loaded(Box<MovieDetails>),
    /// The catalog has no movie with this id
    NotFound {
        /// Requested id
        id: u64,
    },
    /// Any other catalog failure
    Error {
        /// User-facing message
        message: String,
    },
}

/// Turns settled queries into displayed listings and trending records.
#[derive(Debug)]
pub struct SearchOrchestrator {
    catalog: Arc<dyn CatalogProvider>,
    trending: Arc<dyn TrendingFeed>,
    images: ImageUrls,
}

impl SearchOrchestrator {
    /// Creates an orchestrator over the given catalog and trending feed.
    pub fn new(
        catalog: Arc<dyn CatalogProvider>,
        trending: Arc<dyn TrendingFeed>,
        images: ImageUrls,
    ) -> Self {
        Self {
            catalog,
            trending,
            images,
        }
    }

    /// Image URL builder used for recorded posters.
    pub fn images(&self) -> &ImageUrls {
        &self.images
    }

    /// Fetches the listing for a settled query.
    ///
    /// Empty queries browse popular movies and never touch the search
    /// endpoint.
    pub async fn fetch(&self, query: &str) -> FetchOutcome {
        let kind = FetchKind::for_query(query);
        let result = match kind {
            FetchKind::Popular => self.catalog.browse_popular().await,
            FetchKind::Search => self.catalog.search(query).await,
        };
        FetchOutcome {
            query: query.to_string(),
            kind,
            result,
        }
    }

    /// Marks `view` as fetching `query`, keeping the current list on screen.
    pub fn begin(&self, view: &mut SearchView, query: &str) {
        view.settled_query = query.to_string();
        view.error = None;
        view.phase = match FetchKind::for_query(query) {
            FetchKind::Popular => ListingPhase::FetchingPopular,
            FetchKind::Search => ListingPhase::FetchingSearch,
        };
    }

    /// Folds a committed outcome into `view`.
    ///
    /// Returns the trending event to record when the search endpoint
    /// produced at least one item. Failures replace the list with an
    /// error message.
    pub fn apply(&self, view: &mut SearchView, outcome: FetchOutcome) -> Option<SearchEvent> {
        view.settled_query = outcome.query;
        match outcome.result {
            Ok(movies) => {
                tracing::debug!(
                    count = movies.len(),
                    "Displaying results for '{}'",
                    view.settled_query
                );
                let event = match (outcome.kind, movies.first()) {
                    (FetchKind::Search, Some(top)) => Some(SearchEvent {
                        term: view.settled_query.clone(),
                        top_item_id: top.id,
                        poster_url: self.images.poster(top.poster_path.as_deref()),
                    }),
                    _ => None,
                };
                view.movies = movies;
                view.error = None;
                view.phase = ListingPhase::Displayed;
                event
            }
            Err(e) => {
                tracing::error!("Fetching '{}' failed: {e}", view.settled_query);
                view.movies.clear();
                view.error = Some(e.user_message());
                view.phase = ListingPhase::ErrorDisplayed;
                None
            }
        }
    }

    /// Reports a search to the trending feed; failures are swallowed there.
    pub async fn record(&self, event: SearchEvent) {
        self.trending.record_search(event).await;
    }

    /// Reads the trending rail.
    pub async fn load_trending(&self) -> Vec<TrendingEntry> {
        self.trending.trending().await
    }

    /// Runs one query to completion without debouncing.
    ///
    /// Used by one-shot front-ends that submit a whole query at once.
    pub async fn run_query(&self, query: &str) -> SearchView {
        let query = query.trim();
        let mut view = SearchView {
            raw_input: query.to_string(),
            ..SearchView::default()
        };

        self.begin(&mut view, query);
        let outcome = self.fetch(query).await;
        if let Some(event) = self.apply(&mut view, outcome) {
            self.record(event).await;
        }
        view
    }

    /// Fetches one movie with cast and media for the detail view.
    pub async fn movie_details(&self, id: u64) -> DetailView {
        match self
            .catalog
            .fetch_by_id(id, &[Extra::Cast, Extra::Media])
            .await
        {
            Ok(details) => DetailView::Loaded(Box::new(details)),
            Err(CatalogError::NotFound { id }) => DetailView::NotFound { id },
            Err(e) => {
                tracing::error!("Fetching details for {id} failed: {e}");
                DetailView::Error {
                    message: e.user_message(),
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use cinetrend_core::{InMemorySearchCountStore, TrendingService};

    use super::*;
    use crate::providers::mock::{CatalogCall, RecordingFeed, ScriptedCatalog, details, movie};

    fn orchestrator(
        catalog: ScriptedCatalog,
    ) -> (SearchOrchestrator, Arc<ScriptedCatalog>, Arc<RecordingFeed>) {
        let catalog = Arc::new(catalog);
        let feed = Arc::new(RecordingFeed::new());
        let orchestrator =
            SearchOrchestrator::new(catalog.clone(), feed.clone(), ImageUrls::default());
        (orchestrator, catalog, feed)
    }

    #[tokio::test]
    async fn test_search_records_first_result() {
        let (orchestrator, _, feed) = orchestrator(ScriptedCatalog::new().with_search(
            "matrix",
            vec![movie(603, "The Matrix"), movie(604, "Reloaded")],
        ));

        let view = orchestrator.run_query("matrix").await;
        assert_eq!(view.phase, ListingPhase::Displayed);
        assert_eq!(view.movies.len(), 2);

        let events = feed.events();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].term, "matrix");
        assert_eq!(events[0].top_item_id, 603);
        assert_eq!(events[0].poster_url, "https://image.tmdb.org/t/p/w500/603.jpg");
    }

    #[tokio::test]
    async fn test_empty_search_result_records_nothing() {
        let (orchestrator, _, feed) = orchestrator(ScriptedCatalog::new());

        let view = orchestrator.run_query("nothing here").await;
        assert_eq!(view.phase, ListingPhase::Displayed);
        assert!(view.movies.is_empty());
        assert!(feed.events().is_empty());
    }

    #[tokio::test]
    async fn test_empty_query_uses_popular_path() {
        let (orchestrator, catalog, feed) =
            orchestrator(ScriptedCatalog::new().with_popular(vec![movie(1, "Popular")]));

        let view = orchestrator.run_query("   ").await;
        assert_eq!(view.movies[0].id, 1);
        assert_eq!(catalog.calls(), vec![CatalogCall::Popular]);
        assert!(feed.events().is_empty());
    }

    #[tokio::test]
    async fn test_failure_replaces_list_with_error() {
        let (orchestrator, _, _) = orchestrator(ScriptedCatalog::new().failing_search(
            "boom",
            CatalogError::UpstreamUnavailable {
                reason: "HTTP 500 Internal Server Error".to_string(),
            },
        ));

        let mut view = SearchView {
            movies: vec![movie(1, "Stale")],
            phase: ListingPhase::Displayed,
            ..SearchView::default()
        };

        orchestrator.begin(&mut view, "boom");
        assert!(view.is_loading());
        assert_eq!(view.movies.len(), 1);

        let outcome = orchestrator.fetch("boom").await;
        assert_eq!(orchestrator.apply(&mut view, outcome), None);
        assert_eq!(view.phase, ListingPhase::ErrorDisplayed);
        assert!(view.movies.is_empty());
        assert_eq!(
            view.error.as_deref(),
            Some("Failed to fetch movies: HTTP 500 Internal Server Error")
        );
    }

    #[tokio::test]
    async fn test_details_loaded_with_cast_and_media() {
        let (orchestrator, catalog, feed) = orchestrator(
            ScriptedCatalog::new().with_details(details(movie(550, "Fight Club"))),
        );

        let loaded = match orchestrator.movie_details(550).await {
            DetailView::Loaded(loaded) => loaded,
            other => panic!("expected loaded details, got {other:?}"),
        };
        assert_eq!(loaded.item.title, "Fight Club");
        assert_eq!(loaded.top_cast(12).len(), 1);
        assert_eq!(loaded.trailer().unwrap().key, "trailer550");

        assert_eq!(
            catalog.calls(),
            vec![CatalogCall::Details(550, vec![Extra::Cast, Extra::Media])]
        );
        assert!(feed.events().is_empty());
    }

    #[tokio::test]
    async fn test_details_not_found_is_distinct() {
        let (orchestrator, _, _) = orchestrator(ScriptedCatalog::new().failing_details(
            7,
            CatalogError::UpstreamMalformed {
                reason: "bad".to_string(),
            },
        ));

        assert_eq!(
            orchestrator.movie_details(99).await,
            DetailView::NotFound { id: 99 }
        );
        assert_eq!(
            orchestrator.movie_details(7).await,
            DetailView::Error {
                message: "Failed to fetch movies".to_string()
            }
        );
    }

    #[tokio::test]
    async fn test_records_reach_trending_service() {
        let store = Arc::new(InMemorySearchCountStore::new());
        let service = Arc::new(TrendingService::new(store, 5));
        let catalog = Arc::new(
            ScriptedCatalog::new()
                .with_search("neo", vec![movie(603, "The Matrix")])
                .with_search("matrix", vec![movie(603, "The Matrix")]),
        );
        let orchestrator = SearchOrchestrator::new(catalog, service, ImageUrls::default());

        orchestrator.run_query("neo").await;
        orchestrator.run_query("matrix").await;

        let trending = orchestrator.load_trending().await;
        assert_eq!(trending.len(), 1);
        assert_eq!(trending[0].item_id, 603);
        assert_eq!(trending[0].count, 2);
        assert_eq!(trending[0].search_term, "matrix");
    }
}
