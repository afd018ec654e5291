//! Scripted catalog and trending doubles for tests.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use cinetrend_core::{SearchEvent, TrendingEntry, TrendingFeed};
use parking_lot::Mutex;

use super::CatalogProvider;
use crate::errors::CatalogError;
use crate::types::{CastMember, CatalogItem, Extra, MovieDetails, Video};

/// A catalog request observed by `ScriptedCatalog`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CatalogCall {
    /// Free-text search for the term
    Search(String),
    /// Popular listing
    Popular,
    /// Detail fetch with the requested extras
    Details(u64, Vec<Extra>),
}

#[derive(Debug, Clone)]
struct Scripted<T> {
    delay: Duration,
    result: Result<T, CatalogError>,
}

impl<T: Clone> Scripted<T> {
    async fn play(&self) -> Result<T, CatalogError> {
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        self.result.clone()
    }
}

/// Catalog double with per-request scripted answers and latencies.
///
/// Unscripted searches and popular reads answer with an empty list;
/// unscripted detail fetches answer `NotFound`.
#[derive(Debug, Default)]
pub struct ScriptedCatalog {
    searches: HashMap<String, Scripted<Vec<CatalogItem>>>,
    popular: Option<Scripted<Vec<CatalogItem>>>,
    details: HashMap<u64, Scripted<MovieDetails>>,
    calls: Mutex<Vec<CatalogCall>>,
}

impl ScriptedCatalog {
    /// Creates a catalog with nothing scripted.
    pub fn new() -> Self {
        Self::default()
    }

    /// Answers searches for `term` with `items`.
    pub fn with_search(self, term: &str, items: Vec<CatalogItem>) -> Self {
        self.with_search_delayed(term, items, Duration::ZERO)
    }

    /// Answers searches for `term` with `items` after `delay`.
    pub fn with_search_delayed(
        mut self,
        term: &str,
        items: Vec<CatalogItem>,
        delay: Duration,
    ) -> Self {
        self.searches.insert(
            term.to_string(),
            Scripted {
                delay,
                result: Ok(items),
            },
        );
        self
    }

    /// Fails searches for `term` with `error`.
    pub fn failing_search(mut self, term: &str, error: CatalogError) -> Self {
        self.searches.insert(
            term.to_string(),
            Scripted {
                delay: Duration::ZERO,
                result: Err(error),
            },
        );
        self
    }

    /// Answers popular reads with `items`.
    pub fn with_popular(self, items: Vec<CatalogItem>) -> Self {
        self.with_popular_delayed(items, Duration::ZERO)
    }

    /// Answers popular reads with `items` after `delay`.
    pub fn with_popular_delayed(mut self, items: Vec<CatalogItem>, delay: Duration) -> Self {
        self.popular = Some(Scripted {
            delay,
            result: Ok(items),
        });
        self
    }

    /// Fails popular reads with `error`.
    pub fn failing_popular(mut self, error: CatalogError) -> Self {
        self.popular = Some(Scripted {
            delay: Duration::ZERO,
            result: Err(error),
        });
        self
    }

    /// Answers detail fetches for the record's id with `details`.
    pub fn with_details(mut self, details: MovieDetails) -> Self {
        self.details.insert(
            details.item.id,
            Scripted {
                delay: Duration::ZERO,
                result: Ok(details),
            },
        );
        self
    }

    /// Fails detail fetches for `id` with `error`.
    pub fn failing_details(mut self, id: u64, error: CatalogError) -> Self {
        self.details.insert(
            id,
            Scripted {
                delay: Duration::ZERO,
                result: Err(error),
            },
        );
        self
    }

    /// Requests received so far, in arrival order.
    pub fn calls(&self) -> Vec<CatalogCall> {
        self.calls.lock().clone()
    }

    /// Number of search requests received so far.
    pub fn search_count(&self) -> usize {
        self.calls
            .lock()
            .iter()
            .filter(|call| matches!(call, CatalogCall::Search(_)))
            .count()
    }
}

#[async_trait]
impl CatalogProvider for ScriptedCatalog {
    async fn search(&self, term: &str) -> Result<Vec<CatalogItem>, CatalogError> {
        self.calls.lock().push(CatalogCall::Search(term.to_string()));
        match self.searches.get(term) {
            Some(scripted) => scripted.play().await,
            None => Ok(Vec::new()),
        }
    }

    async fn browse_popular(&self) -> Result<Vec<CatalogItem>, CatalogError> {
        self.calls.lock().push(CatalogCall::Popular);
        match &self.popular {
            Some(scripted) => scripted.play().await,
            None => Ok(Vec::new()),
        }
    }

    async fn fetch_by_id(&self, id: u64, extras: &[Extra]) -> Result<MovieDetails, CatalogError> {
        self.calls
            .lock()
            .push(CatalogCall::Details(id, extras.to_vec()));
        match self.details.get(&id) {
            Some(scripted) => scripted.play().await,
            None => Err(CatalogError::NotFound { id }),
        }
    }
}

/// Trending double that records every event it receives.
#[derive(Debug, Default)]
pub struct RecordingFeed {
    events: Mutex<Vec<SearchEvent>>,
    trending: Vec<TrendingEntry>,
    trending_reads: AtomicUsize,
}

impl RecordingFeed {
    /// Creates a feed with no events and an empty ranking.
    pub fn new() -> Self {
        Self::default()
    }

    /// Serves `entries` on every trending read.
    pub fn with_trending(mut self, entries: Vec<TrendingEntry>) -> Self {
        self.trending = entries;
        self
    }

    /// Events recorded so far, in arrival order.
    pub fn events(&self) -> Vec<SearchEvent> {
        self.events.lock().clone()
    }

    /// Number of trending reads served so far.
    pub fn trending_reads(&self) -> usize {
        self.trending_reads.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl TrendingFeed for RecordingFeed {
    async fn record_search(&self, event: SearchEvent) {
        self.events.lock().push(event);
    }

    async fn trending(&self) -> Vec<TrendingEntry> {
        self.trending_reads.fetch_add(1, Ordering::SeqCst);
        self.trending.clone()
    }
}

/// Minimal catalog item for test fixtures.
pub fn movie(id: u64, title: &str) -> CatalogItem {
    CatalogItem {
        id,
        title: title.to_string(),
        poster_path: Some(format!("/{id}.jpg")),
        vote_average: Some(7.5),
        release_date: Some("2000-01-01".to_string()),
        original_language: "en".to_string(),
    }
}

/// Detail record for `item` with one cast member and one YouTube trailer.
pub fn details(item: CatalogItem) -> MovieDetails {
    MovieDetails {
        backdrop_path: None,
        tagline: None,
        overview: Some(format!("About {}.", item.title)),
        runtime: Some(120),
        status: Some("Released".to_string()),
        genres: Vec::new(),
        budget: None,
        revenue: None,
        homepage: None,
        production_companies: Vec::new(),
        production_countries: Vec::new(),
        cast: Some(vec![CastMember {
            id: 1,
            name: "Lead Actor".to_string(),
            character: Some("Lead".to_string()),
            profile_path: None,
        }]),
        videos: Some(vec![Video {
            key: format!("trailer{}", item.id),
            name: "Trailer".to_string(),
            site: "YouTube".to_string(),
            kind: "Trailer".to_string(),
        }]),
        item,
    }
}
