//! Trending aggregation
//!
//! Turns a stream of search events into a ranked top-N list. The service
//! owns the search-count store and is the only component that writes to
//! it. Trending is an enhancement to search, never a requirement: the
//! infallible `TrendingFeed` surface swallows every store failure.

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::storage::{SearchCountStore, StoreError, TrendingEntry};

/// One search whose query produced at least one result.
///
/// `top_item_id` is the first result of the ordered result list; counts are
/// keyed by it, not by the query text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchEvent {
    /// Query text as submitted
    #[serde(rename = "searchTerm")]
    pub term: String,
    /// Catalog id of the top result
    #[serde(rename = "movieId")]
    pub top_item_id: u64,
    /// Poster reference of the top result
    #[serde(default)]
    pub poster_url: String,
}

/// Best-effort trending surface consumed by the search orchestrator.
///
/// Neither operation can fail from the caller's point of view: recording
/// is fire-and-forget and reads degrade to an empty list.
#[async_trait]
pub trait TrendingFeed: Send + Sync + std::fmt::Debug {
    /// Records a search event, logging and discarding any failure.
    async fn record_search(&self, event: SearchEvent);

    /// Returns the current trending list, or an empty list on failure.
    async fn trending(&self) -> Vec<TrendingEntry>;
}

/// Trending service backed by a search-count store.
#[derive(Debug, Clone)]
pub struct TrendingService {
    store: Arc<dyn SearchCountStore>,
    top_n: usize,
}

impl TrendingService {
    /// Creates a service over `store` returning at most `top_n` entries.
    pub fn new(store: Arc<dyn SearchCountStore>, top_n: usize) -> Self {
        Self { store, top_n }
    }

    /// Maximum number of entries returned by a trending read.
    pub fn top_n(&self) -> usize {
        self.top_n
    }

    /// Records a search event and returns the updated entry.
    ///
    /// # Errors
    ///
    /// - `StoreError::StoreUnavailable` - If the store could not persist the increment
    pub async fn try_record_search(
        &self,
        event: &SearchEvent,
    ) -> Result<TrendingEntry, StoreError> {
        let entry = self
            .store
            .increment(event.top_item_id, &event.term, &event.poster_url)
            .await?;

        tracing::info!(
            item_id = entry.item_id,
            count = entry.count,
            "Recorded search '{}'",
            event.term
        );
        Ok(entry)
    }

    /// Reads the current trending list.
    ///
    /// # Errors
    ///
    /// - `StoreError::StoreUnavailable` - If the store could not be read
    pub async fn try_trending(&self) -> Result<Vec<TrendingEntry>, StoreError> {
        self.store.top_n(self.top_n).await
    }
}

#[async_trait]
impl TrendingFeed for TrendingService {
    async fn record_search(&self, event: SearchEvent) {
        if let Err(e) = self.try_record_search(&event).await {
            tracing::warn!("Failed to record search '{}': {e}", event.term);
        }
    }

    async fn trending(&self) -> Vec<TrendingEntry> {
        match self.try_trending().await {
            Ok(entries) => entries,
            Err(e) => {
                tracing::warn!("Failed to load trending entries: {e}");
                Vec::new()
            }
        }
    }
}
