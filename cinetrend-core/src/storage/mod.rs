//! Storage layer for search counts.
//!
//! Defines the search-count store interface with a durable file-backed
//! implementation and an in-memory one for development and tests. The
//! trending service is the only writer; everything else reads snapshots.

pub mod file_store;
pub mod memory;
mod table;
#[cfg(test)]
mod test_fixtures;

use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
pub use file_store::FileSearchCountStore;
pub use memory::InMemorySearchCountStore;
use serde::{Deserialize, Serialize};

use crate::config::CinetrendConfig;
use crate::mode::RuntimeMode;

/// Aggregated search count for one catalog item.
///
/// `search_term` and `poster_url` always hold the values of the most
/// recent search that resolved to this item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrendingEntry {
    /// Catalog identifier of the item
    #[serde(rename = "movieId")]
    pub item_id: u64,
    /// Term of the latest search whose top hit was this item
    pub search_term: String,
    /// Poster reference captured with the latest search
    pub poster_url: String,
    /// Number of searches recorded for this item, always >= 1
    pub count: u64,
    /// Time of the latest recorded search
    #[serde(default)]
    pub updated_at: DateTime<Utc>,
}

/// Persistent keyed counter of searches per catalog item.
///
/// Implementations must make `increment` atomic with respect to concurrent
/// callers: two concurrent increments of the same id are both reflected.
#[async_trait]
pub trait SearchCountStore: Send + Sync + std::fmt::Debug {
    /// Records one search for `item_id` and returns the updated entry.
    ///
    /// # Errors
    ///
    /// - `StoreError::StoreUnavailable` - If the change could not be persisted
    async fn increment(
        &self,
        item_id: u64,
        search_term: &str,
        poster_url: &str,
    ) -> Result<TrendingEntry, StoreError>;

    /// Returns up to `n` entries, highest count first, most recently
    /// updated first among equal counts.
    ///
    /// # Errors
    ///
    /// - `StoreError::StoreUnavailable` - If the backing storage cannot be read
    async fn top_n(&self, n: usize) -> Result<Vec<TrendingEntry>, StoreError>;
}

/// Errors that occur during search-count storage operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Backing storage could not be read or written
    #[error("Search-count store unavailable: {reason}")]
    StoreUnavailable {
        /// Description of the underlying failure
        reason: String,
    },

    /// Persisted table exists but cannot be decoded
    #[error("Search-count table {path:?} is corrupt: {reason}")]
    Corrupt {
        /// Location of the unreadable table
        path: PathBuf,
        /// Decoder error
        reason: String,
    },
}

/// Opens the store selected by the runtime mode.
///
/// Production counts live in the durable file store at
/// `trending.store_path`; development counts live in memory.
///
/// # Errors
///
/// - `StoreError::StoreUnavailable` - If the store directory cannot be created or read
/// - `StoreError::Corrupt` - If an existing table cannot be decoded
pub async fn from_config(
    config: &CinetrendConfig,
) -> Result<Arc<dyn SearchCountStore>, StoreError> {
    match config.runtime_mode {
        RuntimeMode::Production => {
            let store = FileSearchCountStore::open(
                &config.trending.store_path,
                config.trending.temp_file_suffix,
            )
            .await?;
            Ok(Arc::new(store))
        }
        RuntimeMode::Development => Ok(Arc::new(InMemorySearchCountStore::new())),
    }
}

impl From<std::io::Error> for StoreError {
    fn from(error: std::io::Error) -> Self {
        StoreError::StoreUnavailable {
            reason: error.to_string(),
        }
    }
}
