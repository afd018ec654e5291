//! Catalog provider implementations.

use std::sync::Arc;

use async_trait::async_trait;
use cinetrend_core::{CinetrendConfig, RuntimeMode};

use crate::errors::CatalogError;
use crate::types::{CatalogItem, Extra, MovieDetails};

pub mod demo;
#[cfg(any(test, feature = "test-utils"))]
pub mod mock;
pub mod tmdb;

pub use demo::DemoCatalog;
#[cfg(any(test, feature = "test-utils"))]
pub use mock::{CatalogCall, RecordingFeed, ScriptedCatalog};
pub use tmdb::TmdbCatalog;

/// Read-only access to the movie catalog.
///
/// Implementations are stateless apart from their connection settings and
/// preserve upstream ordering verbatim.
#[async_trait]
pub trait CatalogProvider: Send + Sync + std::fmt::Debug {
    /// Searches the catalog for `term`, which must not be empty.
    ///
    /// # Errors
    /// - `CatalogError::UpstreamUnavailable` - Transport or HTTP failure
    /// - `CatalogError::UpstreamMalformed` - Unexpected response shape
    async fn search(&self, term: &str) -> Result<Vec<CatalogItem>, CatalogError>;

    /// Lists currently popular movies.
    ///
    /// # Errors
    /// - `CatalogError::UpstreamUnavailable` - Transport or HTTP failure
    /// - `CatalogError::UpstreamMalformed` - Unexpected response shape
    async fn browse_popular(&self) -> Result<Vec<CatalogItem>, CatalogError>;

    /// Fetches one movie with the requested optional sections.
    ///
    /// # Errors
    /// - `CatalogError::NotFound` - No movie with this id
    /// - `CatalogError::UpstreamUnavailable` - Transport or HTTP failure
    /// - `CatalogError::UpstreamMalformed` - Unexpected response shape
    async fn fetch_by_id(&self, id: u64, extras: &[Extra]) -> Result<MovieDetails, CatalogError>;
}

/// Builds the catalog provider appropriate for the configured runtime mode.
///
/// # Errors
/// - `CatalogError::UpstreamUnavailable` - HTTP client could not be constructed
pub fn from_config(config: &CinetrendConfig) -> Result<Arc<dyn CatalogProvider>, CatalogError> {
    match config.runtime_mode {
        RuntimeMode::Production => Ok(Arc::new(TmdbCatalog::new(config.catalog.clone())?)),
        RuntimeMode::Development => Ok(Arc::new(DemoCatalog::new())),
    }
}
