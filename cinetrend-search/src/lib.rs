//! Cinetrend Search - Catalog access and debounced search orchestration

#![deny(missing_docs)]
#![deny(clippy::missing_errors_doc)]
#![deny(clippy::missing_panics_doc)]
#![warn(clippy::too_many_lines)]
//!
//! Reads the movie catalog, turns live-typed input into settled queries,
//! keeps stale responses off the display and reports the top hit of each
//! search to the trending service.

pub mod debounce;
pub mod errors;
pub mod images;
pub mod orchestrator;
pub mod providers;
pub mod session;
pub mod trending_client;
pub mod types;

// Re-export main types
pub use debounce::{DebouncePhase, FetchRequest, FetchToken, QueryController, QueryState};
pub use errors::{CatalogError, SessionError};
pub use images::ImageUrls;
pub use orchestrator::{
    DetailView, FetchKind, FetchOutcome, ListingPhase, SearchOrchestrator, SearchView,
};
pub use providers::{CatalogProvider, DemoCatalog, TmdbCatalog};
pub use session::{SearchSessionHandle, spawn_search_session};
pub use trending_client::HttpTrendingClient;
pub use types::{CastMember, CatalogItem, Extra, MovieDetails, Video, format_money};

/// Convenience type alias for Results with CatalogError.
pub type Result<T> = std::result::Result<T, CatalogError>;
