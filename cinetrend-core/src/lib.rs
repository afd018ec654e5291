//! Cinetrend Core - Trending aggregation and shared infrastructure
//!
//! This crate provides the server-side half of Cinetrend: the durable
//! search-count store, the trending service that owns it, and the
//! configuration, runtime mode and tracing setup shared by every binary.

pub mod config;
pub mod mode;
pub mod storage;
pub mod tracing_setup;
pub mod trending;

// Re-export main types for convenient access
pub use config::CinetrendConfig;
pub use mode::RuntimeMode;
pub use storage::{
    FileSearchCountStore, InMemorySearchCountStore, SearchCountStore, StoreError, TrendingEntry,
};
pub use trending::{SearchEvent, TrendingFeed, TrendingService};

/// Core errors that can bubble up from any Cinetrend subsystem.
///
/// High-level error types representing failures surfaced to a binary.
#[derive(Debug, thiserror::Error)]
pub enum CinetrendError {
    #[error("Storage error: {0}")]
    Store(#[from] StoreError),

    #[error("Catalog error: {reason}")]
    Catalog { reason: String },

    #[error("Configuration error: {reason}")]
    Configuration { reason: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Server error: {reason}")]
    Server { reason: String },
}

impl CinetrendError {
    /// Returns a user-friendly error message suitable for display.
    pub fn user_message(&self) -> String {
        match self {
            CinetrendError::Store(StoreError::Corrupt { path, .. }) => {
                format!("Search-count file {} is unreadable", path.display())
            }
            CinetrendError::Store(_) => "Trending data is unavailable".to_string(),
            CinetrendError::Catalog { reason } => format!("Movie catalog error: {reason}"),
            CinetrendError::Configuration { reason } => format!("Configuration error: {reason}"),
            CinetrendError::Io(_) => "File system error occurred".to_string(),
            CinetrendError::Server { reason } => format!("Server error: {reason}"),
        }
    }

    /// Checks if this error is due to user input or configuration.
    pub fn is_user_error(&self) -> bool {
        matches!(self, CinetrendError::Configuration { .. })
    }
}

pub type Result<T> = std::result::Result<T, CinetrendError>;
