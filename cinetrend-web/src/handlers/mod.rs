//! HTTP request handlers organized by functionality

pub mod api;

// Re-export handler functions
pub use api::{api_health, api_record_search, api_trending};
