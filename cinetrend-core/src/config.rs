//! Centralized configuration for Cinetrend.
//!
//! All tunable parameters and settings are defined here to avoid
//! hard-coded values scattered throughout the codebase.

use std::path::PathBuf;
use std::time::Duration;

use crate::mode::RuntimeMode;

/// Upper bound on the debounce window; longer settings are clamped.
pub const MAX_DEBOUNCE_WINDOW: Duration = Duration::from_secs(60);

/// Central configuration for all Cinetrend components.
///
/// Groups related configuration settings into logical sections.
/// Supports environment variable overrides for runtime customization.
#[derive(Debug, Clone, Default)]
pub struct CinetrendConfig {
    pub catalog: CatalogConfig,
    pub trending: TrendingConfig,
    pub search: SearchConfig,
    pub server: ServerConfig,
    pub runtime_mode: RuntimeMode,
}

/// Upstream movie catalog configuration.
///
/// Passed to the catalog client at construction; nothing reads these
/// values from ambient state.
#[derive(Debug, Clone)]
pub struct CatalogConfig {
    /// Base URL of the catalog API, without trailing slash
    pub base_url: String,
    /// Bearer token sent on every catalog request
    pub bearer_token: Option<String>,
    /// Prefix joined with relative poster paths
    pub poster_base_url: String,
    /// Prefix joined with relative backdrop paths
    pub backdrop_base_url: String,
    /// Local image reference used when an item has no poster
    pub placeholder_image: String,
    /// Request timeout; expiry surfaces as an unavailable upstream
    pub request_timeout: Duration,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.themoviedb.org/3".to_string(),
            bearer_token: None,
            poster_base_url: "https://image.tmdb.org/t/p/w500".to_string(),
            backdrop_base_url: "https://image.tmdb.org/t/p/original".to_string(),
            placeholder_image: "/no-movie.png".to_string(),
            request_timeout: Duration::from_secs(15),
        }
    }
}

/// Trending aggregation configuration.
#[derive(Debug, Clone)]
pub struct TrendingConfig {
    /// Number of entries returned by a trending read
    pub top_n: usize,
    /// Location of the durable search-count table
    pub store_path: PathBuf,
    /// Base URL of a remote trending server consumed by clients
    pub service_url: String,
    /// Per-request timeout for clients of the remote trending server
    pub request_timeout: Duration,
    /// Suffix for the temporary file written before an atomic rename
    pub temp_file_suffix: &'static str,
}

impl Default for TrendingConfig {
    fn default() -> Self {
        Self {
            top_n: 5,
            store_path: PathBuf::from("data/search-counts.json"),
            service_url: "http://127.0.0.1:8080".to_string(),
            request_timeout: Duration::from_secs(5),
            temp_file_suffix: ".tmp",
        }
    }
}

/// Client-side search behaviour.
#[derive(Debug, Clone)]
pub struct SearchConfig {
    /// Quiet period after the last keystroke before a query settles
    pub debounce_window: Duration,
    /// Number of cast members shown on a detail view
    pub detail_cast_limit: usize,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            debounce_window: Duration::from_millis(1000),
            detail_cast_limit: 12,
        }
    }
}

/// Trending HTTP server configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Interface to bind
    pub host: String,
    /// Port to bind; 0 picks an ephemeral port
    pub port: u16,
    /// Origins allowed by the CORS layer
    pub cors_origins: Vec<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
            cors_origins: vec![
                "http://localhost".to_string(),
                "http://localhost:80".to_string(),
                "http://localhost:8080".to_string(),
                "http://localhost:5173".to_string(),
            ],
        }
    }
}

impl CinetrendConfig {
    /// Creates configuration with environment variable overrides.
    ///
    /// Allows runtime configuration via environment variables while
    /// maintaining sensible defaults. Unparseable values are ignored.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(token) = std::env::var("CINETREND_TMDB_TOKEN") {
            if !token.trim().is_empty() {
                config.catalog.bearer_token = Some(token);
            }
        }

        if let Ok(base_url) = std::env::var("CINETREND_TMDB_BASE_URL") {
            config.catalog.base_url = base_url.trim_end_matches('/').to_string();
        }

        if let Ok(path) = std::env::var("CINETREND_STORE_PATH") {
            config.trending.store_path = PathBuf::from(path);
        }

        if let Ok(url) = std::env::var("CINETREND_TRENDING_URL") {
            config.trending.service_url = url.trim_end_matches('/').to_string();
        }

        if let Ok(top_n) = std::env::var("CINETREND_TOP_N") {
            if let Ok(count) = top_n.parse::<usize>() {
                config.trending.top_n = count;
            }
        }

        if let Ok(debounce) = std::env::var("CINETREND_DEBOUNCE_MS") {
            if let Ok(millis) = debounce.parse::<u64>() {
                config.search.debounce_window = debounce_window_from_millis(millis);
            }
        }

        if let Ok(host) = std::env::var("CINETREND_HOST") {
            config.server.host = host;
        }

        if let Ok(port) = std::env::var("CINETREND_PORT") {
            if let Ok(port) = port.parse::<u16>() {
                config.server.port = port;
            }
        }

        if let Ok(origins) = std::env::var("CINETREND_CORS_ORIGINS") {
            config.server.cors_origins = origins
                .split(',')
                .map(str::trim)
                .filter(|origin| !origin.is_empty())
                .map(str::to_string)
                .collect();
        }

        if let Ok(mode) = std::env::var("CINETREND_MODE") {
            if let Ok(mode) = mode.parse() {
                config.runtime_mode = mode;
            }
        }

        config
    }

    /// Creates a configuration for tests: short debounce, throwaway store.
    pub fn for_testing(store_path: PathBuf) -> Self {
        let mut config = Self::default();
        config.search.debounce_window = Duration::from_millis(50);
        config.trending.store_path = store_path;
        config.server.port = 0;
        config.runtime_mode = RuntimeMode::Development;
        config
    }
}

/// Debounce window for a millisecond setting, clamped to `MAX_DEBOUNCE_WINDOW`.
pub fn debounce_window_from_millis(millis: u64) -> Duration {
    Duration::from_millis(millis).min(MAX_DEBOUNCE_WINDOW)
}
