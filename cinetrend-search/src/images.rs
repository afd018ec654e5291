//! Image reference construction.

use cinetrend_core::config::CatalogConfig;

/// Builds absolute image references from catalog-relative paths.
#[derive(Debug, Clone)]
pub struct ImageUrls {
    poster_base: String,
    backdrop_base: String,
    placeholder: String,
}

impl ImageUrls {
    /// Creates image URL builder from catalog configuration.
    pub fn from_config(config: &CatalogConfig) -> Self {
        Self {
            poster_base: config.poster_base_url.clone(),
            backdrop_base: config.backdrop_base_url.clone(),
            placeholder: config.placeholder_image.clone(),
        }
    }

    /// Poster reference for `path`, or the local placeholder when absent.
    pub fn poster(&self, path: Option<&str>) -> String {
        join_or_placeholder(&self.poster_base, path, &self.placeholder)
    }

    /// Backdrop reference for `path`; backdrops have no placeholder.
    pub fn backdrop(&self, path: Option<&str>) -> Option<String> {
        path.filter(|p| !p.is_empty())
            .map(|p| format!("{}{}", self.backdrop_base, p))
    }
}

impl Default for ImageUrls {
    fn default() -> Self {
        Self::from_config(&CatalogConfig::default())
    }
}

fn join_or_placeholder(base: &str, path: Option<&str>, placeholder: &str) -> String {
    match path {
        Some(path) if !path.is_empty() => format!("{base}{path}"),
        _ => placeholder.to_string(),
    }
}
