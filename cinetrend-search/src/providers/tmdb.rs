//! TMDB catalog provider for production use.

use async_trait::async_trait;
use cinetrend_core::config::CatalogConfig;
use reqwest::StatusCode;
use serde::Deserialize;
use serde::de::DeserializeOwned;

use super::CatalogProvider;
use crate::errors::CatalogError;
use crate::types::{CastMember, CatalogItem, Company, Country, Extra, Genre, MovieDetails, Video};

/// TMDB provider for real catalog access.
///
/// Every request carries the configured bearer token. The client timeout
/// is the only bound on a request; expiry is reported as an unavailable
/// upstream.
#[derive(Debug)]
pub struct TmdbCatalog {
    client: reqwest::Client,
    config: CatalogConfig,
}

/// List endpoint response (`/search/movie`, `/trending/movie/week`).
#[derive(Debug, Deserialize)]
struct ListResponse {
    results: Vec<CatalogItem>,
}

/// Detail endpoint response with optional appended sections.
#[derive(Debug, Deserialize)]
struct DetailsResponse {
    #[serde(flatten)]
    item: CatalogItem,
    backdrop_path: Option<String>,
    tagline: Option<String>,
    overview: Option<String>,
    runtime: Option<u32>,
    status: Option<String>,
    #[serde(default)]
    genres: Vec<Genre>,
    budget: Option<u64>,
    revenue: Option<u64>,
    homepage: Option<String>,
    #[serde(default)]
    production_companies: Vec<Company>,
    #[serde(default)]
    production_countries: Vec<Country>,
    credits: Option<Credits>,
    videos: Option<Videos>,
}

#[derive(Debug, Deserialize)]
struct Credits {
    #[serde(default)]
    cast: Vec<CastMember>,
}

#[derive(Debug, Deserialize)]
struct Videos {
    #[serde(default)]
    results: Vec<Video>,
}

impl From<DetailsResponse> for MovieDetails {
    fn from(response: DetailsResponse) -> Self {
        MovieDetails {
            item: response.item,
            backdrop_path: response.backdrop_path,
            tagline: response.tagline.filter(|t| !t.is_empty()),
            overview: response.overview,
            runtime: response.runtime,
            status: response.status,
            genres: response.genres,
            budget: response.budget,
            revenue: response.revenue,
            homepage: response.homepage.filter(|h| !h.is_empty()),
            production_companies: response.production_companies,
            production_countries: response.production_countries,
            cast: response.credits.map(|credits| credits.cast),
            videos: response.videos.map(|videos| videos.results),
        }
    }
}

impl TmdbCatalog {
    /// Create TMDB provider from explicit catalog configuration.
    ///
    /// # Errors
    ///
    /// - `CatalogError::UpstreamUnavailable` - If the HTTP client cannot be built
    pub fn new(config: CatalogConfig) -> Result<Self, CatalogError> {
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| CatalogError::UpstreamUnavailable {
                reason: format!("HTTP client setup failed: {e}"),
            })?;

        Ok(Self { client, config })
    }

    fn search_url(&self, term: &str) -> String {
        format!(
            "{}/search/movie?query={}",
            self.config.base_url,
            urlencoding::encode(term)
        )
    }

    fn popular_url(&self) -> String {
        format!("{}/trending/movie/week", self.config.base_url)
    }

    fn details_url(&self, id: u64, extras: &[Extra]) -> String {
        let mut url = format!("{}/movie/{id}", self.config.base_url);
        if !extras.is_empty() {
            let sections: Vec<&str> = extras.iter().map(|extra| extra.upstream_name()).collect();
            url.push_str(&format!("?append_to_response={}", sections.join(",")));
        }
        url
    }

    /// Performs a GET and returns status and raw body.
    async fn get(&self, url: &str) -> Result<(StatusCode, String), CatalogError> {
        let mut request = self
            .client
            .get(url)
            .header(reqwest::header::ACCEPT, "application/json");
        if let Some(token) = &self.config.bearer_token {
            request = request.bearer_auth(token);
        }

        let response = request
            .send()
            .await
            .map_err(|e| CatalogError::UpstreamUnavailable {
                reason: format!("HTTP request failed: {e}"),
            })?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| CatalogError::UpstreamUnavailable {
                reason: format!("Reading response failed: {e}"),
            })?;

        Ok((status, body))
    }

    async fn get_list(&self, url: &str) -> Result<Vec<CatalogItem>, CatalogError> {
        let (status, body) = self.get(url).await?;
        if !status.is_success() {
            return Err(CatalogError::UpstreamUnavailable {
                reason: format!("HTTP {status}"),
            });
        }

        let list: ListResponse = decode(&body)?;
        Ok(list.results)
    }
}

/// Decodes a response body, honouring the upstream failure marker.
///
/// Some catalog front-ends answer 200 with `{"Response": "False",
/// "Error": "..."}`; that is a failed request, not a malformed one.
fn decode<T: DeserializeOwned>(body: &str) -> Result<T, CatalogError> {
    let value: serde_json::Value =
        serde_json::from_str(body).map_err(|e| CatalogError::UpstreamMalformed {
            reason: format!("JSON parsing failed: {e}"),
        })?;

    if value.get("Response").and_then(|r| r.as_str()) == Some("False") {
        let reason = value
            .get("Error")
            .and_then(|e| e.as_str())
            .unwrap_or("Unknown error")
            .to_string();
        return Err(CatalogError::UpstreamUnavailable { reason });
    }

    serde_json::from_value(value).map_err(|e| CatalogError::UpstreamMalformed {
        reason: e.to_string(),
    })
}

#[async_trait]
impl CatalogProvider for TmdbCatalog {
    async fn search(&self, term: &str) -> Result<Vec<CatalogItem>, CatalogError> {
        tracing::debug!("Searching catalog for '{term}'");
        self.get_list(&self.search_url(term)).await
    }

    async fn browse_popular(&self) -> Result<Vec<CatalogItem>, CatalogError> {
        tracing::debug!("Browsing popular movies");
        self.get_list(&self.popular_url()).await
    }

    async fn fetch_by_id(&self, id: u64, extras: &[Extra]) -> Result<MovieDetails, CatalogError> {
        let (status, body) = self.get(&self.details_url(id, extras)).await?;

        if status == StatusCode::NOT_FOUND {
            return Err(CatalogError::NotFound { id });
        }
        if !status.is_success() {
            return Err(CatalogError::UpstreamUnavailable {
                reason: format!("HTTP {status}"),
            });
        }

        let details: DetailsResponse = decode(&body)?;
        Ok(details.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn catalog() -> TmdbCatalog {
        TmdbCatalog::new(CatalogConfig {
            base_url: "http://catalog.test/3".to_string(),
            ..CatalogConfig::default()
        })
        .unwrap()
    }

    #[test]
    fn test_search_url_encodes_term() {
        assert_eq!(
            catalog().search_url("the matrix & co"),
            "http://catalog.test/3/search/movie?query=the%20matrix%20%26%20co"
        );
    }

    #[test]
    fn test_details_url_appends_extras() {
        let catalog = catalog();
        assert_eq!(
            catalog.details_url(550, &[Extra::Cast, Extra::Media]),
            "http://catalog.test/3/movie/550?append_to_response=credits,videos"
        );
        assert_eq!(catalog.details_url(550, &[]), "http://catalog.test/3/movie/550");
    }

    #[test]
    fn test_decode_list_preserves_order() {
        let body = r#"{"page": 1, "results": [
            {"id": 2, "title": "B", "poster_path": "/b.jpg", "vote_average": 7.1,
             "release_date": "2001-01-01", "original_language": "en"},
            {"id": 1, "title": "A", "poster_path": null}
        ]}"#;

        let list: ListResponse = decode(body).unwrap();
        let ids: Vec<u64> = list.results.iter().map(|item| item.id).collect();
        assert_eq!(ids, vec![2, 1]);
    }

    #[test]
    fn test_decode_empty_results_is_success() {
        let list: ListResponse = decode(r#"{"results": []}"#).unwrap();
        assert!(list.results.is_empty());
    }

    #[test]
    fn test_decode_failure_marker() {
        let result: Result<ListResponse, _> =
            decode(r#"{"Response": "False", "Error": "Movie not found!"}"#);
        assert_eq!(
            result.unwrap_err(),
            CatalogError::UpstreamUnavailable {
                reason: "Movie not found!".to_string()
            }
        );
    }

    #[test]
    fn test_decode_malformed_shapes() {
        let missing_results: Result<ListResponse, _> = decode(r#"{"page": 1}"#);
        assert!(matches!(
            missing_results,
            Err(CatalogError::UpstreamMalformed { .. })
        ));

        let not_json: Result<ListResponse, _> = decode("<html>gateway</html>");
        assert!(matches!(not_json, Err(CatalogError::UpstreamMalformed { .. })));
    }

    #[test]
    fn test_decode_details_with_extras() {
        let body = r#"{
            "id": 550, "title": "Fight Club", "poster_path": "/p.jpg",
            "tagline": "", "runtime": 139, "budget": 63000000, "homepage": "",
            "genres": [{"id": 18, "name": "Drama"}],
            "credits": {"cast": [{"id": 819, "name": "Edward Norton", "character": "Narrator"}]},
            "videos": {"results": [{"key": "abc", "name": "Trailer", "site": "YouTube", "type": "Trailer"}]}
        }"#;

        let details: MovieDetails = decode::<DetailsResponse>(body).unwrap().into();
        assert_eq!(details.item.title, "Fight Club");
        assert_eq!(details.tagline, None);
        assert_eq!(details.homepage, None);
        assert_eq!(details.top_cast(12)[0].name, "Edward Norton");
        assert_eq!(details.trailer().unwrap().key, "abc");
    }
}
