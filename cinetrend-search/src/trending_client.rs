//! Remote trending service client.

use std::time::Duration;

use async_trait::async_trait;
use cinetrend_core::{SearchEvent, StoreError, TrendingEntry, TrendingFeed};

/// Talks to a trending service over its HTTP surface.
///
/// Non-2xx answers and transport failures both map to
/// `StoreError::StoreUnavailable`; the `TrendingFeed` impl logs and
/// discards them.
#[derive(Debug, Clone)]
pub struct HttpTrendingClient {
    client: reqwest::Client,
    base_url: String,
}

impl HttpTrendingClient {
    /// Creates a client for the service rooted at `base_url`.
    ///
    /// Requests that outlast `timeout` fail as `StoreUnavailable`.
    ///
    /// # Errors
    ///
    /// - `StoreError::StoreUnavailable` - If the HTTP client cannot be built
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, StoreError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| StoreError::StoreUnavailable {
                reason: format!("HTTP client setup failed: {e}"),
            })?;

        Ok(Self::with_client(client, base_url))
    }

    /// Creates a client reusing an existing HTTP client.
    pub fn with_client(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    /// Posts a search event and returns the updated entry.
    ///
    /// # Errors
    /// - `StoreError::StoreUnavailable` - Unreachable service, non-2xx status or undecodable body
    pub async fn try_record(&self, event: &SearchEvent) -> Result<TrendingEntry, StoreError> {
        let response = self
            .client
            .post(format!("{}/trending/search", self.base_url))
            .json(event)
            .send()
            .await
            .map_err(unavailable)?;

        check_status(&response)?;
        response.json().await.map_err(unavailable)
    }

    /// Reads the trending list.
    ///
    /// # Errors
    /// - `StoreError::StoreUnavailable` - Unreachable service, non-2xx status or undecodable body
    pub async fn try_trending(&self) -> Result<Vec<TrendingEntry>, StoreError> {
        let response = self
            .client
            .get(format!("{}/trending", self.base_url))
            .send()
            .await
            .map_err(unavailable)?;

        check_status(&response)?;
        response.json().await.map_err(unavailable)
    }
}

fn check_status(response: &reqwest::Response) -> Result<(), StoreError> {
    let status = response.status();
    if status.is_success() {
        return Ok(());
    }
    Err(StoreError::StoreUnavailable {
        reason: format!("trending service answered HTTP {status}"),
    })
}

fn unavailable(e: reqwest::Error) -> StoreError {
    StoreError::StoreUnavailable {
        reason: e.to_string(),
    }
}

#[async_trait]
impl TrendingFeed for HttpTrendingClient {
    async fn record_search(&self, event: SearchEvent) {
        if let Err(e) = self.try_record(&event).await {
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

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::net::TcpListener;

    const TIMEOUT: Duration = Duration::from_secs(5);

    #[test]
    fn test_base_url_trailing_slash_trimmed() {
        let client = HttpTrendingClient::new("http://127.0.0.1:8080/", TIMEOUT).unwrap();
        assert_eq!(client.base_url, "http://127.0.0.1:8080");
    }

    #[tokio::test]
    async fn test_silent_service_times_out() {
        // Bound but never accepted: the connection opens, no answer ever comes.
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let client =
            HttpTrendingClient::new(format!("http://{addr}"), Duration::from_millis(200)).unwrap();

        let result = tokio::time::timeout(Duration::from_secs(5), client.try_trending())
            .await
            .expect("client did not give up on its own");
        assert!(matches!(result, Err(StoreError::StoreUnavailable { .. })));
        assert!(
            tokio::time::timeout(Duration::from_secs(5), client.trending())
                .await
                .unwrap()
                .is_empty()
        );
        drop(listener);
    }

    #[tokio::test]
    async fn test_unreachable_service_degrades_to_empty() {
        // Port 9 (discard) is closed on loopback in test environments.
        let client = HttpTrendingClient::new("http://127.0.0.1:9", TIMEOUT).unwrap();

        assert!(client.trending().await.is_empty());
        client
            .record_search(SearchEvent {
                term: "alien".to_string(),
                top_item_id: 348,
                poster_url: String::new(),
            })
            .await;
        assert!(client.try_trending().await.is_err());
    }
}
