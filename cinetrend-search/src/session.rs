//! Interactive search session.
//!
//! A session is a single task that owns a `QueryController` and a
//! `SearchView`. Keystrokes arrive over a channel, the debounce deadline is
//! a timer, and every network call (listing fetch, trending read, trending
//! record) is an entry in one `FuturesUnordered`. Nothing ever awaits a
//! network call directly, so input is accepted while fetches are in flight.
//! The rendered view is published through a `watch` channel.

use std::sync::Arc;
use std::time::Duration;

use cinetrend_core::TrendingEntry;
use futures::future::BoxFuture;
use futures::stream::FuturesUnordered;
use futures::{FutureExt, StreamExt};
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::{Instant, sleep_until};

use crate::debounce::{FetchRequest, FetchToken, QueryController};
use crate::errors::SessionError;
use crate::orchestrator::{FetchOutcome, SearchOrchestrator, SearchView};

/// Network work completed on behalf of the session.
enum Completion {
    Listing {
        token: FetchToken,
        outcome: FetchOutcome,
    },
    Trending(Vec<TrendingEntry>),
    Recorded,
}

type PendingWork = BoxFuture<'static, Completion>;

/// Handle for feeding input to a running search session.
#[derive(Debug)]
pub struct SearchSessionHandle {
    input: mpsc::Sender<String>,
    view: watch::Receiver<SearchView>,
    task: JoinHandle<()>,
}

impl SearchSessionHandle {
    /// Replaces the current input with `text`.
    ///
    /// # Errors
    /// - `SessionError::SessionClosed` - The session task has stopped
    pub async fn input(&self, text: impl Into<String>) -> Result<(), SessionError> {
        self.input
            .send(text.into())
            .await
            .map_err(|_| SessionError::SessionClosed)
    }

    /// Latest published view.
    pub fn view(&self) -> SearchView {
        self.view.borrow().clone()
    }

    /// Receiver notified on every view change.
    pub fn subscribe(&self) -> watch::Receiver<SearchView> {
        self.view.clone()
    }

    /// Closes the input, lets pending work finish and returns the final view.
    ///
    /// Input typed before shutdown still settles after its window.
    pub async fn shutdown(self) -> SearchView {
        let Self { input, view, task } = self;
        drop(input);
        if let Err(e) = task.await {
            tracing::warn!("Search session task ended abnormally: {e}");
        }
        view.borrow().clone()
    }
}

/// Spawns a search session and returns its handle.
///
/// The session immediately issues the initial popular fetch and the
/// one-time trending read.
pub fn spawn_search_session(
    orchestrator: Arc<SearchOrchestrator>,
    window: Duration,
) -> SearchSessionHandle {
    let (input_tx, input_rx) = mpsc::channel(64);
    let (view_tx, view_rx) = watch::channel(SearchView::default());

    let task = tokio::spawn(async move {
        run_session_loop(orchestrator, QueryController::new(window), input_rx, view_tx).await;
    });

    SearchSessionHandle {
        input: input_tx,
        view: view_rx,
        task,
    }
}

async fn run_session_loop(
    orchestrator: Arc<SearchOrchestrator>,
    mut controller: QueryController,
    mut input: mpsc::Receiver<String>,
    view_tx: watch::Sender<SearchView>,
) {
    tracing::debug!(
        window_ms = controller.window().as_millis() as u64,
        "Search session started"
    );

    let mut view = SearchView::default();
    let mut pending: FuturesUnordered<PendingWork> = FuturesUnordered::new();
    let mut input_open = true;

    if let Some(request) = controller.mount() {
        start_listing(&orchestrator, &mut view, &mut pending, request);
    }
    let trending_source = orchestrator.clone();
    pending.push(
        async move { Completion::Trending(trending_source.load_trending().await) }.boxed(),
    );
    view_tx.send_replace(view.clone());

    loop {
        let deadline = controller.deadline();

        tokio::select! {
            text = input.recv(), if input_open => match text {
                Some(text) => {
                    controller.on_input(text.clone(), Instant::now());
                    view.raw_input = text;
                    view_tx.send_replace(view.clone());
                }
                None => {
                    tracing::debug!("Search session input closed");
                    input_open = false;
                }
            },
            () = sleep_until(deadline.unwrap_or_else(Instant::now)), if deadline.is_some() => {
                if let Some(request) = controller.poll_settle(Instant::now()) {
                    start_listing(&orchestrator, &mut view, &mut pending, request);
                    view_tx.send_replace(view.clone());
                }
            }
            Some(done) = pending.next(), if !pending.is_empty() => {
                if handle_completion(&orchestrator, &mut controller, &mut view, &mut pending, done) {
                    view_tx.send_replace(view.clone());
                }
            }
            else => break,
        }
    }

    tracing::debug!("Search session stopped");
}

fn start_listing(
    orchestrator: &Arc<SearchOrchestrator>,
    view: &mut SearchView,
    pending: &mut FuturesUnordered<PendingWork>,
    request: FetchRequest,
) {
    orchestrator.begin(view, &request.query);

    let orchestrator = orchestrator.clone();
    let FetchRequest { token, query } = request;
    pending.push(
        async move {
            let outcome = orchestrator.fetch(&query).await;
            Completion::Listing { token, outcome }
        }
        .boxed(),
    );
}

/// Applies finished work. Returns true when the view changed.
fn handle_completion(
    orchestrator: &Arc<SearchOrchestrator>,
    controller: &mut QueryController,
    view: &mut SearchView,
    pending: &mut FuturesUnordered<PendingWork>,
    done: Completion,
) -> bool {
    match done {
        Completion::Listing { token, outcome } => {
            if !controller.commit(token) {
                return false;
            }
            if let Some(event) = orchestrator.apply(view, outcome) {
                let orchestrator = orchestrator.clone();
                pending.push(
                    async move {
                        orchestrator.record(event).await;
                        Completion::Recorded
                    }
                    .boxed(),
                );
            }
            true
        }
        Completion::Trending(entries) => {
            view.trending = entries;
            true
        }
        Completion::Recorded => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::CatalogError;
    use crate::images::ImageUrls;
    use crate::orchestrator::ListingPhase;
    use crate::providers::mock::{CatalogCall, RecordingFeed, ScriptedCatalog, movie};

    const WINDOW: Duration = Duration::from_millis(1000);

    fn start(
        catalog: ScriptedCatalog,
        feed: RecordingFeed,
    ) -> (SearchSessionHandle, Arc<ScriptedCatalog>, Arc<RecordingFeed>) {
        let catalog = Arc::new(catalog);
        let feed = Arc::new(feed);
        let orchestrator = Arc::new(SearchOrchestrator::new(
            catalog.clone(),
            feed.clone(),
            ImageUrls::default(),
        ));
        (spawn_search_session(orchestrator, WINDOW), catalog, feed)
    }

    async fn advance(ms: u64) {
        tokio::time::sleep(Duration::from_millis(ms)).await;
    }

    fn ids(view: &SearchView) -> Vec<u64> {
        view.movies.iter().map(|m| m.id).collect()
    }

    #[tokio::test(start_paused = true)]
    async fn test_mount_loads_popular_and_trending_once() {
        let trending = serde_json::from_value(serde_json::json!([
            {"movieId": 603, "searchTerm": "matrix", "posterUrl": "/p.jpg", "count": 3}
        ]))
        .unwrap();
        let (handle, catalog, feed) = start(
            ScriptedCatalog::new()
                .with_popular(vec![movie(1, "Popular")])
                .with_search("alien", vec![movie(348, "Alien")]),
            RecordingFeed::new().with_trending(trending),
        );

        handle.input("alien").await.unwrap();
        advance(2000).await;

        let view = handle.view();
        assert_eq!(view.trending.len(), 1);
        assert_eq!(view.trending[0].item_id, 603);
        assert_eq!(feed.trending_reads(), 1);
        assert_eq!(
            catalog.calls(),
            vec![CatalogCall::Popular, CatalogCall::Search("alien".to_string())]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_stale_response_never_overwrites_newer() {
        let (handle, _, feed) = start(
            ScriptedCatalog::new()
                .with_search_delayed("a", vec![movie(1, "Slow")], Duration::from_millis(3000))
                .with_search_delayed("ab", vec![movie(2, "Fast")], Duration::from_millis(100)),
            RecordingFeed::new(),
        );

        handle.input("a").await.unwrap();
        advance(1100).await;
        handle.input("ab").await.unwrap();

        let mut views = handle.subscribe();
        views
            .wait_for(|view| view.phase == ListingPhase::Displayed && ids(view) == vec![2])
            .await
            .unwrap();

        advance(5000).await;

        let view = handle.view();
        assert_eq!(ids(&view), vec![2]);
        assert_eq!(view.settled_query, "ab");

        let events = feed.events();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].term, "ab");
        assert_eq!(events[0].top_item_id, 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_rapid_typing_issues_one_search() {
        let (handle, catalog, _) = start(
            ScriptedCatalog::new().with_search("matr", vec![movie(603, "The Matrix")]),
            RecordingFeed::new(),
        );

        for text in ["m", "ma", "mat", "matr"] {
            handle.input(text).await.unwrap();
            advance(200).await;
            assert_eq!(handle.view().settled_query, "");
        }
        advance(2000).await;

        assert_eq!(catalog.search_count(), 1);
        assert_eq!(
            catalog.calls().last(),
            Some(&CatalogCall::Search("matr".to_string()))
        );
        assert_eq!(handle.view().settled_query, "matr");
    }

    #[tokio::test(start_paused = true)]
    async fn test_one_record_per_settled_query() {
        let (handle, catalog, feed) = start(
            ScriptedCatalog::new().with_search(
                "matrix",
                vec![movie(603, "The Matrix"), movie(604, "Reloaded")],
            ),
            RecordingFeed::new(),
        );

        handle.input("matrix").await.unwrap();
        advance(1500).await;
        handle.input("matrix ").await.unwrap();
        advance(1500).await;

        assert_eq!(catalog.search_count(), 1);
        let events = feed.events();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].top_item_id, 603);
    }

    #[tokio::test(start_paused = true)]
    async fn test_clearing_input_returns_to_popular() {
        let (handle, catalog, feed) = start(
            ScriptedCatalog::new().with_popular(vec![movie(1, "Popular")]),
            RecordingFeed::new(),
        );

        handle.input("abc").await.unwrap();
        advance(1500).await;
        assert!(handle.view().movies.is_empty());

        handle.input("").await.unwrap();
        advance(1500).await;

        assert_eq!(ids(&handle.view()), vec![1]);
        assert_eq!(
            catalog.calls(),
            vec![
                CatalogCall::Popular,
                CatalogCall::Search("abc".to_string()),
                CatalogCall::Popular,
            ]
        );
        assert!(feed.events().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_failure_shows_exclusive_error() {
        let (handle, _, feed) = start(
            ScriptedCatalog::new()
                .with_popular(vec![movie(1, "Popular")])
                .failing_search(
                    "boom",
                    CatalogError::UpstreamUnavailable {
                        reason: "HTTP 503 Service Unavailable".to_string(),
                    },
                ),
            RecordingFeed::new(),
        );

        advance(10).await;
        assert_eq!(ids(&handle.view()), vec![1]);

        handle.input("boom").await.unwrap();
        advance(1500).await;

        let view = handle.view();
        assert_eq!(view.phase, ListingPhase::ErrorDisplayed);
        assert!(view.movies.is_empty());
        assert!(view.error.is_some());
        assert!(feed.events().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_popular_failure_on_mount_shows_error() {
        let (handle, catalog, feed) = start(
            ScriptedCatalog::new().failing_popular(CatalogError::UpstreamUnavailable {
                reason: "HTTP 502 Bad Gateway".to_string(),
            }),
            RecordingFeed::new(),
        );

        advance(10).await;

        let view = handle.view();
        assert_eq!(view.phase, ListingPhase::ErrorDisplayed);
        assert_eq!(view.settled_query, "");
        assert!(view.movies.is_empty());
        assert_eq!(
            view.error.as_deref(),
            Some("Failed to fetch movies: HTTP 502 Bad Gateway")
        );
        assert_eq!(catalog.calls(), vec![CatalogCall::Popular]);
        assert!(feed.events().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_shutdown_settles_pending_input() {
        let (handle, _, feed) = start(
            ScriptedCatalog::new().with_search("heat", vec![movie(949, "Heat")]),
            RecordingFeed::new(),
        );

        handle.input("heat").await.unwrap();
        let view = handle.shutdown().await;

        assert_eq!(view.settled_query, "heat");
        assert_eq!(ids(&view), vec![949]);
        assert_eq!(feed.events().len(), 1);
    }
}
