//! Paginated catalog search orchestration.
//!
//! One [`SearchEngine`] owns one query session: the current query, the
//! 1-based page cursor, and the aggregated result list. Callers drive it
//! with [`search`](SearchEngine::search) and
//! [`load_more`](SearchEngine::load_more); registered observers are
//! invoked synchronously by the owning task after each completed
//! operation. Session state lives behind a mutex that is never held
//! across an await: the in-flight guard and all mutation happen in short
//! critical sections on either side of the catalog call.

use std::collections::HashSet;
use std::sync::Arc;

use bytes::Bytes;
use parking_lot::Mutex;
use tracing::{debug, warn};

use crate::domain::entities::{Image, SearchResponse};
use crate::domain::errors::ApiError;
use crate::domain::ports::{CatalogPort, ImageCachePort};
use crate::domain::services::result_mapper;

/// Phase of the engine's fetch state machine.
///
/// At most one of `Searching` and `LoadingMore` holds at any time; a call
/// arriving while either is active is dropped as a no-op.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SearchPhase {
    /// No operation in flight.
    #[default]
    Idle,
    /// A fresh search (page 1) is in flight.
    Searching,
    /// A next-page fetch for the current query is in flight.
    LoadingMore,
    /// The last operation failed; results are whatever the last success
    /// left behind.
    Error,
}

impl SearchPhase {
    /// Returns true while a fetch is outstanding.
    #[must_use]
    pub const fn is_fetching(self) -> bool {
        matches!(self, Self::Searching | Self::LoadingMore)
    }
}

type ResultsObserver = Box<dyn Fn() + Send + Sync>;
type ErrorObserver = Box<dyn Fn(&ApiError) + Send + Sync>;
type EmptyStateObserver = Box<dyn Fn(bool) + Send + Sync>;

#[derive(Default)]
struct Observers {
    results_changed: Vec<ResultsObserver>,
    fetch_error: Vec<ErrorObserver>,
    empty_state: Vec<EmptyStateObserver>,
}

struct SessionState {
    query: String,
    page: u32,
    phase: SearchPhase,
    results: Vec<Image>,
    seen_urls: HashSet<String>,
}

impl Default for SessionState {
    fn default() -> Self {
        Self {
            query: String::new(),
            page: 1,
            phase: SearchPhase::Idle,
            results: Vec::new(),
            seen_urls: HashSet::new(),
        }
    }
}

/// Orchestrates paginated catalog queries and owns the aggregated,
/// url-deduplicated result list for one query session.
pub struct SearchEngine {
    catalog: Arc<dyn CatalogPort>,
    cache: Arc<dyn ImageCachePort>,
    state: Mutex<SessionState>,
    observers: Mutex<Observers>,
}

impl SearchEngine {
    /// Creates an engine over the given catalog and image cache.
    #[must_use]
    pub fn new(catalog: Arc<dyn CatalogPort>, cache: Arc<dyn ImageCachePort>) -> Self {
        Self {
            catalog,
            cache,
            state: Mutex::new(SessionState::default()),
            observers: Mutex::new(Observers::default()),
        }
    }

    /// Registers an observer fired once after every successful search or
    /// load-more completion, after results are appended.
    pub fn on_results_changed(&self, observer: impl Fn() + Send + Sync + 'static) {
        self.observers.lock().results_changed.push(Box::new(observer));
    }

    /// Registers an observer fired once per failed operation with the
    /// terminal error.
    pub fn on_fetch_error(&self, observer: impl Fn(&ApiError) + Send + Sync + 'static) {
        self.observers.lock().fetch_error.push(Box::new(observer));
    }

    /// Registers an observer fired after every successful completion with
    /// whether the aggregated result list is empty.
    pub fn on_empty_state(&self, observer: impl Fn(bool) + Send + Sync + 'static) {
        self.observers.lock().empty_state.push(Box::new(observer));
    }

    /// Starts a fresh search session for `query`.
    ///
    /// No-op when a search or load-more is already in flight. Otherwise
    /// clears the result list, resets the page cursor to 1, and fetches
    /// the first page.
    pub async fn search(&self, query: &str, start_year: i32, end_year: i32) {
        {
            let mut state = self.state.lock();
            if state.phase.is_fetching() {
                debug!(query, "search ignored, an operation is already in flight");
                return;
            }
            state.phase = SearchPhase::Searching;
            state.query = query.to_string();
            state.page = 1;
            state.results.clear();
            state.seen_urls.clear();
        }

        debug!(query, start_year, end_year, "searching catalog");
        let outcome = self.catalog.query(query, 1, start_year, end_year).await;
        self.complete(outcome);
    }

    /// Fetches the next page of the current query and appends its results.
    ///
    /// No-op when a search or load-more is already in flight. The page
    /// cursor advances even when the fetch fails, mirroring the attempt;
    /// there is no automatic retry.
    pub async fn load_more(&self, start_year: i32, end_year: i32) {
        let (query, page) = {
            let mut state = self.state.lock();
            if state.phase.is_fetching() {
                debug!("load_more ignored, an operation is already in flight");
                return;
            }
            state.phase = SearchPhase::LoadingMore;
            state.page += 1;
            (state.query.clone(), state.page)
        };

        debug!(query, page, "loading next catalog page");
        let outcome = self.catalog.query(&query, page, start_year, end_year).await;
        self.complete(outcome);
    }

    /// Folds one fetch outcome into the session and notifies observers.
    fn complete(&self, outcome: Result<SearchResponse, ApiError>) {
        match outcome {
            Ok(response) => {
                let mapped = result_mapper::map_response(&response);
                let is_empty = {
                    let mut state = self.state.lock();
                    for image in mapped {
                        if state.seen_urls.insert(image.url.clone()) {
                            state.results.push(image);
                        }
                    }
                    state.phase = SearchPhase::Idle;
                    state.results.is_empty()
                };
                let observers = self.observers.lock();
                for observer in &observers.results_changed {
                    observer();
                }
                for observer in &observers.empty_state {
                    observer(is_empty);
                }
            }
            Err(error) => {
                warn!(%error, "catalog fetch failed");
                self.state.lock().phase = SearchPhase::Error;
                let observers = self.observers.lock();
                for observer in &observers.fetch_error {
                    observer(&error);
                }
            }
        }
    }

    /// Number of aggregated results.
    #[must_use]
    pub fn result_count(&self) -> usize {
        self.state.lock().results.len()
    }

    /// Result at `index`, in arrival order.
    ///
    /// # Errors
    /// Returns [`ApiError::OutOfRange`] when `index` is past the end of
    /// the result list.
    pub fn result_at(&self, index: usize) -> Result<Image, ApiError> {
        let state = self.state.lock();
        state
            .results
            .get(index)
            .cloned()
            .ok_or(ApiError::OutOfRange {
                index,
                len: state.results.len(),
            })
    }

    /// Snapshot of the aggregated result list.
    #[must_use]
    pub fn results(&self) -> Vec<Image> {
        self.state.lock().results.clone()
    }

    /// Current 1-based page cursor.
    #[must_use]
    pub fn current_page(&self) -> u32 {
        self.state.lock().page
    }

    /// Query of the current session.
    #[must_use]
    pub fn current_query(&self) -> String {
        self.state.lock().query.clone()
    }

    /// Current phase of the fetch state machine.
    #[must_use]
    pub fn phase(&self) -> SearchPhase {
        self.state.lock().phase
    }

    /// Returns the cached bytes for an image, fetching on a miss.
    ///
    /// Delegates to the image cache; concurrent callers for the same key
    /// share one fetch.
    ///
    /// # Errors
    /// Propagates the cache's fetch error on a failed miss.
    pub async fn load_image(&self, key: &str, url: &str) -> Result<Bytes, ApiError> {
        self.cache.get_or_fetch(key, url).await
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use tokio::sync::Semaphore;

    use super::*;
    use crate::domain::ports::mocks::{MockCatalog, MockFetcher, item, response_with};
    use crate::infrastructure::cache::MemoryImageCache;

    fn engine_with(catalog: MockCatalog) -> SearchEngine {
        let fetcher = Arc::new(MockFetcher::ok(Bytes::from_static(b"png")));
        let cache = Arc::new(MemoryImageCache::with_defaults(fetcher));
        SearchEngine::new(Arc::new(catalog), cache)
    }

    #[tokio::test]
    async fn test_search_populates_results_in_response_order() {
        let catalog = MockCatalog::new();
        catalog.push_response(Ok(response_with(vec![
            item("Earth", "https://example.com/earth.jpg"),
            item("Earth at night", "https://example.com/night.jpg"),
        ])));
        let engine = engine_with(catalog);

        engine.search("Earth", 1920, 2024).await;

        assert_eq!(engine.result_count(), 2);
        assert_eq!(engine.result_at(0).unwrap().title, "Earth");
        assert_eq!(engine.result_at(1).unwrap().title, "Earth at night");
        assert_eq!(engine.phase(), SearchPhase::Idle);
        assert_eq!(engine.current_page(), 1);
    }

    #[tokio::test]
    async fn test_search_passes_query_and_year_range_to_catalog() {
        let catalog = MockCatalog::new();
        catalog.push_response(Ok(response_with(vec![])));
        let catalog = Arc::new(catalog);
        let fetcher = Arc::new(MockFetcher::ok(Bytes::new()));
        let cache = Arc::new(MemoryImageCache::with_defaults(fetcher));
        let engine = SearchEngine::new(catalog.clone(), cache);

        engine.search("apollo", 1960, 1975).await;

        let calls = catalog.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].query, "apollo");
        assert_eq!(calls[0].page, 1);
        assert_eq!(calls[0].start_year, 1960);
        assert_eq!(calls[0].end_year, 1975);
    }

    #[tokio::test]
    async fn test_malformed_items_are_dropped_not_replaced() {
        let catalog = MockCatalog::new();
        let mut linkless = item("linkless", "unused");
        linkless.links.clear();
        catalog.push_response(Ok(response_with(vec![
            item("kept", "https://example.com/kept.jpg"),
            linkless,
        ])));
        let engine = engine_with(catalog);

        engine.search("Earth", 1920, 2024).await;

        assert_eq!(engine.result_count(), 1);
        assert_eq!(engine.result_at(0).unwrap().title, "kept");
    }

    #[tokio::test]
    async fn test_new_search_replaces_previous_session() {
        let catalog = MockCatalog::new();
        catalog.push_response(Ok(response_with(vec![item(
            "old",
            "https://example.com/old.jpg",
        )])));
        catalog.push_response(Ok(response_with(vec![item(
            "new",
            "https://example.com/new.jpg",
        )])));
        let engine = engine_with(catalog);

        engine.search("old", 1920, 2024).await;
        engine.search("new", 1920, 2024).await;

        assert_eq!(engine.result_count(), 1);
        assert_eq!(engine.result_at(0).unwrap().title, "new");
        assert_eq!(engine.current_query(), "new");
    }

    #[tokio::test]
    async fn test_load_more_appends_and_never_replaces() {
        let catalog = MockCatalog::new();
        catalog.push_response(Ok(response_with(vec![item(
            "page one",
            "https://example.com/1.jpg",
        )])));
        catalog.push_response(Ok(response_with(vec![item(
            "page two",
            "https://example.com/2.jpg",
        )])));
        let engine = engine_with(catalog);

        engine.search("Earth", 1920, 2024).await;
        engine.load_more(1920, 2024).await;

        assert_eq!(engine.result_count(), 2);
        assert_eq!(engine.result_at(0).unwrap().title, "page one");
        assert_eq!(engine.result_at(1).unwrap().title, "page two");
        assert_eq!(engine.current_page(), 2);
    }

    #[tokio::test]
    async fn test_duplicate_urls_collapse_to_first_occurrence() {
        let catalog = MockCatalog::new();
        catalog.push_response(Ok(response_with(vec![item(
            "first",
            "https://example.com/same.jpg",
        )])));
        catalog.push_response(Ok(response_with(vec![item(
            "second",
            "https://example.com/same.jpg",
        )])));
        let engine = engine_with(catalog);

        engine.search("Earth", 1920, 2024).await;
        engine.load_more(1920, 2024).await;

        assert_eq!(engine.result_count(), 1);
        assert_eq!(engine.result_at(0).unwrap().title, "first");
    }

    #[tokio::test]
    async fn test_load_more_failure_keeps_results_and_increments_page() {
        let catalog = MockCatalog::new();
        catalog.push_response(Ok(response_with(vec![item(
            "kept",
            "https://example.com/kept.jpg",
        )])));
        catalog.push_response(Err(ApiError::Status(404)));
        let engine = engine_with(catalog);

        let seen = Arc::new(Mutex::new(Vec::new()));
        let seen_in_observer = seen.clone();
        engine.on_fetch_error(move |error| {
            seen_in_observer.lock().push(error.clone());
        });

        engine.search("Earth", 1920, 2024).await;
        engine.load_more(1920, 2024).await;

        assert_eq!(engine.result_count(), 1);
        assert_eq!(engine.current_page(), 2);
        assert_eq!(engine.phase(), SearchPhase::Error);
        let seen = seen.lock();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].status_code(), Some(404));
    }

    #[tokio::test]
    async fn test_failed_search_surfaces_error_once() {
        let catalog = MockCatalog::new();
        catalog.push_response(Err(ApiError::transport("unreachable")));
        let engine = engine_with(catalog);

        let errors = Arc::new(AtomicUsize::new(0));
        let errors_in_observer = errors.clone();
        engine.on_fetch_error(move |_| {
            errors_in_observer.fetch_add(1, Ordering::SeqCst);
        });
        let updates = Arc::new(AtomicUsize::new(0));
        let updates_in_observer = updates.clone();
        engine.on_results_changed(move || {
            updates_in_observer.fetch_add(1, Ordering::SeqCst);
        });

        engine.search("Earth", 1920, 2024).await;

        assert_eq!(errors.load(Ordering::SeqCst), 1);
        assert_eq!(updates.load(Ordering::SeqCst), 0);
        assert_eq!(engine.phase(), SearchPhase::Error);
    }

    #[tokio::test]
    async fn test_calls_during_in_flight_operation_are_no_ops() {
        let gate = Arc::new(Semaphore::new(0));
        let catalog = MockCatalog::new().gated(gate.clone());
        catalog.push_response(Ok(response_with(vec![item(
            "slow",
            "https://example.com/slow.jpg",
        )])));
        let catalog = Arc::new(catalog);
        let fetcher = Arc::new(MockFetcher::ok(Bytes::new()));
        let cache = Arc::new(MemoryImageCache::with_defaults(fetcher));
        let engine = Arc::new(SearchEngine::new(catalog.clone(), cache));

        let searching = engine.clone();
        let first = tokio::spawn(async move {
            searching.search("slow", 1920, 2024).await;
        });
        for _ in 0..8 {
            tokio::task::yield_now().await;
        }
        assert_eq!(engine.phase(), SearchPhase::Searching);

        // Both of these must be dropped while the first search is held open.
        engine.search("ignored", 1920, 2024).await;
        engine.load_more(1920, 2024).await;

        assert_eq!(engine.current_query(), "slow");
        assert_eq!(engine.current_page(), 1);
        assert_eq!(catalog.call_count(), 1);

        gate.add_permits(1);
        first.await.unwrap();

        assert_eq!(engine.result_count(), 1);
        assert_eq!(engine.phase(), SearchPhase::Idle);
        assert_eq!(catalog.call_count(), 1);
    }

    #[tokio::test]
    async fn test_results_changed_fires_once_per_successful_operation() {
        let catalog = MockCatalog::new();
        catalog.push_response(Ok(response_with(vec![item(
            "one",
            "https://example.com/1.jpg",
        )])));
        catalog.push_response(Ok(response_with(vec![item(
            "two",
            "https://example.com/2.jpg",
        )])));
        let engine = engine_with(catalog);

        let updates = Arc::new(AtomicUsize::new(0));
        let updates_in_observer = updates.clone();
        engine.on_results_changed(move || {
            updates_in_observer.fetch_add(1, Ordering::SeqCst);
        });

        engine.search("Earth", 1920, 2024).await;
        assert_eq!(updates.load(Ordering::SeqCst), 1);

        engine.load_more(1920, 2024).await;
        assert_eq!(updates.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_empty_state_observer_tracks_emptiness() {
        let catalog = MockCatalog::new();
        catalog.push_response(Ok(response_with(vec![])));
        catalog.push_response(Ok(response_with(vec![item(
            "hit",
            "https://example.com/hit.jpg",
        )])));
        let engine = engine_with(catalog);

        let states = Arc::new(Mutex::new(Vec::new()));
        let states_in_observer = states.clone();
        engine.on_empty_state(move |is_empty| {
            states_in_observer.lock().push(is_empty);
        });

        engine.search("nothing", 1920, 2024).await;
        engine.search("hit", 1920, 2024).await;

        assert_eq!(*states.lock(), vec![true, false]);
    }

    #[tokio::test]
    async fn test_result_at_out_of_range() {
        let catalog = MockCatalog::new();
        catalog.push_response(Ok(response_with(vec![item(
            "only",
            "https://example.com/only.jpg",
        )])));
        let engine = engine_with(catalog);

        engine.search("Earth", 1920, 2024).await;

        let error = engine.result_at(5).unwrap_err();
        assert!(matches!(error, ApiError::OutOfRange { index: 5, len: 1 }));
    }

    #[tokio::test]
    async fn test_load_image_delegates_to_cache() {
        let catalog = MockCatalog::new();
        let fetcher = Arc::new(MockFetcher::ok(Bytes::from_static(b"jpeg bytes")));
        let cache = Arc::new(MemoryImageCache::with_defaults(fetcher.clone()));
        let engine = SearchEngine::new(Arc::new(catalog), cache);

        let url = "https://example.com/earth.jpg";
        let first = engine.load_image(url, url).await.unwrap();
        let second = engine.load_image(url, url).await.unwrap();

        assert_eq!(first, Bytes::from_static(b"jpeg bytes"));
        assert_eq!(second, first);
        assert_eq!(fetcher.calls(), 1);
    }
}
