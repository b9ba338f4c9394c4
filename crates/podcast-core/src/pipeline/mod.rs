//! Acquisition pipeline: trending and search streams over one catalog source.
//!
//! Each stream carries its own request sequence. Responses are applied only
//! when their sequence is still the latest for the stream, so a slow response
//! can never overwrite the result of a newer request. Search input is
//! debounced through a timer owned by the pipeline instance.

pub mod debounce;
pub mod state;

#[cfg(test)]
mod tests;

pub use debounce::Debouncer;
pub use state::{FetchOutcome, PipelineSnapshot, SkipReason, StreamState};

use podcast_config::Config;
use podcast_models::{Podcast, ResultSet};
use podcast_sources::{CatalogError, CatalogSource, SearchPage};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{watch, Mutex};
use tracing::{debug, info};
use crate::degradation::{AcquisitionKind, DegradationPolicy, Diagnostic};
use state::StreamTracker;

#[derive(Debug, Clone, Copy)]
pub struct PipelineOptions {
    pub debounce: Duration,
    pub request_timeout: Duration,
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self {
            debounce: Duration::from_millis(500),
            request_timeout: Duration::from_secs(10),
        }
    }
}

impl PipelineOptions {
    pub fn from_config(config: &Config) -> Self {
        Self {
            debounce: config.search.debounce(),
            request_timeout: config.catalog.request_timeout(),
        }
    }
}

struct PipelineState {
    trending_stream: StreamTracker,
    search_stream: StreamTracker,
    /// Last-known trending view; the discover view falls back to it when the query is cleared
    trending: Option<ResultSet>,
    trending_diagnostic: Option<Diagnostic>,
    discover: ResultSet,
    search_diagnostic: Option<Diagnostic>,
    active_query: Option<String>,
}

impl PipelineState {
    fn new() -> Self {
        Self {
            trending_stream: StreamTracker::new(),
            search_stream: StreamTracker::new(),
            trending: None,
            trending_diagnostic: None,
            discover: ResultSet::empty(),
            search_diagnostic: None,
            active_query: None,
        }
    }

    fn snapshot(&self) -> PipelineSnapshot {
        let diagnostic = if self.active_query.is_some() {
            self.search_diagnostic
        } else {
            self.trending_diagnostic
        };

        PipelineSnapshot {
            discover: self.discover.clone(),
            trending: self.trending.clone().unwrap_or_default(),
            active_query: self.active_query.clone(),
            diagnostic,
            trending_state: self.trending_stream.state,
            search_state: self.search_stream.state,
            trending_loading: self.trending_stream.is_loading(),
            search_loading: self.search_stream.is_loading(),
        }
    }
}

pub struct AcquisitionPipeline<S: CatalogSource + 'static> {
    source: Arc<S>,
    policy: Arc<DegradationPolicy>,
    state: Arc<Mutex<PipelineState>>,
    debouncer: Arc<Debouncer>,
    request_timeout: Duration,
    revision: Arc<watch::Sender<u64>>,
}

impl<S: CatalogSource + 'static> Clone for AcquisitionPipeline<S> {
    fn clone(&self) -> Self {
        Self {
            source: self.source.clone(),
            policy: self.policy.clone(),
            state: self.state.clone(),
            debouncer: self.debouncer.clone(),
            request_timeout: self.request_timeout,
            revision: self.revision.clone(),
        }
    }
}

impl<S: CatalogSource + 'static> AcquisitionPipeline<S> {
    pub fn new(source: S, policy: DegradationPolicy, options: PipelineOptions) -> Self {
        let (revision, _) = watch::channel(0);
        Self {
            source: Arc::new(source),
            policy: Arc::new(policy),
            state: Arc::new(Mutex::new(PipelineState::new())),
            debouncer: Arc::new(Debouncer::new(options.debounce)),
            request_timeout: options.request_timeout,
            revision: Arc::new(revision),
        }
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    /// Receiver that ticks every time the view changes
    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.revision.subscribe()
    }

    fn notify(&self) {
        self.revision.send_modify(|revision| *revision += 1);
    }

    async fn bounded<Fut>(&self, request: Fut) -> Result<SearchPage, CatalogError>
    where
        Fut: Future<Output = Result<SearchPage, CatalogError>>,
    {
        match tokio::time::timeout(self.request_timeout, request).await {
            Ok(outcome) => outcome,
            Err(_) => Err(CatalogError::Timeout(self.request_timeout)),
        }
    }

    /// Load the trending listing; ends in `Succeeded` or `Degraded`
    pub async fn fetch_trending(&self) -> FetchOutcome {
        let seq = {
            let mut state = self.state.lock().await;
            state.trending_stream.issue()
        };
        self.notify();
        debug!(operation = "trending", seq = seq, "Fetching trending podcasts");

        let source = self.source.clone();
        let request = async move {
            source
                .fetch_trending()
                .await
                .map(|items| SearchPage { items, has_more: false })
        };
        let acquisition = self
            .policy
            .attempt(AcquisitionKind::Trending, 1, self.bounded(request))
            .await;

        {
            let mut state = self.state.lock().await;
            if !state.trending_stream.is_current(seq) {
                debug!(operation = "trending", seq = seq, "Discarding superseded trending response");
                return FetchOutcome::Superseded;
            }

            let (trending_view, discover_seed) = if acquisition.result_set.is_fallback() {
                let fallback = self.policy.fallback();
                (fallback.trending(), fallback.all())
            } else {
                (acquisition.result_set.clone(), acquisition.result_set.clone())
            };

            state.trending_stream.state = StreamState::from_acquisition(&acquisition);
            state.trending = Some(trending_view);
            state.trending_diagnostic = acquisition.diagnostic;
            if state.active_query.is_none() {
                state.discover = discover_seed;
            }
        }
        self.notify();
        info!(
            operation = "trending",
            count = acquisition.result_set.len(),
            degraded = acquisition.is_degraded(),
            "Trending view updated"
        );

        FetchOutcome::Applied(acquisition)
    }

    /// Run a search immediately, bypassing the debounce timer.
    ///
    /// Page 1 replaces the discover view; later pages append to it. A blank
    /// query resets the view to the last trending listing without calling
    /// upstream.
    pub async fn search(&self, query: &str, page: u32) -> FetchOutcome {
        let query = query.trim().to_string();
        let page = page.max(1);

        let seq = {
            let mut state = self.state.lock().await;

            if query.is_empty() {
                state.search_stream.reset();
                state.active_query = None;
                state.search_diagnostic = None;
                state.discover = state.trending.clone().unwrap_or_default();
                drop(state);
                self.notify();
                debug!(operation = "search", "Query cleared, showing trending");
                return FetchOutcome::Cleared;
            }

            if page > 1 {
                if state.search_stream.is_loading() {
                    return FetchOutcome::Skipped(SkipReason::AlreadyLoading);
                }
                if state.active_query.as_deref() != Some(query.as_str()) {
                    return FetchOutcome::Skipped(SkipReason::QueryMismatch);
                }
                if !state.discover.has_more {
                    return FetchOutcome::Skipped(SkipReason::NoMorePages);
                }
            } else {
                state.active_query = Some(query.clone());
                state.search_diagnostic = None;
            }

            state.search_stream.issue()
        };
        self.notify();
        debug!(operation = "search", seq = seq, query = %query, page = page, "Searching podcasts");

        let source = self.source.clone();
        let request_query = query.clone();
        let request = async move { source.search(&request_query, page).await };
        let acquisition = self
            .policy
            .attempt(AcquisitionKind::Search, page, self.bounded(request))
            .await;

        {
            let mut state = self.state.lock().await;
            if !state.search_stream.is_current(seq) {
                debug!(
                    operation = "search",
                    seq = seq,
                    query = %query,
                    page = page,
                    "Discarding superseded search response"
                );
                return FetchOutcome::Superseded;
            }

            state.search_stream.state = StreamState::from_acquisition(&acquisition);
            state.search_diagnostic = acquisition.diagnostic;
            state.discover = if page > 1 && !acquisition.result_set.is_fallback() {
                state.discover.appended(acquisition.result_set.clone())
            } else {
                acquisition.result_set.clone()
            };
        }
        self.notify();
        info!(
            operation = "search",
            query = %query,
            page = page,
            count = acquisition.result_set.len(),
            has_more = acquisition.result_set.has_more,
            degraded = acquisition.is_degraded(),
            "Search view updated"
        );

        FetchOutcome::Applied(acquisition)
    }

    /// Fetch the next page of the active query ("load more")
    pub async fn load_more(&self) -> FetchOutcome {
        let (query, next_page) = {
            let state = self.state.lock().await;
            match &state.active_query {
                Some(query) => (query.clone(), state.discover.page + 1),
                None => return FetchOutcome::Skipped(SkipReason::QueryMismatch),
            }
        };
        self.search(&query, next_page).await
    }

    /// Feed a query edit through the debounce timer.
    ///
    /// Only the last edit within the quiet window reaches `search(query, 1)`.
    pub async fn on_query_change(&self, query: impl Into<String>) {
        let query = query.into();
        let pipeline = self.clone();
        self.debouncer
            .schedule(async move {
                pipeline.search(&query, 1).await;
            })
            .await;
    }

    /// Drop any pending debounced search
    pub async fn cancel_pending(&self) {
        self.debouncer.cancel().await;
    }

    pub async fn snapshot(&self) -> PipelineSnapshot {
        self.state.lock().await.snapshot()
    }

    /// Hide the current diagnostic until the next fetch produces one
    pub async fn dismiss_diagnostic(&self) {
        {
            let mut state = self.state.lock().await;
            state.trending_diagnostic = None;
            state.search_diagnostic = None;
        }
        self.notify();
    }

    /// Look a podcast up in the current views, then in the bundled samples
    pub async fn find_podcast(&self, podcast_id: &str) -> Option<Podcast> {
        let state = self.state.lock().await;
        state
            .discover
            .items
            .iter()
            .chain(state.trending.iter().flat_map(|t| t.items.iter()))
            .find(|p| p.id == podcast_id)
            .cloned()
            .or_else(|| self.policy.fallback().find(podcast_id).cloned())
    }
}
