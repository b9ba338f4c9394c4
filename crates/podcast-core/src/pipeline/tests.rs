use super::*;
use async_trait::async_trait;
use podcast_models::{DataSource, PlatformLinks};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex as StdMutex;
use crate::fallback::FallbackDataset;

#[derive(Clone)]
enum Reply {
    Items(Vec<Podcast>, bool),
    Upstream(u16),
    Missing,
    Hang,
}

struct Scripted {
    reply: Reply,
    delay: Duration,
}

/// Catalog source that answers from a script and records every call
struct FakeSource {
    trending: StdMutex<Scripted>,
    searches: StdMutex<HashMap<(String, u32), Scripted>>,
    trending_calls: AtomicUsize,
    search_calls: StdMutex<Vec<(String, u32)>>,
}

impl FakeSource {
    fn new() -> Self {
        Self {
            trending: StdMutex::new(Scripted { reply: Reply::Items(Vec::new(), false), delay: Duration::ZERO }),
            searches: StdMutex::new(HashMap::new()),
            trending_calls: AtomicUsize::new(0),
            search_calls: StdMutex::new(Vec::new()),
        }
    }

    fn trending(self, reply: Reply) -> Self {
        self.trending_after(reply, Duration::ZERO)
    }

    fn trending_after(self, reply: Reply, delay: Duration) -> Self {
        *self.trending.lock().unwrap() = Scripted { reply, delay };
        self
    }

    fn search(self, query: &str, page: u32, reply: Reply) -> Self {
        self.search_after(query, page, reply, Duration::ZERO)
    }

    fn search_after(self, query: &str, page: u32, reply: Reply, delay: Duration) -> Self {
        self.searches
            .lock()
            .unwrap()
            .insert((query.to_string(), page), Scripted { reply, delay });
        self
    }

    fn search_calls(&self) -> Vec<(String, u32)> {
        self.search_calls.lock().unwrap().clone()
    }

    async fn play(reply: Reply, delay: Duration) -> Result<SearchPage, CatalogError> {
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        match reply {
            Reply::Items(items, has_more) => Ok(SearchPage { items, has_more }),
            Reply::Upstream(status) => Err(CatalogError::Upstream { status, body: String::new() }),
            Reply::Missing => Err(CatalogError::CredentialMissing),
            Reply::Hang => {
                tokio::time::sleep(Duration::from_secs(3600)).await;
                Ok(SearchPage { items: Vec::new(), has_more: false })
            }
        }
    }
}

#[async_trait]
impl CatalogSource for FakeSource {
    fn source_name(&self) -> &str {
        "fake"
    }

    fn has_credential(&self) -> bool {
        true
    }

    async fn fetch_trending(&self) -> Result<Vec<Podcast>, CatalogError> {
        self.trending_calls.fetch_add(1, Ordering::SeqCst);
        let (reply, delay) = {
            let scripted = self.trending.lock().unwrap();
            (scripted.reply.clone(), scripted.delay)
        };
        Self::play(reply, delay).await.map(|page| page.items)
    }

    async fn search(&self, query: &str, page: u32) -> Result<SearchPage, CatalogError> {
        self.search_calls.lock().unwrap().push((query.to_string(), page));
        let (reply, delay) = {
            let searches = self.searches.lock().unwrap();
            match searches.get(&(query.to_string(), page)) {
                Some(scripted) => (scripted.reply.clone(), scripted.delay),
                None => (Reply::Items(Vec::new(), false), Duration::ZERO),
            }
        };
        Self::play(reply, delay).await
    }
}

fn podcast(id: &str) -> Podcast {
    Podcast {
        id: id.to_string(),
        title: format!("Podcast {}", id),
        description: String::new(),
        image_url: String::new(),
        category: "Technology".to_string(),
        rating: 4.2,
        episode_count: 10,
        links: PlatformLinks::default(),
    }
}

fn podcasts(ids: &[&str]) -> Vec<Podcast> {
    ids.iter().map(|id| podcast(id)).collect()
}

fn ids(items: &[Podcast]) -> Vec<&str> {
    items.iter().map(|p| p.id.as_str()).collect()
}

fn pipeline(source: FakeSource) -> AcquisitionPipeline<FakeSource> {
    let policy = DegradationPolicy::new(FallbackDataset::bundled().unwrap());
    AcquisitionPipeline::new(source, policy, PipelineOptions::default())
}

#[tokio::test]
async fn test_missing_credential_shows_samples() {
    let pipeline = pipeline(FakeSource::new().trending(Reply::Missing));

    let outcome = pipeline.fetch_trending().await;
    let acquisition = outcome.acquisition().unwrap();
    assert_eq!(acquisition.diagnostic, Some(Diagnostic::CredentialMissing));

    let snapshot = pipeline.snapshot().await;
    assert_eq!(snapshot.trending.len(), crate::fallback::TRENDING_SAMPLE_LIMIT);
    assert_eq!(snapshot.trending.source, DataSource::Fallback);
    assert_eq!(snapshot.discover.len(), pipeline.policy.fallback().len());
    assert_eq!(snapshot.diagnostic, Some(Diagnostic::CredentialMissing));
    assert_eq!(snapshot.trending_state, StreamState::Degraded);
    assert!(!snapshot.trending_loading);
}

#[tokio::test]
async fn test_live_trending_seeds_discover() {
    let pipeline = pipeline(FakeSource::new().trending(Reply::Items(podcasts(&["a", "b"]), false)));

    pipeline.fetch_trending().await;

    let snapshot = pipeline.snapshot().await;
    assert_eq!(ids(&snapshot.trending.items), vec!["a", "b"]);
    assert_eq!(ids(&snapshot.discover.items), vec!["a", "b"]);
    assert_eq!(snapshot.diagnostic, None);
    assert_eq!(snapshot.trending_state, StreamState::Succeeded);
}

#[tokio::test]
async fn test_upstream_error_during_search_shows_samples() {
    let pipeline = pipeline(FakeSource::new().search("rust", 1, Reply::Upstream(500)));

    let outcome = pipeline.search("rust", 1).await;
    assert!(outcome.acquisition().unwrap().is_degraded());

    let snapshot = pipeline.snapshot().await;
    assert!(snapshot.discover.is_fallback());
    assert!(!snapshot.discover.has_more);
    assert_eq!(snapshot.diagnostic, Some(Diagnostic::UpstreamError));
    assert_eq!(snapshot.search_state, StreamState::Degraded);
    assert_eq!(snapshot.active_query.as_deref(), Some("rust"));
}

#[tokio::test]
async fn test_zero_matches_is_empty_not_degraded() {
    let pipeline = pipeline(FakeSource::new().search("zzzz", 1, Reply::Items(Vec::new(), false)));

    pipeline.search("zzzz", 1).await;

    let snapshot = pipeline.snapshot().await;
    assert!(snapshot.discover.is_empty());
    assert_eq!(snapshot.discover.source, DataSource::Live);
    assert_eq!(snapshot.diagnostic, Some(Diagnostic::NoResults));
    assert_eq!(snapshot.search_state, StreamState::Empty);
}

#[tokio::test]
async fn test_load_more_appends_in_order() {
    let pipeline = pipeline(
        FakeSource::new()
            .search("rust", 1, Reply::Items(podcasts(&["a", "b", "c"]), true))
            .search("rust", 2, Reply::Items(podcasts(&["d", "e"]), false)),
    );

    pipeline.search("rust", 1).await;
    let outcome = pipeline.load_more().await;
    assert!(outcome.acquisition().is_some());

    let snapshot = pipeline.snapshot().await;
    assert_eq!(ids(&snapshot.discover.items), vec!["a", "b", "c", "d", "e"]);
    assert_eq!(snapshot.discover.page, 2);
    assert!(!snapshot.discover.has_more);

    assert_eq!(pipeline.load_more().await, FetchOutcome::Skipped(SkipReason::NoMorePages));
    assert_eq!(
        pipeline.source().search_calls(),
        vec![("rust".to_string(), 1), ("rust".to_string(), 2)]
    );
}

#[tokio::test]
async fn test_load_more_failure_replaces_view_with_samples() {
    let pipeline = pipeline(
        FakeSource::new()
            .search("rust", 1, Reply::Items(podcasts(&["a"]), true))
            .search("rust", 2, Reply::Upstream(503)),
    );

    pipeline.search("rust", 1).await;
    pipeline.load_more().await;

    let snapshot = pipeline.snapshot().await;
    assert!(snapshot.discover.is_fallback());
    assert_eq!(snapshot.diagnostic, Some(Diagnostic::UpstreamError));
}

#[tokio::test]
async fn test_load_more_without_query_is_skipped() {
    let pipeline = pipeline(FakeSource::new());
    assert_eq!(pipeline.load_more().await, FetchOutcome::Skipped(SkipReason::QueryMismatch));
    assert_eq!(pipeline.search("other", 2).await, FetchOutcome::Skipped(SkipReason::QueryMismatch));
    assert!(pipeline.source().search_calls().is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_load_more_while_loading_is_skipped() {
    let pipeline = pipeline(FakeSource::new().search_after(
        "rust",
        1,
        Reply::Items(podcasts(&["a"]), true),
        Duration::from_secs(2),
    ));

    let background = pipeline.clone();
    let first = tokio::spawn(async move { background.search("rust", 1).await });
    tokio::time::sleep(Duration::from_millis(100)).await;

    assert!(pipeline.snapshot().await.search_loading);
    assert_eq!(pipeline.load_more().await, FetchOutcome::Skipped(SkipReason::AlreadyLoading));

    assert!(first.await.unwrap().acquisition().is_some());
    assert_eq!(pipeline.source().search_calls().len(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_debounce_issues_one_search_for_final_query() {
    let pipeline = pipeline(FakeSource::new().search("rogan", 1, Reply::Items(podcasts(&["r"]), false)));

    for query in ["r", "ro", "rog", "roga", "rogan"] {
        pipeline.on_query_change(query).await;
        tokio::time::sleep(Duration::from_millis(100)).await;
    }
    assert!(pipeline.source().search_calls().is_empty());

    tokio::time::sleep(Duration::from_secs(1)).await;

    assert_eq!(pipeline.source().search_calls(), vec![("rogan".to_string(), 1)]);
    let snapshot = pipeline.snapshot().await;
    assert_eq!(ids(&snapshot.discover.items), vec!["r"]);
}

#[tokio::test(start_paused = true)]
async fn test_stale_search_response_is_dropped() {
    let pipeline = pipeline(
        FakeSource::new()
            .search_after("slow", 1, Reply::Items(podcasts(&["old"]), false), Duration::from_secs(3))
            .search("fast", 1, Reply::Items(podcasts(&["new"]), false)),
    );

    let slow = pipeline.search("slow", 1);
    let fast = async {
        tokio::time::sleep(Duration::from_millis(100)).await;
        pipeline.search("fast", 1).await
    };
    let (slow_outcome, fast_outcome) = tokio::join!(slow, fast);

    assert_eq!(slow_outcome, FetchOutcome::Superseded);
    assert!(fast_outcome.acquisition().is_some());

    let snapshot = pipeline.snapshot().await;
    assert_eq!(ids(&snapshot.discover.items), vec!["new"]);
    assert_eq!(snapshot.active_query.as_deref(), Some("fast"));
    assert_eq!(snapshot.search_state, StreamState::Succeeded);
}

#[tokio::test(start_paused = true)]
async fn test_stale_load_more_is_dropped_after_new_query() {
    let pipeline = pipeline(
        FakeSource::new()
            .search("rust", 1, Reply::Items(podcasts(&["a"]), true))
            .search_after("rust", 2, Reply::Items(podcasts(&["b"]), false), Duration::from_secs(3))
            .search("go", 1, Reply::Items(podcasts(&["g"]), false)),
    );
    pipeline.search("rust", 1).await;

    let more = pipeline.load_more();
    let fresh = async {
        tokio::time::sleep(Duration::from_millis(100)).await;
        pipeline.search("go", 1).await
    };
    let (more_outcome, fresh_outcome) = tokio::join!(more, fresh);

    assert_eq!(more_outcome, FetchOutcome::Superseded);
    assert!(fresh_outcome.acquisition().is_some());

    let snapshot = pipeline.snapshot().await;
    assert_eq!(ids(&snapshot.discover.items), vec!["g"]);
    assert_eq!(snapshot.active_query.as_deref(), Some("go"));
    assert!(!snapshot.discover.has_more);
    assert_eq!(
        pipeline.source().search_calls(),
        vec![("rust".to_string(), 1), ("rust".to_string(), 2), ("go".to_string(), 1)]
    );
}

#[tokio::test(start_paused = true)]
async fn test_stale_trending_response_is_dropped() {
    let pipeline = pipeline(FakeSource::new().trending_after(
        Reply::Items(podcasts(&["a"]), false),
        Duration::from_secs(1),
    ));

    let (first, second) = tokio::join!(pipeline.fetch_trending(), async {
        tokio::time::sleep(Duration::from_millis(10)).await;
        pipeline.fetch_trending().await
    });

    assert_eq!(first, FetchOutcome::Superseded);
    assert!(second.acquisition().is_some());
    assert_eq!(pipeline.source().trending_calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_clearing_query_restores_trending() {
    let pipeline = pipeline(
        FakeSource::new()
            .trending(Reply::Items(podcasts(&["t1", "t2"]), false))
            .search("rust", 1, Reply::Items(podcasts(&["s1"]), true)),
    );

    pipeline.fetch_trending().await;
    pipeline.search("rust", 1).await;
    assert_eq!(ids(&pipeline.snapshot().await.discover.items), vec!["s1"]);

    assert_eq!(pipeline.search("   ", 1).await, FetchOutcome::Cleared);

    let snapshot = pipeline.snapshot().await;
    assert_eq!(ids(&snapshot.discover.items), vec!["t1", "t2"]);
    assert_eq!(snapshot.active_query, None);
    assert_eq!(snapshot.search_state, StreamState::Idle);
    assert_eq!(pipeline.source().search_calls().len(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_clearing_query_discards_in_flight_search() {
    let pipeline = pipeline(
        FakeSource::new()
            .trending(Reply::Items(podcasts(&["t1"]), false))
            .search_after("rust", 1, Reply::Items(podcasts(&["s1"]), false), Duration::from_secs(2)),
    );
    pipeline.fetch_trending().await;

    let (search, cleared) = tokio::join!(pipeline.search("rust", 1), async {
        tokio::time::sleep(Duration::from_millis(100)).await;
        pipeline.search("", 1).await
    });

    assert_eq!(search, FetchOutcome::Superseded);
    assert_eq!(cleared, FetchOutcome::Cleared);
    assert_eq!(ids(&pipeline.snapshot().await.discover.items), vec!["t1"]);
}

#[tokio::test]
async fn test_trending_does_not_replace_active_search() {
    let pipeline = pipeline(
        FakeSource::new()
            .trending(Reply::Items(podcasts(&["t1"]), false))
            .search("rust", 1, Reply::Items(podcasts(&["s1"]), false)),
    );

    pipeline.search("rust", 1).await;
    pipeline.fetch_trending().await;

    let snapshot = pipeline.snapshot().await;
    assert_eq!(ids(&snapshot.discover.items), vec!["s1"]);
    assert_eq!(ids(&snapshot.trending.items), vec!["t1"]);
}

#[tokio::test(start_paused = true)]
async fn test_timeout_degrades_to_request_failed() {
    let pipeline = pipeline(FakeSource::new().search("rust", 1, Reply::Hang));

    let outcome = pipeline.search("rust", 1).await;
    assert_eq!(outcome.acquisition().unwrap().diagnostic, Some(Diagnostic::RequestFailed));

    let snapshot = pipeline.snapshot().await;
    assert!(snapshot.discover.is_fallback());
    assert!(!snapshot.search_loading);
}

#[tokio::test(start_paused = true)]
async fn test_trending_timeout_degrades_to_samples() {
    let pipeline = pipeline(FakeSource::new().trending(Reply::Hang));

    let outcome = pipeline.fetch_trending().await;
    let acquisition = outcome.acquisition().unwrap();
    assert_eq!(acquisition.diagnostic, Some(Diagnostic::RequestFailed));
    assert!(acquisition.is_degraded());

    let snapshot = pipeline.snapshot().await;
    assert!(snapshot.trending.is_fallback());
    assert_eq!(snapshot.trending_state, StreamState::Degraded);
    assert!(!snapshot.trending_loading);
}

#[tokio::test]
async fn test_dismiss_diagnostic() {
    let pipeline = pipeline(FakeSource::new().trending(Reply::Missing));
    pipeline.fetch_trending().await;
    assert!(pipeline.snapshot().await.diagnostic.is_some());

    pipeline.dismiss_diagnostic().await;
    assert_eq!(pipeline.snapshot().await.diagnostic, None);
}

#[tokio::test]
async fn test_subscribers_see_revisions() {
    let pipeline = pipeline(FakeSource::new().trending(Reply::Items(podcasts(&["a"]), false)));
    let mut revisions = pipeline.subscribe();
    let before = *revisions.borrow_and_update();

    pipeline.fetch_trending().await;

    assert!(revisions.has_changed().unwrap());
    assert!(*revisions.borrow() > before);
}

#[tokio::test]
async fn test_find_podcast_checks_views_then_samples() {
    let pipeline = pipeline(FakeSource::new().search("rust", 1, Reply::Items(podcasts(&["live-1"]), false)));
    pipeline.search("rust", 1).await;

    assert!(pipeline.find_podcast("live-1").await.is_some());
    assert!(pipeline.find_podcast("sample-1").await.is_some());
    assert!(pipeline.find_podcast("nope").await.is_none());
}
