use podcast_models::ResultSet;
use serde::Serialize;
use crate::degradation::{Acquisition, Diagnostic};

/// Lifecycle of one query stream (trending or search)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum StreamState {
    Idle,
    Loading,
    Succeeded,
    Degraded,
    Empty,
}

impl StreamState {
    pub fn from_acquisition(acquisition: &Acquisition) -> Self {
        match acquisition.diagnostic {
            None => StreamState::Succeeded,
            Some(Diagnostic::NoResults) => StreamState::Empty,
            Some(_) => StreamState::Degraded,
        }
    }
}

/// Monotonic request counter plus state for a single stream.
///
/// Every issued request gets the next sequence number; only a response
/// carrying the latest number may be applied.
#[derive(Debug)]
pub(crate) struct StreamTracker {
    pub(crate) state: StreamState,
    latest_seq: u64,
}

impl StreamTracker {
    pub(crate) fn new() -> Self {
        Self {
            state: StreamState::Idle,
            latest_seq: 0,
        }
    }

    pub(crate) fn issue(&mut self) -> u64 {
        self.latest_seq += 1;
        self.state = StreamState::Loading;
        self.latest_seq
    }

    /// Invalidate anything in flight and go back to idle
    pub(crate) fn reset(&mut self) {
        self.latest_seq += 1;
        self.state = StreamState::Idle;
    }

    pub(crate) fn is_current(&self, seq: u64) -> bool {
        seq == self.latest_seq
    }

    pub(crate) fn is_loading(&self) -> bool {
        self.state == StreamState::Loading
    }
}

/// Everything the presentation layer needs to render the catalog
#[derive(Debug, Clone, Serialize)]
pub struct PipelineSnapshot {
    /// Search results, or the trending seed while no query is active
    pub discover: ResultSet,
    pub trending: ResultSet,
    pub active_query: Option<String>,
    pub diagnostic: Option<Diagnostic>,
    pub trending_state: StreamState,
    pub search_state: StreamState,
    pub trending_loading: bool,
    pub search_loading: bool,
}

/// Why a request was not issued
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    AlreadyLoading,
    NoMorePages,
    QueryMismatch,
}

/// What happened to one fetch
#[derive(Debug, Clone, PartialEq)]
pub enum FetchOutcome {
    /// The response was applied to the view
    Applied(Acquisition),
    /// A newer request on the same stream was issued first; the response was dropped
    Superseded,
    /// Blank query: the view went back to trending without calling upstream
    Cleared,
    Skipped(SkipReason),
}

impl FetchOutcome {
    pub fn acquisition(&self) -> Option<&Acquisition> {
        match self {
            FetchOutcome::Applied(acquisition) => Some(acquisition),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tracker_only_latest_is_current() {
        let mut tracker = StreamTracker::new();
        let first = tracker.issue();
        let second = tracker.issue();
        assert!(!tracker.is_current(first));
        assert!(tracker.is_current(second));
        assert!(tracker.is_loading());

        tracker.reset();
        assert!(!tracker.is_current(second));
        assert_eq!(tracker.state, StreamState::Idle);
    }

    #[test]
    fn test_state_from_acquisition() {
        let ok = Acquisition { result_set: ResultSet::empty(), diagnostic: None };
        let empty = Acquisition { result_set: ResultSet::empty(), diagnostic: Some(Diagnostic::NoResults) };
        let degraded = Acquisition { result_set: ResultSet::empty(), diagnostic: Some(Diagnostic::RequestFailed) };

        assert_eq!(StreamState::from_acquisition(&ok), StreamState::Succeeded);
        assert_eq!(StreamState::from_acquisition(&empty), StreamState::Empty);
        assert_eq!(StreamState::from_acquisition(&degraded), StreamState::Degraded);
    }
}
