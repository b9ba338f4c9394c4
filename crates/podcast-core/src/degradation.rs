use podcast_models::ResultSet;
use podcast_sources::{CatalogError, FailureKind, SearchPage};
use serde::Serialize;
use std::fmt;
use std::future::Future;
use tracing::{info, warn};
use crate::fallback::FallbackDataset;

/// Which acquisition operation produced an outcome
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AcquisitionKind {
    Trending,
    Search,
}

/// Short, dismissible status explaining why the shown data may not be live
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Diagnostic {
    CredentialMissing,
    UpstreamError,
    RequestFailed,
    /// A well-formed live search matched nothing; informational, not a failure
    NoResults,
}

impl Diagnostic {
    pub fn message(&self) -> &'static str {
        match self {
            Diagnostic::CredentialMissing => "API key not configured. Showing sample data.",
            Diagnostic::UpstreamError => "Catalog API returned an error. Showing sample data.",
            Diagnostic::RequestFailed => "Request failed. Showing sample data.",
            Diagnostic::NoResults => "No podcasts found.",
        }
    }

    /// Whether this diagnostic accompanies substituted sample data
    pub fn is_fallback(&self) -> bool {
        !matches!(self, Diagnostic::NoResults)
    }

    fn from_failure(kind: FailureKind) -> Self {
        match kind {
            FailureKind::CredentialMissing => Diagnostic::CredentialMissing,
            FailureKind::Upstream => Diagnostic::UpstreamError,
            FailureKind::RequestFailed => Diagnostic::RequestFailed,
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message())
    }
}

/// A renderable result plus the diagnostic to show next to it
#[derive(Debug, Clone, PartialEq)]
pub struct Acquisition {
    pub result_set: ResultSet,
    pub diagnostic: Option<Diagnostic>,
}

impl Acquisition {
    pub fn is_degraded(&self) -> bool {
        self.diagnostic.map(|d| d.is_fallback()).unwrap_or(false)
    }
}

/// Turns acquisition outcomes into something the UI can always render.
///
/// Every failure becomes the bundled sample set with a diagnostic; nothing is
/// propagated as an error.
#[derive(Debug, Clone)]
pub struct DegradationPolicy {
    fallback: FallbackDataset,
}

impl DegradationPolicy {
    pub fn new(fallback: FallbackDataset) -> Self {
        Self { fallback }
    }

    pub fn fallback(&self) -> &FallbackDataset {
        &self.fallback
    }

    /// Await an acquisition attempt and resolve its outcome
    pub async fn attempt<Fut>(&self, kind: AcquisitionKind, page: u32, attempt: Fut) -> Acquisition
    where
        Fut: Future<Output = Result<SearchPage, CatalogError>>,
    {
        self.resolve(kind, page, attempt.await)
    }

    pub fn resolve(&self, kind: AcquisitionKind, page: u32, outcome: Result<SearchPage, CatalogError>) -> Acquisition {
        match outcome {
            Ok(live) => {
                if kind == AcquisitionKind::Search && page <= 1 && live.items.is_empty() {
                    info!(operation = "search", "Live search matched no podcasts");
                    return Acquisition {
                        result_set: ResultSet::empty(),
                        diagnostic: Some(Diagnostic::NoResults),
                    };
                }
                Acquisition {
                    result_set: ResultSet::live(live.items, page, live.has_more),
                    diagnostic: None,
                }
            }
            Err(e) => {
                let diagnostic = Diagnostic::from_failure(e.failure_kind());
                warn!(
                    operation = ?kind,
                    page = page,
                    error = %e,
                    "Catalog acquisition failed, showing sample data"
                );
                Acquisition {
                    result_set: self.fallback.all(),
                    diagnostic: Some(diagnostic),
                }
            }
        }
    }
}
