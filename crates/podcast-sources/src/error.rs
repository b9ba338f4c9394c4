use std::time::Duration;
use thiserror::Error;
use crate::listennotes::NormalizeError;

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("catalog API key is not configured")]
    CredentialMissing,

    #[error("catalog returned {status}: {body}")]
    Upstream { status: u16, body: String },

    #[error("catalog request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("malformed catalog response: {0}")]
    Malformed(#[from] NormalizeError),

    #[error("catalog request timed out after {0:?}")]
    Timeout(Duration),
}

/// The three ways an acquisition can fail, as far as callers are concerned
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// No usable credential; the request was never sent
    CredentialMissing,
    /// The catalog answered with a non-success status
    Upstream,
    /// Network, decode, shape or timeout failure
    RequestFailed,
}

impl CatalogError {
    pub fn failure_kind(&self) -> FailureKind {
        match self {
            CatalogError::CredentialMissing => FailureKind::CredentialMissing,
            CatalogError::Upstream { .. } => FailureKind::Upstream,
            CatalogError::Transport(_) | CatalogError::Malformed(_) | CatalogError::Timeout(_) => {
                FailureKind::RequestFailed
            }
        }
    }
}
