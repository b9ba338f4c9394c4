use async_trait::async_trait;
use podcast_models::Podcast;
use crate::error::CatalogError;

/// One normalized page of search results
#[derive(Debug, Clone, PartialEq)]
pub struct SearchPage {
    pub items: Vec<Podcast>,
    pub has_more: bool,
}

#[async_trait]
pub trait CatalogSource: Send + Sync {
    // Source metadata
    fn source_name(&self) -> &str;

    /// Whether a usable credential is configured. Sources without one must
    /// fail every fetch with `CatalogError::CredentialMissing` instead of
    /// touching the network.
    fn has_credential(&self) -> bool;

    // Data retrieval, already normalized into canonical podcasts
    async fn fetch_trending(&self) -> Result<Vec<Podcast>, CatalogError>;
    async fn search(&self, query: &str, page: u32) -> Result<SearchPage, CatalogError>;
}
