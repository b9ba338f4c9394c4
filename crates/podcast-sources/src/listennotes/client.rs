use crate::error::CatalogError;
use crate::listennotes::{api, normalize};
use crate::traits::{CatalogSource, SearchPage};
use async_trait::async_trait;
use podcast_config::{is_usable_api_key, CatalogConfig};
use podcast_models::Podcast;
use reqwest::Client;
use std::sync::Arc;
use tracing::info;

#[derive(Clone)]
pub struct ListenNotesClient {
    client: Arc<Client>,
    base_url: String,
    api_key: Option<String>,
    search_type: String,
}

impl ListenNotesClient {
    pub fn new(base_url: String, api_key: Option<String>) -> Self {
        Self {
            client: Arc::new(api::create_listennotes_client()),
            base_url,
            api_key: api_key.filter(|k| is_usable_api_key(k)),
            search_type: "podcast".to_string(),
        }
    }

    /// Build from the `[catalog]` config section and an already-resolved key
    pub fn from_config(config: &CatalogConfig, api_key: Option<String>) -> Self {
        Self::new(config.base_url.clone(), api_key).with_search_type(config.search_type.clone())
    }

    pub fn with_search_type(mut self, search_type: String) -> Self {
        self.search_type = search_type;
        self
    }

    fn api_key(&self) -> Result<&str, CatalogError> {
        self.api_key.as_deref().ok_or(CatalogError::CredentialMissing)
    }
}

#[async_trait]
impl CatalogSource for ListenNotesClient {
    fn source_name(&self) -> &str {
        "listennotes"
    }

    fn has_credential(&self) -> bool {
        self.api_key.is_some()
    }

    async fn fetch_trending(&self) -> Result<Vec<Podcast>, CatalogError> {
        let api_key = self.api_key()?;
        let raw = api::get_best_podcasts(&self.client, &self.base_url, api_key).await?;
        let podcasts = normalize::normalize_trending(&raw)?;
        info!("Fetched {} trending podcasts from Listen Notes", podcasts.len());
        Ok(podcasts)
    }

    async fn search(&self, query: &str, page: u32) -> Result<SearchPage, CatalogError> {
        let api_key = self.api_key()?;
        let raw = api::search_podcasts(&self.client, &self.base_url, api_key, query, &self.search_type, page).await?;
        let search_page = normalize::normalize_search_page(&raw)?;
        info!(
            "Search '{}' page {} returned {} podcasts (has_more: {})",
            query,
            page,
            search_page.items.len(),
            search_page.has_more
        );
        Ok(search_page)
    }
}
