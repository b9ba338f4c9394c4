use reqwest::Client;
use serde_json::Value;
use tracing::{debug, warn};
use crate::error::CatalogError;

const API_KEY_HEADER: &str = "X-ListenAPI-Key";

/// Create a reqwest Client for the catalog API
pub fn create_listennotes_client() -> Client {
    Client::builder()
        .user_agent(concat!("podtrack/", env!("CARGO_PKG_VERSION")))
        .build()
        .unwrap_or_else(|_| Client::new())
}

pub fn best_podcasts_url(base_url: &str) -> String {
    format!("{}/best_podcasts", base_url.trim_end_matches('/'))
}

pub fn search_url(base_url: &str, query: &str, search_type: &str, page: u32) -> String {
    format!(
        "{}/search?q={}&type={}&page={}",
        base_url.trim_end_matches('/'),
        urlencoding::encode(query),
        urlencoding::encode(search_type),
        page
    )
}

/// Fetch the raw best-podcasts listing
pub async fn get_best_podcasts(client: &Client, base_url: &str, api_key: &str) -> Result<Value, CatalogError> {
    let url = best_podcasts_url(base_url);
    get_json(client, &url, api_key).await
}

/// Fetch one raw page of search results
pub async fn search_podcasts(
    client: &Client,
    base_url: &str,
    api_key: &str,
    query: &str,
    search_type: &str,
    page: u32,
) -> Result<Value, CatalogError> {
    let url = search_url(base_url, query, search_type, page);
    get_json(client, &url, api_key).await
}

async fn get_json(client: &Client, url: &str, api_key: &str) -> Result<Value, CatalogError> {
    debug!("GET {}", url);

    let response = client
        .get(url)
        .header(API_KEY_HEADER, api_key)
        .header("Accept", "application/json")
        .send()
        .await?;

    if !response.status().is_success() {
        let status = response.status();
        let error_text = response.text().await.unwrap_or_default();
        warn!("Catalog API returned non-OK status: {} - {}", status, error_text);
        return Err(CatalogError::Upstream {
            status: status.as_u16(),
            body: error_text,
        });
    }

    let body: Value = response.json().await?;
    Ok(body)
}
