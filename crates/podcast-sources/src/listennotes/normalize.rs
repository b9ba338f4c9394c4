//! Pure mapping from Listen Notes payloads to canonical `Podcast` records.
//!
//! The trending and search endpoints describe the same podcast with different
//! field names, so each has its own entry point. Callers pick the variant by
//! the operation they performed, never by inspecting the payload.

use podcast_models::{PlatformLinks, Podcast};
use serde::{Deserialize, Deserializer};
use serde_json::Value;
use thiserror::Error;
use crate::listennotes::genres::{resolve_category, DEFAULT_CATEGORY};
use crate::traits::SearchPage;

// Synthesized ratings; the catalog has no user scores
const TRENDING_RATING_WITH_CATALOG_URL: f32 = 4.5;
const TRENDING_RATING_DEFAULT: f32 = 4.0;
const SEARCH_RATING: f32 = 4.2;

#[derive(Debug, Error, PartialEq)]
pub enum NormalizeError {
    #[error("response is not a JSON object")]
    NotAnObject,

    #[error("response has no `{0}` list")]
    MissingList(&'static str),

    #[error("item {index} is invalid: {reason}")]
    InvalidItem { index: usize, reason: String },
}

#[derive(Debug, Deserialize)]
struct RawExtra {
    spotify_url: Option<String>,
    apple_podcasts_url: Option<String>,
    google_podcasts_url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawTrendingPodcast {
    #[serde(deserialize_with = "deserialize_id")]
    id: String,
    title: Option<String>,
    description: Option<String>,
    image: Option<String>,
    genre_ids: Option<Vec<Value>>,
    total_episodes: Option<Value>,
    extra: Option<RawExtra>,
    website: Option<String>,
    listennotes_url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawSearchResult {
    #[serde(deserialize_with = "deserialize_id")]
    id: String,
    title_original: Option<String>,
    description_original: Option<String>,
    image: Option<String>,
    genre_ids: Option<Vec<Value>>,
    total_episodes: Option<Value>,
    extra: Option<RawExtra>,
    website: Option<String>,
    listennotes_url: Option<String>,
}

/// Ids are strings upstream, but numeric ids are accepted as well
fn deserialize_id<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::String(s) if !s.trim().is_empty() => Ok(s),
        Value::Number(n) => Ok(n.to_string()),
        other => Err(serde::de::Error::custom(format!("invalid id: {}", other))),
    }
}

/// Normalize a `best_podcasts` response.
pub fn normalize_trending(raw: &Value) -> Result<Vec<Podcast>, NormalizeError> {
    let list = top_level_list(raw, "podcasts")?.ok_or(NormalizeError::MissingList("podcasts"))?;

    list.iter()
        .enumerate()
        .map(|(index, item)| {
            let raw_item: RawTrendingPodcast = parse_item(index, item)?;
            let rating = if non_empty(raw_item.listennotes_url.clone()).is_some() {
                TRENDING_RATING_WITH_CATALOG_URL
            } else {
                TRENDING_RATING_DEFAULT
            };

            Ok(Podcast {
                id: raw_item.id,
                title: raw_item.title.unwrap_or_default(),
                description: raw_item.description.unwrap_or_default(),
                image_url: raw_item.image.unwrap_or_default(),
                category: category_of(raw_item.genre_ids.as_deref()),
                rating,
                episode_count: episode_count(raw_item.total_episodes.as_ref()),
                links: links_of(raw_item.extra, raw_item.website, raw_item.listennotes_url),
            })
        })
        .collect()
}

/// Normalize one page of a `search` response.
///
/// A missing or null `results` list means zero matches. `has_more` follows
/// `next_page_number` and is always false for an empty page.
pub fn normalize_search_page(raw: &Value) -> Result<SearchPage, NormalizeError> {
    let list = top_level_list(raw, "results")?;
    let Some(list) = list else {
        return Ok(SearchPage { items: Vec::new(), has_more: false });
    };

    let items = list
        .iter()
        .enumerate()
        .map(|(index, item)| {
            let raw_item: RawSearchResult = parse_item(index, item)?;
            Ok(Podcast {
                id: raw_item.id,
                title: raw_item.title_original.unwrap_or_default(),
                description: raw_item.description_original.unwrap_or_default(),
                image_url: raw_item.image.unwrap_or_default(),
                category: category_of(raw_item.genre_ids.as_deref()),
                rating: SEARCH_RATING,
                episode_count: episode_count(raw_item.total_episodes.as_ref()),
                links: links_of(raw_item.extra, raw_item.website, raw_item.listennotes_url),
            })
        })
        .collect::<Result<Vec<_>, NormalizeError>>()?;

    let has_more = !items.is_empty()
        && raw.get("next_page_number").map(|v| !v.is_null()).unwrap_or(false);

    Ok(SearchPage { items, has_more })
}

/// `Ok(None)` when the field is absent or null, error when it is not a list
fn top_level_list<'a>(raw: &'a Value, field: &'static str) -> Result<Option<&'a Vec<Value>>, NormalizeError> {
    let object = raw.as_object().ok_or(NormalizeError::NotAnObject)?;
    match object.get(field) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Array(items)) => Ok(Some(items)),
        Some(_) => Err(NormalizeError::MissingList(field)),
    }
}

fn parse_item<T>(index: usize, item: &Value) -> Result<T, NormalizeError>
where
    T: for<'de> Deserialize<'de>,
{
    if !item.is_object() {
        return Err(NormalizeError::InvalidItem {
            index,
            reason: "not an object".to_string(),
        });
    }
    T::deserialize(item).map_err(|e| NormalizeError::InvalidItem {
        index,
        reason: e.to_string(),
    })
}

fn category_of(genre_ids: Option<&[Value]>) -> String {
    let first = genre_ids
        .and_then(|ids| ids.first())
        .and_then(|id| id.as_u64().or_else(|| id.as_str().and_then(|s| s.parse().ok())));

    match first {
        Some(id) => resolve_category(&[id]).to_string(),
        None => DEFAULT_CATEGORY.to_string(),
    }
}

fn episode_count(total_episodes: Option<&Value>) -> u32 {
    total_episodes
        .and_then(Value::as_u64)
        .map(|n| u32::try_from(n).unwrap_or(u32::MAX))
        .unwrap_or(0)
}

fn links_of(extra: Option<RawExtra>, website: Option<String>, listennotes_url: Option<String>) -> PlatformLinks {
    let (spotify, apple, google) = match extra {
        Some(extra) => (extra.spotify_url, extra.apple_podcasts_url, extra.google_podcasts_url),
        None => (None, None, None),
    };

    PlatformLinks {
        spotify: non_empty(spotify),
        apple: non_empty(apple),
        google: non_empty(google),
        website: non_empty(website),
        listennotes: non_empty(listennotes_url),
    }
}

fn non_empty(s: Option<String>) -> Option<String> {
    s.filter(|v| !v.trim().is_empty())
}
