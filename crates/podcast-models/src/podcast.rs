use serde::{Deserialize, Serialize};

/// Canonical catalog entry, built fresh from every fetch.
///
/// Both the trending and the search endpoints are normalized into this one
/// shape. Ids are unique within a single result set but the catalog does not
/// guarantee uniqueness across trending and search sets.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Podcast {
    pub id: String,
    pub title: String,
    pub description: String,
    pub image_url: String,
    pub category: String, // Resolved genre label, "General" when unknown
    /// Heuristic score synthesized during normalization.
    ///
    /// The catalog does not expose user ratings, so this is an approximation
    /// derived from which endpoint produced the item, not a real score.
    pub rating: f32,
    pub episode_count: u32,
    pub links: PlatformLinks,
}

/// Per-platform listen links; any of them may be absent
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct PlatformLinks {
    pub spotify: Option<String>,
    pub apple: Option<String>,
    pub google: Option<String>,
    pub website: Option<String>,
    pub listennotes: Option<String>,
}

impl PlatformLinks {
    /// Platform name and URL pairs for the links that are present, in display order
    pub fn available(&self) -> Vec<(&'static str, &str)> {
        [
            ("spotify", self.spotify.as_deref()),
            ("apple", self.apple.as_deref()),
            ("google", self.google.as_deref()),
            ("website", self.website.as_deref()),
            ("listennotes", self.listennotes.as_deref()),
        ]
        .into_iter()
        .filter_map(|(platform, url)| url.map(|u| (platform, u)))
        .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.available().is_empty()
    }
}

impl Podcast {
    /// Case-insensitive match against title, description and category
    pub fn matches(&self, needle: &str) -> bool {
        let needle = needle.to_lowercase();
        self.title.to_lowercase().contains(&needle)
            || self.description.to_lowercase().contains(&needle)
            || self.category.to_lowercase().contains(&needle)
    }
}
