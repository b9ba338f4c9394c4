use anyhow::{anyhow, Result};
use podcast_models::{Podcast, ResultSet};
use std::sync::Arc;

const SAMPLE_PODCASTS_JSON: &str = include_str!("../data/sample_podcasts.json");

/// Number of sample podcasts shown in the trending view when degraded
pub const TRENDING_SAMPLE_LIMIT: usize = 6;

/// Bundled podcasts shown whenever live acquisition cannot proceed
#[derive(Debug, Clone)]
pub struct FallbackDataset {
    podcasts: Arc<Vec<Podcast>>,
}

impl FallbackDataset {
    /// The dataset compiled into the binary
    pub fn bundled() -> Result<Self> {
        let podcasts: Vec<Podcast> = serde_json::from_str(SAMPLE_PODCASTS_JSON)
            .map_err(|e| anyhow!("Bundled sample podcasts are invalid: {}", e))?;
        Self::from_podcasts(podcasts)
    }

    pub fn from_podcasts(podcasts: Vec<Podcast>) -> Result<Self> {
        if podcasts.is_empty() {
            return Err(anyhow!("Fallback dataset must contain at least one podcast"));
        }
        Ok(Self {
            podcasts: Arc::new(podcasts),
        })
    }

    /// Every sample podcast; seeds the discover view
    pub fn all(&self) -> ResultSet {
        ResultSet::fallback(self.podcasts.as_ref().clone())
    }

    /// The leading slice used as the trending view
    pub fn trending(&self) -> ResultSet {
        ResultSet::fallback(
            self.podcasts
                .iter()
                .take(TRENDING_SAMPLE_LIMIT)
                .cloned()
                .collect(),
        )
    }

    pub fn find(&self, podcast_id: &str) -> Option<&Podcast> {
        self.podcasts.iter().find(|p| p.id == podcast_id)
    }

    pub fn len(&self) -> usize {
        self.podcasts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.podcasts.is_empty()
    }
}
