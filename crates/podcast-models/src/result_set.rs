use serde::{Deserialize, Serialize};
use crate::podcast::Podcast;

/// Where the items of a result set came from
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum DataSource {
    Live,
    Fallback,
}

/// Ordered podcasts plus the pagination cursor that produced them.
///
/// A fallback set is never paginated: constructing one always yields
/// `has_more == false`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ResultSet {
    pub items: Vec<Podcast>,
    pub page: u32,
    pub has_more: bool,
    pub source: DataSource,
}

impl ResultSet {
    pub fn live(items: Vec<Podcast>, page: u32, has_more: bool) -> Self {
        Self {
            items,
            page: page.max(1),
            has_more,
            source: DataSource::Live,
        }
    }

    pub fn fallback(items: Vec<Podcast>) -> Self {
        Self {
            items,
            page: 1,
            has_more: false,
            source: DataSource::Fallback,
        }
    }

    pub fn empty() -> Self {
        Self::live(Vec::new(), 1, false)
    }

    pub fn is_fallback(&self) -> bool {
        self.source == DataSource::Fallback
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Build the set that follows `self` once `next` has been loaded.
    ///
    /// Items keep their order with `self` as prefix; ids are not deduplicated.
    /// Cursor and source come from `next`.
    pub fn appended(&self, next: ResultSet) -> ResultSet {
        let mut items = Vec::with_capacity(self.items.len() + next.items.len());
        items.extend(self.items.iter().cloned());
        items.extend(next.items);
        match next.source {
            DataSource::Live => ResultSet::live(items, next.page, next.has_more),
            DataSource::Fallback => ResultSet::fallback(items),
        }
    }
}

impl Default for ResultSet {
    fn default() -> Self {
        Self::empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::podcast::PlatformLinks;

    fn podcast(id: &str) -> Podcast {
        Podcast {
            id: id.to_string(),
            title: format!("Podcast {}", id),
            description: String::new(),
            image_url: String::new(),
            category: "General".to_string(),
            rating: 4.2,
            episode_count: 1,
            links: PlatformLinks::default(),
        }
    }

    #[test]
    fn test_fallback_never_has_more() {
        let set = ResultSet::fallback(vec![podcast("a")]);
        assert!(!set.has_more);
        assert_eq!(set.page, 1);
        assert!(set.is_fallback());
    }

    #[test]
    fn test_appended_keeps_prefix_and_duplicates() {
        let first = ResultSet::live(vec![podcast("a"), podcast("b")], 1, true);
        let second = ResultSet::live(vec![podcast("b"), podcast("c")], 2, false);

        let merged = first.appended(second);
        let ids: Vec<&str> = merged.items.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b", "b", "c"]);
        assert_eq!(merged.page, 2);
        assert!(!merged.has_more);
        assert_eq!(merged.source, DataSource::Live);
    }

    #[test]
    fn test_live_page_is_at_least_one() {
        assert_eq!(ResultSet::live(Vec::new(), 0, false).page, 1);
    }
}
