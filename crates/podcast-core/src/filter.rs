use podcast_models::Podcast;

/// Case-insensitive match over title, description and category.
/// A blank needle keeps everything.
pub fn filter_podcasts<'a>(items: &'a [Podcast], needle: &str) -> Vec<&'a Podcast> {
    let needle = needle.trim();
    if needle.is_empty() {
        return items.iter().collect();
    }
    items.iter().filter(|p| p.matches(needle)).collect()
}
