/// Label used when a podcast has no genre or an unknown one
pub const DEFAULT_CATEGORY: &str = "General";

/// Listen Notes genre id → display label
pub fn genre_name(genre_id: u64) -> &'static str {
    match genre_id {
        68 => "TV & Film",
        77 => "Health & Fitness",
        82 => "Leisure",
        88 => "Technology",
        93 => "Business",
        99 => "News",
        111 => "Education",
        117 => "Government",
        122 => "Society & Culture",
        125 => "History",
        127 => "Religion & Spirituality",
        133 => "Comedy",
        135 => "Kids & Family",
        144 => "Personal Journals",
        151 => "Locally Focused",
        157 => "Philosophy",
        160 => "Science",
        168 => "Fiction",
        _ => DEFAULT_CATEGORY,
    }
}

/// Category of a podcast: only the first genre id counts
pub fn resolve_category(genre_ids: &[u64]) -> &'static str {
    genre_ids.first().map(|id| genre_name(*id)).unwrap_or(DEFAULT_CATEGORY)
}
