pub mod api;
pub mod client;
pub mod genres;
pub mod normalize;

pub use client::ListenNotesClient;
pub use genres::{genre_name, resolve_category, DEFAULT_CATEGORY};
pub use normalize::{normalize_search_page, normalize_trending, NormalizeError};
