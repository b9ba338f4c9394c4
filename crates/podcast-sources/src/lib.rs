pub mod traits;
pub mod error;
pub mod listennotes;

pub use traits::{CatalogSource, SearchPage};
pub use error::{CatalogError, FailureKind};
pub use listennotes::{ListenNotesClient, NormalizeError, normalize_trending, normalize_search_page, genre_name, resolve_category};
