pub mod config;
pub mod credentials;
pub mod paths;

pub use config::{is_usable_api_key, CatalogConfig, Config, HistoryOptions, SearchOptions, DEFAULT_BASE_URL, PLACEHOLDER_API_KEY};
pub use credentials::{resolve_api_key, CredentialStore, API_KEY_ENV};
pub use paths::{base_path_override, PathManager};
