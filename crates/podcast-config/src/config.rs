use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "https://listen-api.listennotes.com/api/v2";

/// Value written into generated config files; treated the same as no key
pub const PLACEHOLDER_API_KEY: &str = "YOUR_API_KEY";

#[derive(Debug, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub catalog: CatalogConfig,
    #[serde(default)]
    pub search: SearchOptions,
    #[serde(default)]
    pub history: HistoryOptions,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct CatalogConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Lowest-precedence key source; the credential store and `LISTEN_API_KEY` win over it
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
    #[serde(default = "default_search_type")]
    pub search_type: String,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct SearchOptions {
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct HistoryOptions {
    #[serde(default = "default_recent_limit")]
    pub recent_limit: usize,
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_request_timeout_secs() -> u64 {
    10
}

fn default_search_type() -> String {
    "podcast".to_string()
}

fn default_debounce_ms() -> u64 {
    500
}

fn default_recent_limit() -> usize {
    5
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            api_key: None,
            request_timeout_secs: default_request_timeout_secs(),
            search_type: default_search_type(),
        }
    }
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self {
            debounce_ms: default_debounce_ms(),
        }
    }
}

impl Default for HistoryOptions {
    fn default() -> Self {
        Self {
            recent_limit: default_recent_limit(),
        }
    }
}

impl CatalogConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

impl SearchOptions {
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }
}

impl Config {
    pub fn load_from_file(path: &PathBuf) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    /// Load the config file if it exists, otherwise fall back to defaults
    pub fn load_or_default(path: &PathBuf) -> anyhow::Result<Self> {
        if path.exists() {
            Self::load_from_file(path)
        } else {
            tracing::debug!("No config file at {:?}, using defaults", path);
            Ok(Self::default())
        }
    }

    pub fn save_to_file(&self, path: &PathBuf) -> anyhow::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        if self.catalog.base_url.trim().is_empty() {
            return Err(anyhow::anyhow!("catalog.base_url cannot be empty"));
        }
        if !self.catalog.base_url.starts_with("http://") && !self.catalog.base_url.starts_with("https://") {
            return Err(anyhow::anyhow!("catalog.base_url must be an http(s) URL: {}", self.catalog.base_url));
        }
        if self.catalog.request_timeout_secs == 0 {
            return Err(anyhow::anyhow!("catalog.request_timeout_secs must be greater than zero"));
        }
        if self.catalog.search_type.trim().is_empty() {
            return Err(anyhow::anyhow!("catalog.search_type cannot be empty"));
        }
        if self.history.recent_limit == 0 {
            return Err(anyhow::anyhow!("history.recent_limit must be greater than zero"));
        }
        Ok(())
    }

    /// Whether the config file itself carries a usable API key
    pub fn has_configured_api_key(&self) -> bool {
        self.catalog
            .api_key
            .as_deref()
            .map(is_usable_api_key)
            .unwrap_or(false)
    }
}

/// Blank keys and the generated placeholder count as "not configured"
pub fn is_usable_api_key(key: &str) -> bool {
    let key = key.trim();
    !key.is_empty() && key != PLACEHOLDER_API_KEY
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::NamedTempFile;

    #[test]
    fn test_config_load_and_save() {
        let file = NamedTempFile::new().unwrap();
        let config = Config {
            catalog: CatalogConfig {
                api_key: Some("abc123".to_string()),
                request_timeout_secs: 3,
                ..CatalogConfig::default()
            },
            search: SearchOptions { debounce_ms: 250 },
            history: HistoryOptions::default(),
        };

        let path = file.path().to_path_buf();
        config.save_to_file(&path).unwrap();

        let loaded = Config::load_from_file(&path).unwrap();
        assert_eq!(loaded.catalog.api_key.as_deref(), Some("abc123"));
        assert_eq!(loaded.catalog.request_timeout_secs, 3);
        assert_eq!(loaded.catalog.base_url, DEFAULT_BASE_URL);
        assert_eq!(loaded.search.debounce_ms, 250);
        assert_eq!(loaded.history.recent_limit, 5);
    }

    #[test]
    fn test_empty_file_uses_defaults() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.search.debounce(), Duration::from_millis(500));
        assert_eq!(config.catalog.request_timeout(), Duration::from_secs(10));
        assert_eq!(config.catalog.search_type, "podcast");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_validate() {
        let mut config = Config::default();
        config.catalog.base_url = "ftp://example.com".to_string();
        assert!(config.validate().is_err());

        config.catalog.base_url = DEFAULT_BASE_URL.to_string();
        config.catalog.request_timeout_secs = 0;
        assert!(config.validate().is_err());

        config.catalog.request_timeout_secs = 5;
        config.history.recent_limit = 0;
        assert!(config.validate().is_err());

        config.history.recent_limit = 5;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_placeholder_key_is_not_configured() {
        let mut config = Config::default();
        assert!(!config.has_configured_api_key());

        config.catalog.api_key = Some(PLACEHOLDER_API_KEY.to_string());
        assert!(!config.has_configured_api_key());

        config.catalog.api_key = Some("   ".to_string());
        assert!(!config.has_configured_api_key());

        config.catalog.api_key = Some("real-key".to_string());
        assert!(config.has_configured_api_key());
    }
}
