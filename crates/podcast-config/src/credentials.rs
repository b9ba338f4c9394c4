use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;
use toml;
use crate::config::{is_usable_api_key, Config};

/// Environment variable that overrides any stored API key
pub const API_KEY_ENV: &str = "LISTEN_API_KEY";

const LISTEN_API_KEY: &str = "listen_api_key";

#[derive(Debug, Serialize, Deserialize, Default)]
struct CredentialsData {
    #[serde(flatten)]
    data: HashMap<String, String>,
}

pub struct CredentialStore {
    path: PathBuf,
    credentials: HashMap<String, String>,
}

impl CredentialStore {
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            credentials: HashMap::new(),
        }
    }

    pub fn load(&mut self) -> Result<()> {
        if self.path.exists() {
            let content = std::fs::read_to_string(&self.path)?;
            let creds_data: CredentialsData = toml::from_str(&content)?;
            self.credentials = creds_data.data;
        }
        Ok(())
    }

    pub fn save(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let creds_data = CredentialsData {
            data: self.credentials.clone(),
        };
        let content = toml::to_string_pretty(&creds_data)?;
        std::fs::write(&self.path, content)?;
        Ok(())
    }

    pub fn get(&self, key: &str) -> Option<&String> {
        self.credentials.get(key)
    }

    pub fn set(&mut self, key: String, value: String) {
        self.credentials.insert(key, value);
    }

    pub fn get_listen_api_key(&self) -> Option<&String> {
        self.get(LISTEN_API_KEY)
    }

    pub fn set_listen_api_key(&mut self, key: String) {
        self.set(LISTEN_API_KEY.to_string(), key);
    }
}

/// Pick the catalog API key: environment first, then the credential store,
/// then the config file. Blank and placeholder values are skipped.
pub fn resolve_api_key(env_key: Option<&str>, store: &CredentialStore, config: &Config) -> Option<String> {
    env_key
        .filter(|k| is_usable_api_key(k))
        .map(|k| k.trim().to_string())
        .or_else(|| {
            store
                .get_listen_api_key()
                .filter(|k| is_usable_api_key(k))
                .map(|k| k.trim().to_string())
        })
        .or_else(|| {
            config
                .catalog
                .api_key
                .as_deref()
                .filter(|k| is_usable_api_key(k))
                .map(|k| k.trim().to_string())
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PLACEHOLDER_API_KEY;
    use tempfile::NamedTempFile;

    #[test]
    fn test_credential_store_load_and_save() {
        let file = NamedTempFile::new().unwrap();
        let path = file.path().to_path_buf();

        let mut store = CredentialStore::new(path.clone());
        store.set_listen_api_key("test_key".to_string());
        store.save().unwrap();

        let mut loaded_store = CredentialStore::new(path);
        loaded_store.load().unwrap();
        assert_eq!(loaded_store.get_listen_api_key(), Some(&"test_key".to_string()));
    }

    #[test]
    fn test_set_listen_api_key_replaces_previous() {
        let mut store = CredentialStore::new(PathBuf::from("/tmp/test"));
        store.set_listen_api_key("first".to_string());
        store.set_listen_api_key("second".to_string());

        assert_eq!(store.get_listen_api_key(), Some(&"second".to_string()));
        assert_eq!(store.get("listen_api_key"), Some(&"second".to_string()));
    }

    #[test]
    fn test_resolve_api_key_precedence() {
        let mut store = CredentialStore::new(PathBuf::from("/tmp/test"));
        let mut config = Config::default();
        config.catalog.api_key = Some("from-config".to_string());

        assert_eq!(resolve_api_key(None, &store, &config).as_deref(), Some("from-config"));

        store.set_listen_api_key("from-store".to_string());
        assert_eq!(resolve_api_key(None, &store, &config).as_deref(), Some("from-store"));

        assert_eq!(resolve_api_key(Some("from-env"), &store, &config).as_deref(), Some("from-env"));
    }

    #[test]
    fn test_resolve_api_key_skips_unusable_values() {
        let mut store = CredentialStore::new(PathBuf::from("/tmp/test"));
        store.set_listen_api_key(PLACEHOLDER_API_KEY.to_string());
        let mut config = Config::default();
        config.catalog.api_key = Some("  ".to_string());

        assert_eq!(resolve_api_key(Some(""), &store, &config), None);
    }
}
