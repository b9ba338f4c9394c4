use color_eyre::eyre::eyre;
use color_eyre::Result;
use podcast_config::{resolve_api_key, Config, CredentialStore, PathManager, API_KEY_ENV, is_usable_api_key};
use podcast_core::{
    AcquisitionPipeline, DegradationPolicy, FallbackDataset, ListenLog, PipelineOptions, SessionStore,
};
use podcast_sources::{CatalogSource, ListenNotesClient};
use tracing::debug;

/// Where the active catalog API key came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeySource {
    Environment,
    CredentialStore,
    ConfigFile,
    Missing,
}

impl KeySource {
    pub fn label(&self) -> &'static str {
        match self {
            KeySource::Environment => API_KEY_ENV,
            KeySource::CredentialStore => "credentials.toml",
            KeySource::ConfigFile => "config.toml",
            KeySource::Missing => "not configured",
        }
    }
}

/// Paths, config and credentials shared by every command
pub struct AppContext {
    pub paths: PathManager,
    pub config: Config,
    pub credentials: CredentialStore,
}

impl AppContext {
    pub fn load() -> Result<Self> {
        Self::load_from(PathManager::default())
    }

    pub fn load_from(paths: PathManager) -> Result<Self> {
        let config_file = paths.config_file();
        let config = Config::load_or_default(&config_file)
            .map_err(|e| eyre!("Failed to load config from {}: {}", config_file.display(), e))?;
        config
            .validate()
            .map_err(|e| eyre!("Invalid config at {}: {}", config_file.display(), e))?;

        let mut credentials = CredentialStore::new(paths.credentials_file());
        credentials
            .load()
            .map_err(|e| eyre!("Failed to load credentials: {}", e))?;

        Ok(Self { paths, config, credentials })
    }

    fn env_key() -> Option<String> {
        std::env::var(API_KEY_ENV).ok()
    }

    pub fn api_key(&self) -> Option<String> {
        resolve_api_key(Self::env_key().as_deref(), &self.credentials, &self.config)
    }

    pub fn key_source(&self) -> KeySource {
        if Self::env_key().as_deref().map(is_usable_api_key).unwrap_or(false) {
            KeySource::Environment
        } else if self.credentials.get_listen_api_key().map(|k| is_usable_api_key(k)).unwrap_or(false) {
            KeySource::CredentialStore
        } else if self.config.has_configured_api_key() {
            KeySource::ConfigFile
        } else {
            KeySource::Missing
        }
    }

    pub fn pipeline(&self) -> Result<AcquisitionPipeline<ListenNotesClient>> {
        let fallback = FallbackDataset::bundled().map_err(|e| eyre!("{}", e))?;
        let client = ListenNotesClient::from_config(&self.config.catalog, self.api_key());
        debug!(
            source = client.source_name(),
            has_credential = client.has_credential(),
            key_source = self.key_source().label(),
            "Catalog client ready"
        );

        Ok(AcquisitionPipeline::new(
            client,
            DegradationPolicy::new(fallback),
            PipelineOptions::from_config(&self.config),
        ))
    }

    pub fn session_store(&self) -> SessionStore {
        SessionStore::load(self.paths.session_file())
    }

    pub fn listen_log(&self) -> ListenLog {
        ListenLog::load(self.paths.listen_log_file())
    }
}
