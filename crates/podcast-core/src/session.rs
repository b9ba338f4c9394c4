use anyhow::Result;
use chrono::Utc;
use podcast_models::Session;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};
use uuid::Uuid;

const DEFAULT_DISPLAY_NAME: &str = "listener";

/// Holds at most one locally fabricated session, persisted as TOML
pub struct SessionStore {
    path: PathBuf,
    current: Option<Session>,
}

impl SessionStore {
    pub fn load(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let current = Self::read_session(&path);
        Self { path, current }
    }

    fn read_session(path: &Path) -> Option<Session> {
        if !path.exists() {
            return None;
        }

        let parsed = std::fs::read_to_string(path)
            .map_err(anyhow::Error::from)
            .and_then(|content| toml::from_str::<Session>(&content).map_err(anyhow::Error::from));

        match parsed {
            Ok(session) => {
                debug!("Restored session for {}", session.display_name);
                Some(session)
            }
            Err(e) => {
                warn!("Session file {:?} is unreadable ({}), treating as signed out", path, e);
                None
            }
        }
    }

    pub fn current(&self) -> Option<&Session> {
        self.current.as_ref()
    }

    pub fn current_id(&self) -> Option<&str> {
        self.current.as_ref().map(|s| s.id.as_str())
    }

    /// Create a new session from an identity hint, replacing any existing one
    pub fn sign_in(&mut self, identity_hint: &str) -> Result<Session> {
        let identity = identity_hint.trim().to_string();
        let session = Session {
            id: Uuid::new_v4().to_string(),
            display_name: display_name_for(&identity),
            identity,
            signed_in_at: Utc::now(),
        };

        self.write(&session)?;
        info!(operation = "sign_in", display_name = %session.display_name, "Signed in");
        self.current = Some(session.clone());
        Ok(session)
    }

    /// Forget the session. The listen log is left alone.
    pub fn sign_out(&mut self) -> Result<()> {
        self.current = None;
        if self.path.exists() {
            std::fs::remove_file(&self.path)?;
        }
        info!(operation = "sign_out", "Signed out");
        Ok(())
    }

    fn write(&self, session: &Session) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(session)?;
        let temp_path = self.path.with_extension("toml.tmp");
        std::fs::write(&temp_path, content)?;
        std::fs::rename(&temp_path, &self.path)?;
        Ok(())
    }
}

/// Part before `@`, or the whole hint
fn display_name_for(identity: &str) -> String {
    let name = identity.split('@').next().unwrap_or_default().trim();
    if name.is_empty() {
        DEFAULT_DISPLAY_NAME.to_string()
    } else {
        name.to_string()
    }
}
