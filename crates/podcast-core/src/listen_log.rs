use anyhow::Result;
use chrono::{DateTime, Utc};
use podcast_models::{ListenLogEntry, ListenStats};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Default number of entries returned by `recent`
pub const DEFAULT_RECENT_LIMIT: usize = 5;

/// Append-only record of listens, persisted as one JSON array.
///
/// The whole sequence is rewritten on every append. Writes go to a temp file
/// that is then renamed over the log, so a failed write leaves the previous
/// copy intact.
pub struct ListenLog {
    path: PathBuf,
    entries: Vec<ListenLogEntry>,
}

impl ListenLog {
    /// Load the log from disk. Missing or corrupt files yield an empty log.
    pub fn load(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let entries = Self::read_entries(&path);
        Self { path, entries }
    }

    fn read_entries(path: &Path) -> Vec<ListenLogEntry> {
        if !path.exists() {
            debug!("Listen log {:?} does not exist, starting empty", path);
            return Vec::new();
        }

        let parsed = std::fs::read_to_string(path)
            .map_err(anyhow::Error::from)
            .and_then(|content| serde_json::from_str::<Vec<ListenLogEntry>>(&content).map_err(anyhow::Error::from));

        match parsed {
            Ok(mut entries) => {
                entries.sort_by(ListenLogEntry::chronological);
                info!("Loaded listen log: {} entries", entries.len());
                entries
            }
            Err(e) => {
                let backup_path = path.with_extension("json.bak");
                if let Err(backup_err) = std::fs::rename(path, &backup_path) {
                    warn!(
                        "Listen log is unreadable ({}) and could not be backed up: {}. Starting with empty log.",
                        e, backup_err
                    );
                } else {
                    warn!(
                        "Listen log is unreadable ({}). Moved it to {:?} and starting with empty log.",
                        e, backup_path
                    );
                }
                Vec::new()
            }
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append a listen for the signed-in session.
    ///
    /// Returns `None` without touching the log when nobody is signed in.
    pub fn record(
        &mut self,
        session_id: Option<&str>,
        podcast_id: &str,
        rating: Option<u8>,
        notes: Option<String>,
    ) -> Option<ListenLogEntry> {
        let session_id = match session_id {
            Some(id) if !id.trim().is_empty() => id,
            _ => {
                debug!(operation = "record", "No active session, listen not recorded");
                return None;
            }
        };

        let (id, created_at) = self.next_stamp(Utc::now());
        let entry = ListenLogEntry {
            id,
            session_id: session_id.to_string(),
            podcast_id: podcast_id.to_string(),
            created_at,
            rating,
            notes: notes.filter(|n| !n.trim().is_empty()),
        };
        self.entries.push(entry.clone());

        if let Err(e) = self.persist() {
            warn!(
                operation = "record",
                error = %e,
                "Failed to persist listen log; on-disk copy is stale"
            );
        }
        info!(operation = "record", podcast_id = %entry.podcast_id, entry_id = entry.id, "Listen recorded");

        Some(entry)
    }

    /// Id and timestamp for a new entry; both never go backwards
    fn next_stamp(&self, now: DateTime<Utc>) -> (u64, DateTime<Utc>) {
        let now_ms = now.timestamp_millis().max(0) as u64;
        match self.entries.last() {
            Some(last) => (now_ms.max(last.id + 1), now.max(last.created_at)),
            None => (now_ms, now),
        }
    }

    /// Write the full log atomically
    pub fn persist(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = serde_json::to_string_pretty(&self.entries)?;

        let temp_path = self.path.with_extension("json.tmp");
        std::fs::write(&temp_path, content)?;
        std::fs::rename(&temp_path, &self.path)?;

        debug!("Saved listen log: {} entries to {:?}", self.entries.len(), self.path);
        Ok(())
    }

    /// Entries of one session in creation order
    pub fn entries_for(&self, session_id: &str) -> Vec<&ListenLogEntry> {
        self.entries
            .iter()
            .filter(|e| e.session_id == session_id)
            .collect()
    }

    /// Most recent entries of one session, newest first
    pub fn recent(&self, session_id: &str, limit: usize) -> Vec<&ListenLogEntry> {
        self.entries
            .iter()
            .rev()
            .filter(|e| e.session_id == session_id)
            .take(limit)
            .collect()
    }

    pub fn has_logged(&self, session_id: &str, podcast_id: &str) -> bool {
        self.entries
            .iter()
            .any(|e| e.session_id == session_id && e.podcast_id == podcast_id)
    }

    pub fn stats_for(&self, session_id: &str) -> ListenStats {
        let entries = self.entries_for(session_id);
        let distinct: HashSet<&str> = entries.iter().map(|e| e.podcast_id.as_str()).collect();
        ListenStats {
            total_listens: entries.len(),
            distinct_podcasts: distinct.len(),
        }
    }

    pub fn all(&self) -> &[ListenLogEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
