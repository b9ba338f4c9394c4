use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// One recorded listen. Entries are append-only and never edited.
///
/// `session_id` may point at a session that has since signed out; entries
/// outlive their sessions.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ListenLogEntry {
    pub id: u64,
    pub session_id: String,
    pub podcast_id: String,
    pub created_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rating: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl ListenLogEntry {
    /// Total order of the log: creation time, then id
    pub fn chronological(a: &ListenLogEntry, b: &ListenLogEntry) -> Ordering {
        a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id))
    }
}

/// Per-session counts derived from the log
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ListenStats {
    pub total_listens: usize,
    pub distinct_podcasts: usize,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn entry(id: u64, created_at: DateTime<Utc>) -> ListenLogEntry {
        ListenLogEntry {
            id,
            session_id: "s".to_string(),
            podcast_id: "p".to_string(),
            created_at,
            rating: None,
            notes: None,
        }
    }

    #[test]
    fn test_chronological_uses_id_as_tie_break() {
        let now = Utc::now();
        let mut entries = vec![
            entry(3, now),
            entry(1, now + Duration::seconds(1)),
            entry(2, now),
        ];
        entries.sort_by(ListenLogEntry::chronological);

        let ids: Vec<u64> = entries.iter().map(|e| e.id).collect();
        assert_eq!(ids, vec![2, 3, 1]);
    }

    #[test]
    fn test_optional_fields_are_omitted_when_empty() {
        let json = serde_json::to_string(&entry(1, Utc::now())).unwrap();
        assert!(!json.contains("rating"));
        assert!(!json.contains("notes"));
    }
}
