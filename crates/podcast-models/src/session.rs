use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Locally fabricated identity used only to own listen-log entries
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Session {
    pub id: String,
    pub display_name: String,
    pub identity: String, // Hint the session was created from (usually an email)
    pub signed_in_at: DateTime<Utc>,
}
