use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A short text note owned by exactly one subject
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Note {
    pub id: i64,
    /// Subject id of the owner, taken from the verified token's `sub` claim
    pub user_id: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
}
