// casevox-common/src/models/engagement.rs

use std::fmt;
use std::str::FromStr;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Serialize, Deserialize, Clone, Copy, Eq, PartialEq, Hash, sqlx::Type)]
#[sqlx(type_name = "TEXT")]
#[sqlx(rename_all = "lowercase")]
pub enum ActionType {
    Like,
    Comment,
}

impl fmt::Display for ActionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ActionType::Like => write!(f, "like"),
            ActionType::Comment => write!(f, "comment"),
        }
    }
}

impl FromStr for ActionType {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "like" => Ok(ActionType::Like),
            "comment" => Ok(ActionType::Comment),
            _ => Err(format!("Unknown action type: {}", s)),
        }
    }
}

/// A like or comment on a complaint. At most one like row exists per
/// (complaint_id, user_id); toggling removes the row instead of duplicating.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct EngagementEvent {
    pub id: Uuid,
    pub complaint_id: Uuid,
    pub user_id: Uuid,
    pub action_type: ActionType,
    pub comment_text: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Aggregate engagement view served to feed consumers.
#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct EngagementStats {
    pub like_count: i64,
    pub comment_count: i64,
    pub comments: Vec<EngagementEvent>,
}

/// Append-only audit row. Writers treat failures as best-effort; a lost log
/// line never fails the operation that produced it.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ActionLogEntry {
    pub id: Uuid,
    pub complaint_id: Uuid,
    pub action_type: String,
    pub performed_by: Option<Uuid>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl ActionLogEntry {
    pub fn new(
        complaint_id: Uuid,
        action_type: &str,
        performed_by: Option<Uuid>,
        notes: Option<&str>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            complaint_id,
            action_type: action_type.to_string(),
            performed_by,
            notes: notes.map(String::from),
            created_at: Utc::now(),
        }
    }
}
