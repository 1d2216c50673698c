// casevox-common/src/models/complaint.rs

use std::fmt;
use std::str::FromStr;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Classifier-assigned urgency class. Stored as TEXT; mutable only through
/// engagement-driven escalation (one-way to High) or manual staff edits.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, Eq, PartialEq, Hash, sqlx::Type)]
#[sqlx(type_name = "TEXT")]
pub enum Severity {
    Low,
    Normal,
    High,
}

impl Severity {
    /// Numeric urgency score used by the aggregator: High 3, Normal 2, Low 1.
    /// Unknown severities parse to `Normal`, so "missing severity scores 2"
    /// lives here and nowhere else.
    pub fn score(&self) -> f64 {
        match self {
            Severity::High => 3.0,
            Severity::Normal => 2.0,
            Severity::Low => 1.0,
        }
    }

    /// Expected resolution hours when no historical data exists for this
    /// severity.
    pub fn fallback_hours(&self) -> i64 {
        match self {
            Severity::High => 72,
            Severity::Normal => 168,
            Severity::Low => 336,
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Low => write!(f, "Low"),
            Severity::Normal => write!(f, "Normal"),
            Severity::High => write!(f, "High"),
        }
    }
}

impl FromStr for Severity {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "low" => Ok(Severity::Low),
            "normal" => Ok(Severity::Normal),
            "high" => Ok(Severity::High),
            _ => Err(format!("Unknown severity: {}", s)),
        }
    }
}

impl From<String> for Severity {
    fn from(s: String) -> Self {
        s.parse().unwrap_or(Severity::Normal)
    }
}

/// Case workflow state. Monotonic in the typical flow but not enforced.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, Eq, PartialEq, Hash, sqlx::Type)]
#[sqlx(type_name = "TEXT")]
pub enum Status {
    #[sqlx(rename = "pending")]
    Pending,
    #[sqlx(rename = "in_progress")]
    InProgress,
    #[sqlx(rename = "resolved")]
    Resolved,
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Status::Pending => write!(f, "pending"),
            Status::InProgress => write!(f, "in_progress"),
            Status::Resolved => write!(f, "resolved"),
        }
    }
}

impl FromStr for Status {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "pending" => Ok(Status::Pending),
            "in_progress" => Ok(Status::InProgress),
            "resolved" => Ok(Status::Resolved),
            _ => Err(format!("Unknown status: {}", s)),
        }
    }
}

impl From<String> for Status {
    fn from(s: String) -> Self {
        s.parse().unwrap_or(Status::Pending)
    }
}

/// Gates whether a complaint is eligible for community engagement at all.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, Eq, PartialEq, Hash, sqlx::Type)]
#[sqlx(type_name = "TEXT")]
#[sqlx(rename_all = "lowercase")]
pub enum Visibility {
    Public,
    Private,
}

impl fmt::Display for Visibility {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Visibility::Public => write!(f, "public"),
            Visibility::Private => write!(f, "private"),
        }
    }
}

impl FromStr for Visibility {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "public" => Ok(Visibility::Public),
            "private" => Ok(Visibility::Private),
            _ => Err(format!("Unknown visibility: {}", s)),
        }
    }
}

impl From<String> for Visibility {
    fn from(s: String) -> Self {
        s.parse().unwrap_or(Visibility::Public)
    }
}

/// A submitted grievance.
///
/// `sla_hours`/`sla_deadline` come from the classifier at creation and set the
/// deadline; `predicted_resolution_days` comes from the SLA estimator. The two
/// are persisted side by side and never reconciled.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Complaint {
    pub id: Uuid,
    pub complaint_text: String,
    pub categories: Vec<String>,
    pub severity: Severity,
    pub status: Status,
    pub route_to: String,
    pub anonymous: bool,
    pub anonymous_recommended: bool,
    pub escalation_required: bool,
    pub sla_hours: i32,
    pub sla_deadline: DateTime<Utc>,
    pub predicted_resolution_days: String,
    pub engagement_score: f64,
    pub visibility: Visibility,
    pub resolution_notes: Option<String>,
    pub user_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Complaint {
    /// Read view with the free text withheld for anonymous submissions.
    pub fn redacted(mut self) -> Self {
        if self.anonymous {
            self.complaint_text.clear();
        }
        self
    }
}
