// casevox-common/src/models/urgency.rs

use serde::{Deserialize, Serialize};

/// Snapshot of one urgency recalculation. Never persisted as its own row;
/// only an `escalated == true` outcome mutates the owning complaint.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct UrgencyAssessment {
    pub urgency_score: f64,
    pub ai_severity: f64,
    pub engagement_contribution: f64,
    pub engagement_score: f64,
    pub escalated: bool,
}

/// Output of the SLA estimator, with the raw inputs exposed for audit.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct SlaPrediction {
    pub predicted_hours: i64,
    pub predicted_days: String,
    pub historical_avg: i64,
    pub current_workload: i64,
    pub workload_factor: f64,
}
