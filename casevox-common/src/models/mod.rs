// casevox-common/src/models/mod.rs

pub mod complaint;
pub mod engagement;
pub mod urgency;

pub use complaint::{Complaint, Severity, Status, Visibility};
pub use engagement::{ActionLogEntry, ActionType, EngagementEvent, EngagementStats};
pub use urgency::{SlaPrediction, UrgencyAssessment};
