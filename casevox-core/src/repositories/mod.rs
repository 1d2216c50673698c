// src/repositories/mod.rs

pub mod postgres;

pub use postgres::actions_log::{ActionsLogRepo, PostgresActionsLogRepository};
pub use postgres::complaint::{ComplaintRepo, PostgresComplaintRepository};
pub use postgres::engagement::{EngagementRepo, PostgresEngagementRepository};
