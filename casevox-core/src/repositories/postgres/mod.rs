// src/repositories/postgres/mod.rs

pub mod actions_log;
pub mod complaint;
pub mod engagement;

pub use actions_log::PostgresActionsLogRepository;
pub use complaint::PostgresComplaintRepository;
pub use engagement::PostgresEngagementRepository;
