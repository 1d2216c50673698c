// src/services/mod.rs

pub mod complaint_service;
pub mod engagement_service;
pub mod sla_service;

pub use complaint_service::ComplaintService;
pub use engagement_service::EngagementService;
pub use sla_service::SlaService;
