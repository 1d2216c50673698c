// src/services/sla_service.rs
//
// Resolution-time prediction: historical average for the severity class,
// scaled by how backlogged the target department currently is. Every lookup
// degrades to a usable default; prediction never fails a submission.

use std::sync::Arc;

use tracing::{error, warn};

use crate::models::{Severity, SlaPrediction};
use crate::repositories::ComplaintRepo;

/// Bound on the historical scan; keeps the estimator query cheap.
const HISTORY_SAMPLE_LIMIT: i64 = 50;

// Workload tiers (inclusive thresholds on open-case count):
// 0..=5 light, 6..=15 medium, 16.. heavy.
const LIGHT_LOAD_MAX: i64 = 5;
const MEDIUM_LOAD_MAX: i64 = 15;
const MEDIUM_LOAD_FACTOR: f64 = 1.2;
const HEAVY_LOAD_FACTOR: f64 = 1.5;

pub struct SlaService {
    complaints: Arc<dyn ComplaintRepo>,
}

impl SlaService {
    pub fn new(complaints: Arc<dyn ComplaintRepo>) -> Self {
        Self { complaints }
    }

    /// Mean resolution hours over up to 50 resolved complaints of the same
    /// severity, rounded to the nearest hour. Falls back to the fixed
    /// per-severity default when there is no history or the query fails.
    ///
    /// `categories` is accepted for future narrowing but does not filter yet.
    pub async fn historical_average(&self, severity: Severity, _categories: &[String]) -> i64 {
        let samples = match self
            .complaints
            .resolution_samples(severity, HISTORY_SAMPLE_LIMIT)
            .await
        {
            Ok(samples) => samples,
            Err(e) => {
                error!("historical average query failed for {}: {}", severity, e);
                return severity.fallback_hours();
            }
        };

        if samples.is_empty() {
            return severity.fallback_hours();
        }

        // Zero or negative durations (clock skew, imported data) stay in the
        // average unfiltered; we only surface them in the log.
        let mut malformed = 0usize;
        let total_hours: f64 = samples
            .iter()
            .map(|s| {
                let hours = (s.updated_at - s.created_at).num_seconds() as f64 / 3600.0;
                if hours <= 0.0 {
                    malformed += 1;
                }
                hours
            })
            .sum();

        if malformed > 0 {
            warn!(
                "{} of {} resolution samples for {} have non-positive duration",
                malformed,
                samples.len(),
                severity
            );
        }

        (total_hours / samples.len() as f64).round() as i64
    }

    /// Count of open (non-resolved) complaints routed to the department.
    /// A failed count reads as an empty queue so prediction still succeeds.
    pub async fn department_workload(&self, route_to: &str) -> i64 {
        match self.complaints.open_count_for_department(route_to).await {
            Ok(count) => count,
            Err(e) => {
                error!("workload query failed for '{}': {}", route_to, e);
                0
            }
        }
    }

    fn workload_factor(workload: i64) -> f64 {
        if workload > MEDIUM_LOAD_MAX {
            HEAVY_LOAD_FACTOR
        } else if workload > LIGHT_LOAD_MAX {
            MEDIUM_LOAD_FACTOR
        } else {
            1.0
        }
    }

    /// Predict resolution time for a new complaint, with the raw inputs
    /// exposed for audit. Always succeeds with best-effort inputs.
    pub async fn predict(
        &self,
        severity: Severity,
        categories: &[String],
        route_to: &str,
    ) -> SlaPrediction {
        let historical_avg = self.historical_average(severity, categories).await;
        let current_workload = self.department_workload(route_to).await;
        let workload_factor = Self::workload_factor(current_workload);

        let predicted_hours = (historical_avg as f64 * workload_factor).round() as i64;

        SlaPrediction {
            predicted_hours,
            predicted_days: format!("{:.1}", predicted_hours as f64 / 24.0),
            historical_avg,
            current_workload,
            workload_factor,
        }
    }
}
