// src/services/engagement_service.rs
//
// Social engagement: likes, comments, and the urgency recalculation that
// follows every engagement mutation. Scoring failures degrade to a neutral
// signal; they never surface to the user who liked or commented.

use std::sync::Arc;

use chrono::Utc;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::models::{
    ActionLogEntry, ActionType, EngagementEvent, EngagementStats, Severity, UrgencyAssessment,
};
use crate::repositories::{ActionsLogRepo, ComplaintRepo, EngagementRepo};
use crate::Error;

// Likes are a strong clear signal of support; comments can be anything
// (questions, spam), so they barely count.
const LIKE_WEIGHT: f64 = 3.0;
const COMMENT_WEIGHT: f64 = 0.5;

/// Velocity at which the engagement contribution saturates, in
/// engagement-units per day.
const VELOCITY_CAP: f64 = 10.0;

/// Maximum urgency boost engagement can add. Allows Low (1) + 3 = 4 -> High.
const ENGAGEMENT_BOOST: f64 = 3.0;

const ESCALATION_THRESHOLD: f64 = 4.0;

/// Time-decayed engagement signal, normalized to [0, 1]. Age is clamped to a
/// minimum of one day so same-day complaints do not blow up the velocity.
pub fn engagement_velocity_score(like_count: i64, comment_count: i64, age_days: f64) -> f64 {
    let recency = age_days.max(1.0);
    let velocity = (like_count as f64 * LIKE_WEIGHT + comment_count as f64 * COMMENT_WEIGHT)
        / recency;
    (velocity / VELOCITY_CAP).min(1.0)
}

pub struct EngagementService {
    complaints: Arc<dyn ComplaintRepo>,
    engagement: Arc<dyn EngagementRepo>,
    actions: Arc<dyn ActionsLogRepo>,
}

impl EngagementService {
    pub fn new(
        complaints: Arc<dyn ComplaintRepo>,
        engagement: Arc<dyn EngagementRepo>,
        actions: Arc<dyn ActionsLogRepo>,
    ) -> Self {
        Self {
            complaints,
            engagement,
            actions,
        }
    }

    /// Current engagement score for a complaint. Any lookup failure (or a
    /// missing complaint) yields 0.0, a neutral no-boost signal.
    pub async fn engagement_score(&self, complaint_id: Uuid) -> f64 {
        match self.try_engagement_score(complaint_id).await {
            Ok(score) => score,
            Err(e) => {
                warn!(
                    "engagement score lookup failed for {}: {}",
                    complaint_id, e
                );
                0.0
            }
        }
    }

    async fn try_engagement_score(&self, complaint_id: Uuid) -> Result<f64, Error> {
        let like_count = self.engagement.count(complaint_id, ActionType::Like).await?;
        let comment_count = self
            .engagement
            .count(complaint_id, ActionType::Comment)
            .await?;

        let Some(complaint) = self.complaints.get(complaint_id).await? else {
            return Ok(0.0);
        };

        let age_days =
            (Utc::now() - complaint.created_at).num_seconds() as f64 / (60.0 * 60.0 * 24.0);

        Ok(engagement_velocity_score(like_count, comment_count, age_days))
    }

    /// Recompute final urgency from stored severity plus the engagement
    /// signal, auto-escalating to High when the combined score crosses the
    /// threshold. The severity transition is one-way; there is no
    /// de-escalation path. Every recomputation persists the fresh
    /// engagement score even when nothing escalates.
    ///
    /// Returns `None` on any fetch/update failure, leaving stored state
    /// untouched.
    pub async fn recalculate_urgency(&self, complaint_id: Uuid) -> Option<UrgencyAssessment> {
        let complaint = match self.complaints.get(complaint_id).await {
            Ok(Some(c)) => c,
            Ok(None) => {
                warn!("urgency recalculation for unknown complaint {}", complaint_id);
                return None;
            }
            Err(e) => {
                error!("failed to fetch complaint {} for urgency: {}", complaint_id, e);
                return None;
            }
        };

        let ai_severity = complaint.severity.score();
        let engagement_score = self.engagement_score(complaint_id).await;
        let engagement_contribution = engagement_score * ENGAGEMENT_BOOST;
        let urgency_score = ai_severity + engagement_contribution;

        let escalated =
            urgency_score >= ESCALATION_THRESHOLD && complaint.severity != Severity::High;

        let write = if escalated {
            self.complaints.escalate(complaint_id, engagement_score).await
        } else {
            self.complaints
                .set_engagement_score(complaint_id, engagement_score)
                .await
        };

        if let Err(e) = write {
            error!("failed to persist urgency result for {}: {}", complaint_id, e);
            return None;
        }

        if escalated {
            info!(
                "auto-escalated complaint {} due to engagement (score: {:.2})",
                complaint_id, engagement_score
            );
            self.log_action(
                complaint_id,
                "escalated",
                None,
                Some(&format!(
                    "Severity escalated to High (urgency {:.2})",
                    urgency_score
                )),
            )
            .await;
        }

        Some(UrgencyAssessment {
            urgency_score,
            ai_severity,
            engagement_contribution,
            engagement_score,
            escalated,
        })
    }

    /// Toggle this user's like on a complaint. Returns the resulting liked
    /// state. Urgency is recalculated synchronously after the mutation.
    pub async fn toggle_like(&self, complaint_id: Uuid, user_id: Uuid) -> Result<bool, Error> {
        let liked = match self.engagement.find_like(complaint_id, user_id).await? {
            Some(event_id) => {
                self.engagement.delete(event_id).await?;
                false
            }
            None => {
                self.engagement.insert_like(complaint_id, user_id).await?;
                true
            }
        };

        self.recalculate_urgency(complaint_id).await;
        Ok(liked)
    }

    /// Add a comment and recalculate urgency.
    pub async fn add_comment(
        &self,
        complaint_id: Uuid,
        user_id: Uuid,
        comment_text: &str,
    ) -> Result<EngagementEvent, Error> {
        if comment_text.trim().is_empty() {
            return Err(Error::Validation("Comment text is required".to_string()));
        }

        let event = self
            .engagement
            .insert_comment(complaint_id, user_id, comment_text)
            .await?;

        self.recalculate_urgency(complaint_id).await;
        Ok(event)
    }

    /// Like count plus comments newest-first. Failures read as an empty
    /// stats block rather than an error.
    pub async fn engagement_stats(&self, complaint_id: Uuid) -> EngagementStats {
        let like_count = self
            .engagement
            .count(complaint_id, ActionType::Like)
            .await
            .unwrap_or_else(|e| {
                warn!("like count failed for {}: {}", complaint_id, e);
                0
            });

        let comments = self
            .engagement
            .comments(complaint_id)
            .await
            .unwrap_or_else(|e| {
                warn!("comment lookup failed for {}: {}", complaint_id, e);
                Vec::new()
            });

        EngagementStats {
            like_count,
            comment_count: comments.len() as i64,
            comments,
        }
    }

    pub async fn has_user_liked(&self, complaint_id: Uuid, user_id: Uuid) -> bool {
        match self.engagement.find_like(complaint_id, user_id).await {
            Ok(found) => found.is_some(),
            Err(e) => {
                warn!("like lookup failed for {}: {}", complaint_id, e);
                false
            }
        }
    }

    async fn log_action(
        &self,
        complaint_id: Uuid,
        action_type: &str,
        performed_by: Option<Uuid>,
        notes: Option<&str>,
    ) {
        let entry = ActionLogEntry::new(complaint_id, action_type, performed_by, notes);
        if let Err(e) = self.actions.insert(&entry).await {
            warn!("failed to write action log for {}: {}", complaint_id, e);
        }
    }
}
