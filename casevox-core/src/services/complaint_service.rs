// src/services/complaint_service.rs
//
// Intake and case management. Submission is the one path that must never
// lose user input: a dead classifier degrades to keyword classification and
// a dead estimator degrades to severity defaults, but the complaint row is
// written as long as the datastore accepts it.

use std::sync::Arc;

use chrono::{Duration, Utc};
use tracing::{info, warn};
use uuid::Uuid;

use casevox_classify::{Classification, Classify};

use crate::models::{
    ActionLogEntry, Complaint, SlaPrediction, Status, Visibility,
};
use crate::repositories::{ActionsLogRepo, ComplaintRepo};
use crate::services::SlaService;
use crate::Error;

pub struct ComplaintService {
    complaints: Arc<dyn ComplaintRepo>,
    actions: Arc<dyn ActionsLogRepo>,
    classifier: Arc<dyn Classify>,
    sla: SlaService,
}

impl ComplaintService {
    pub fn new(
        complaints: Arc<dyn ComplaintRepo>,
        actions: Arc<dyn ActionsLogRepo>,
        classifier: Arc<dyn Classify>,
        sla: SlaService,
    ) -> Self {
        Self {
            complaints,
            actions,
            classifier,
            sla,
        }
    }

    /// Submit a new complaint: classify, predict resolution time, persist.
    ///
    /// The classifier's `sla_hours` sets the deadline; the estimator's
    /// prediction is stored alongside it as display metadata. The two are
    /// deliberately not reconciled.
    pub async fn submit(
        &self,
        complaint_text: &str,
        anonymous: bool,
        user_id: Option<Uuid>,
    ) -> Result<Complaint, Error> {
        let complaint_text = complaint_text.trim();
        if complaint_text.is_empty() {
            return Err(Error::Validation("Complaint text is required".to_string()));
        }

        let classification = match self.classifier.classify(complaint_text).await {
            Ok(c) => c,
            Err(e) => {
                warn!("classifier unavailable, using keyword fallback: {}", e);
                Classification::fallback(complaint_text)
            }
        };

        let prediction = self
            .sla
            .predict(
                classification.severity,
                &classification.categories,
                &classification.route_to,
            )
            .await;

        let now = Utc::now();
        let complaint = Complaint {
            id: Uuid::new_v4(),
            complaint_text: complaint_text.to_string(),
            categories: classification.categories,
            severity: classification.severity,
            status: Status::Pending,
            route_to: classification.route_to,
            anonymous,
            anonymous_recommended: classification.anonymous_recommended,
            escalation_required: classification.escalation_required,
            sla_hours: classification.sla_hours,
            sla_deadline: now + Duration::hours(classification.sla_hours as i64),
            predicted_resolution_days: prediction.predicted_days.clone(),
            engagement_score: 0.0,
            visibility: if anonymous {
                Visibility::Private
            } else {
                Visibility::Public
            },
            resolution_notes: None,
            user_id,
            created_at: now,
            updated_at: now,
        };

        self.complaints.create(&complaint).await?;
        info!(
            "complaint {} created (severity {}, routed to '{}')",
            complaint.id, complaint.severity, complaint.route_to
        );

        self.log_action(complaint.id, "created", user_id, Some("Complaint submitted"))
            .await;

        Ok(complaint)
    }

    /// Classification plus SLA prediction without persisting anything.
    /// Unlike `submit`, a classifier failure propagates here; there is no
    /// complaint at stake.
    pub async fn analyze(
        &self,
        complaint_text: &str,
    ) -> Result<(Classification, SlaPrediction), Error> {
        let complaint_text = complaint_text.trim();
        if complaint_text.is_empty() {
            return Err(Error::Validation("Complaint text is required".to_string()));
        }

        let classification = self.classifier.classify(complaint_text).await?;
        let prediction = self
            .sla
            .predict(
                classification.severity,
                &classification.categories,
                &classification.route_to,
            )
            .await;

        Ok((classification, prediction))
    }

    /// Fetch one complaint. The free text is withheld for anonymous
    /// submissions. A missing row is `Error::NotFound`, distinct from any
    /// computation fallback.
    pub async fn get(&self, id: Uuid) -> Result<Complaint, Error> {
        match self.complaints.get(id).await? {
            Some(c) => Ok(c.redacted()),
            None => Err(Error::NotFound(format!("complaint {}", id))),
        }
    }

    /// Community feed: public complaints, newest first.
    pub async fn list_public(&self) -> Result<Vec<Complaint>, Error> {
        self.complaints.list_public().await
    }

    /// A submitter's own complaints, anonymous ones included.
    pub async fn list_for_user(&self, user_id: Uuid) -> Result<Vec<Complaint>, Error> {
        self.complaints.list_for_user(user_id).await
    }

    /// Triage queue for one department, newest first.
    pub async fn list_for_department(&self, route_to: &str) -> Result<Vec<Complaint>, Error> {
        self.complaints.list_for_department(route_to).await
    }

    pub async fn update_status(
        &self,
        id: Uuid,
        status: Status,
        resolution_notes: Option<&str>,
        performed_by: Option<Uuid>,
    ) -> Result<Complaint, Error> {
        if self.complaints.get(id).await?.is_none() {
            return Err(Error::NotFound(format!("complaint {}", id)));
        }

        self.complaints
            .update_status(id, status, resolution_notes)
            .await?;

        self.log_action(
            id,
            "status_updated",
            performed_by,
            Some(&format!("Status changed to {}", status)),
        )
        .await;

        match self.complaints.get(id).await? {
            Some(c) => Ok(c),
            None => Err(Error::NotFound(format!("complaint {}", id))),
        }
    }

    /// Explicit routing correction, the only sanctioned way to change
    /// `route_to` after intake.
    pub async fn correct_routing(
        &self,
        id: Uuid,
        route_to: &str,
        performed_by: Option<Uuid>,
    ) -> Result<Complaint, Error> {
        if self.complaints.get(id).await?.is_none() {
            return Err(Error::NotFound(format!("complaint {}", id)));
        }

        self.complaints.update_route(id, route_to).await?;

        self.log_action(
            id,
            "rerouted",
            performed_by,
            Some(&format!("Rerouted to {}", route_to)),
        )
        .await;

        match self.complaints.get(id).await? {
            Some(c) => Ok(c),
            None => Err(Error::NotFound(format!("complaint {}", id))),
        }
    }

    /// Delete a complaint (engagement rows cascade). Authorization is the
    /// caller's concern.
    pub async fn delete(&self, id: Uuid) -> Result<(), Error> {
        if self.complaints.get(id).await?.is_none() {
            return Err(Error::NotFound(format!("complaint {}", id)));
        }
        self.complaints.delete(id).await
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
