// File: casevox-core/tests/engagement_service_tests.rs

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{Duration, Utc};
use uuid::Uuid;

use casevox_core::models::{
    ActionLogEntry, ActionType, Complaint, EngagementEvent, Severity, Status, Visibility,
};
use casevox_core::repositories::postgres::complaint::ResolutionSample;
use casevox_core::repositories::{ActionsLogRepo, ComplaintRepo, EngagementRepo};
use casevox_core::services::engagement_service::{engagement_velocity_score, EngagementService};
use casevox_core::Error;

fn make_complaint(severity: Severity, age_days: i64) -> Complaint {
    let created = Utc::now() - Duration::days(age_days);
    Complaint {
        id: Uuid::new_v4(),
        complaint_text: "The corridor lights have been out for a week".to_string(),
        categories: vec!["Infrastructure".to_string()],
        severity,
        status: Status::Pending,
        route_to: "Operations / Facilities Management".to_string(),
        anonymous: false,
        anonymous_recommended: false,
        escalation_required: false,
        sla_hours: 168,
        sla_deadline: created + Duration::hours(168),
        predicted_resolution_days: "7.0".to_string(),
        engagement_score: 0.0,
        visibility: Visibility::Public,
        resolution_notes: None,
        user_id: None,
        created_at: created,
        updated_at: created,
    }
}

/// In-memory complaint store that records escalation/score writes.
#[derive(Default)]
struct MockComplaintRepo {
    complaints: Mutex<HashMap<Uuid, Complaint>>,
    escalate_calls: AtomicUsize,
    score_calls: AtomicUsize,
    fail_get: bool,
}

impl MockComplaintRepo {
    fn with_complaint(complaint: Complaint) -> Self {
        let repo = Self::default();
        repo.complaints
            .lock()
            .unwrap()
            .insert(complaint.id, complaint);
        repo
    }

    fn stored(&self, id: Uuid) -> Option<Complaint> {
        self.complaints.lock().unwrap().get(&id).cloned()
    }
}

#[async_trait]
impl ComplaintRepo for MockComplaintRepo {
    async fn create(&self, complaint: &Complaint) -> Result<(), Error> {
        self.complaints
            .lock()
            .unwrap()
            .insert(complaint.id, complaint.clone());
        Ok(())
    }
    async fn get(&self, id: Uuid) -> Result<Option<Complaint>, Error> {
        if self.fail_get {
            return Err(Error::Parse("simulated datastore failure".to_string()));
        }
        Ok(self.complaints.lock().unwrap().get(&id).cloned())
    }
    async fn list_public(&self) -> Result<Vec<Complaint>, Error> {
        Ok(Vec::new())
    }
    async fn list_for_user(&self, _user_id: Uuid) -> Result<Vec<Complaint>, Error> {
        Ok(Vec::new())
    }
    async fn list_for_department(&self, _route_to: &str) -> Result<Vec<Complaint>, Error> {
        Ok(Vec::new())
    }
    async fn update_status(
        &self,
        _id: Uuid,
        _status: Status,
        _resolution_notes: Option<&str>,
    ) -> Result<(), Error> {
        Ok(())
    }
    async fn update_route(&self, _id: Uuid, _route_to: &str) -> Result<(), Error> {
        Ok(())
    }
    async fn set_engagement_score(&self, id: Uuid, score: f64) -> Result<(), Error> {
        self.score_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(c) = self.complaints.lock().unwrap().get_mut(&id) {
            c.engagement_score = score;
        }
        Ok(())
    }
    async fn escalate(&self, id: Uuid, engagement_score: f64) -> Result<(), Error> {
        self.escalate_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(c) = self.complaints.lock().unwrap().get_mut(&id) {
            c.severity = Severity::High;
            c.engagement_score = engagement_score;
        }
        Ok(())
    }
    async fn resolution_samples(
        &self,
        _severity: Severity,
        _limit: i64,
    ) -> Result<Vec<ResolutionSample>, Error> {
        Ok(Vec::new())
    }
    async fn open_count_for_department(&self, _route_to: &str) -> Result<i64, Error> {
        Ok(0)
    }
    async fn delete(&self, id: Uuid) -> Result<(), Error> {
        self.complaints.lock().unwrap().remove(&id);
        Ok(())
    }
}

/// In-memory engagement store keyed the way the real table is.
#[derive(Default)]
struct MockEngagementRepo {
    events: Mutex<Vec<EngagementEvent>>,
    fail_counts: bool,
}

#[async_trait]
impl EngagementRepo for MockEngagementRepo {
    async fn find_like(&self, complaint_id: Uuid, user_id: Uuid) -> Result<Option<Uuid>, Error> {
        Ok(self
            .events
            .lock()
            .unwrap()
            .iter()
            .find(|e| {
                e.complaint_id == complaint_id
                    && e.user_id == user_id
                    && e.action_type == ActionType::Like
            })
            .map(|e| e.id))
    }
    async fn insert_like(
        &self,
        complaint_id: Uuid,
        user_id: Uuid,
    ) -> Result<EngagementEvent, Error> {
        let event = EngagementEvent {
            id: Uuid::new_v4(),
            complaint_id,
            user_id,
            action_type: ActionType::Like,
            comment_text: None,
            created_at: Utc::now(),
        };
        self.events.lock().unwrap().push(event.clone());
        Ok(event)
    }
    async fn insert_comment(
        &self,
        complaint_id: Uuid,
        user_id: Uuid,
        comment_text: &str,
    ) -> Result<EngagementEvent, Error> {
        let event = EngagementEvent {
            id: Uuid::new_v4(),
            complaint_id,
            user_id,
            action_type: ActionType::Comment,
            comment_text: Some(comment_text.to_string()),
            created_at: Utc::now(),
        };
        self.events.lock().unwrap().push(event.clone());
        Ok(event)
    }
    async fn delete(&self, event_id: Uuid) -> Result<(), Error> {
        self.events.lock().unwrap().retain(|e| e.id != event_id);
        Ok(())
    }
    async fn count(&self, complaint_id: Uuid, action_type: ActionType) -> Result<i64, Error> {
        if self.fail_counts {
            return Err(Error::Parse("simulated datastore failure".to_string()));
        }
        Ok(self
            .events
            .lock()
            .unwrap()
            .iter()
            .filter(|e| e.complaint_id == complaint_id && e.action_type == action_type)
            .count() as i64)
    }
    async fn comments(&self, complaint_id: Uuid) -> Result<Vec<EngagementEvent>, Error> {
        let mut comments: Vec<EngagementEvent> = self
            .events
            .lock()
            .unwrap()
            .iter()
            .filter(|e| e.complaint_id == complaint_id && e.action_type == ActionType::Comment)
            .cloned()
            .collect();
        comments.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(comments)
    }
}

#[derive(Default)]
struct MockActionsLogRepo {
    entries: Mutex<Vec<ActionLogEntry>>,
}

#[async_trait]
impl ActionsLogRepo for MockActionsLogRepo {
    async fn insert(&self, entry: &ActionLogEntry) -> Result<(), Error> {
        self.entries.lock().unwrap().push(entry.clone());
        Ok(())
    }
    async fn list_for_complaint(
        &self,
        complaint_id: Uuid,
    ) -> Result<Vec<ActionLogEntry>, Error> {
        Ok(self
            .entries
            .lock()
            .unwrap()
            .iter()
            .filter(|e| e.complaint_id == complaint_id)
            .cloned()
            .collect())
    }
}

struct Fixture {
    complaints: Arc<MockComplaintRepo>,
    engagement: Arc<MockEngagementRepo>,
    service: EngagementService,
}

fn fixture(complaints: MockComplaintRepo, engagement: MockEngagementRepo) -> Fixture {
    let complaints = Arc::new(complaints);
    let engagement = Arc::new(engagement);
    let service = EngagementService::new(
        complaints.clone(),
        engagement.clone(),
        Arc::new(MockActionsLogRepo::default()),
    );
    Fixture {
        complaints,
        engagement,
        service,
    }
}

async fn add_likes(engagement: &MockEngagementRepo, complaint_id: Uuid, n: usize) {
    for _ in 0..n {
        engagement
            .insert_like(complaint_id, Uuid::new_v4())
            .await
            .unwrap();
    }
}

async fn add_comments(engagement: &MockEngagementRepo, complaint_id: Uuid, n: usize) {
    for i in 0..n {
        engagement
            .insert_comment(complaint_id, Uuid::new_v4(), &format!("comment {}", i))
            .await
            .unwrap();
    }
}

// --- pure scoring function -------------------------------------------------

#[test]
fn zero_engagement_scores_zero() {
    assert_eq!(engagement_velocity_score(0, 0, 1.0), 0.0);
    assert_eq!(engagement_velocity_score(0, 0, 365.0), 0.0);
}

#[test]
fn ten_likes_in_a_day_saturates() {
    // velocity = 30/day, well past the cap of 10
    assert_eq!(engagement_velocity_score(10, 0, 1.0), 1.0);
}

#[test]
fn one_like_two_comments_in_a_day_scores_point_four() {
    // 1*3 + 2*0.5 = 4 units/day -> 0.4
    let score = engagement_velocity_score(1, 2, 1.0);
    assert!((score - 0.4).abs() < 1e-9);
}

#[test]
fn same_day_complaints_clamp_age_to_one_day() {
    // 0.1 days old behaves like 1 day old instead of multiplying velocity x10
    assert_eq!(
        engagement_velocity_score(2, 0, 0.1),
        engagement_velocity_score(2, 0, 1.0)
    );
}

// --- service-level scoring -------------------------------------------------

#[tokio::test]
async fn score_is_zero_with_no_engagement() {
    let complaint = make_complaint(Severity::Normal, 3);
    let id = complaint.id;
    let f = fixture(
        MockComplaintRepo::with_complaint(complaint),
        MockEngagementRepo::default(),
    );
    assert_eq!(f.service.engagement_score(id).await, 0.0);
}

#[tokio::test]
async fn score_is_zero_when_counts_fail() {
    let complaint = make_complaint(Severity::Normal, 3);
    let id = complaint.id;
    let f = fixture(
        MockComplaintRepo::with_complaint(complaint),
        MockEngagementRepo {
            fail_counts: true,
            ..Default::default()
        },
    );
    assert_eq!(f.service.engagement_score(id).await, 0.0);
}

#[tokio::test]
async fn score_is_zero_for_missing_complaint() {
    let f = fixture(MockComplaintRepo::default(), MockEngagementRepo::default());
    assert_eq!(f.service.engagement_score(Uuid::new_v4()).await, 0.0);
}

// --- urgency aggregation & escalation --------------------------------------

#[tokio::test]
async fn low_severity_with_moderate_engagement_does_not_escalate() {
    let complaint = make_complaint(Severity::Low, 1);
    let id = complaint.id;
    let f = fixture(
        MockComplaintRepo::with_complaint(complaint),
        MockEngagementRepo::default(),
    );
    // 1 like + 2 comments over ~1 day -> score ~0.4 -> urgency ~1 + 1.2
    add_likes(&f.engagement, id, 1).await;
    add_comments(&f.engagement, id, 2).await;

    let assessment = f.service.recalculate_urgency(id).await.unwrap();
    assert!(!assessment.escalated);
    assert_eq!(assessment.ai_severity, 1.0);
    assert!((assessment.urgency_score - 2.2).abs() < 0.01);

    let stored = f.complaints.stored(id).unwrap();
    assert_eq!(stored.severity, Severity::Low);
    assert!((stored.engagement_score - 0.4).abs() < 0.01);
    assert_eq!(f.complaints.escalate_calls.load(Ordering::SeqCst), 0);
    assert_eq!(f.complaints.score_calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn normal_severity_with_heavy_engagement_escalates_to_high() {
    let complaint = make_complaint(Severity::Normal, 1);
    let id = complaint.id;
    let f = fixture(
        MockComplaintRepo::with_complaint(complaint),
        MockEngagementRepo::default(),
    );
    // 2 likes + 2 comments over ~1 day -> 7 units -> score ~0.7
    // urgency ~ 2 + 2.1 = 4.1, over the threshold
    add_likes(&f.engagement, id, 2).await;
    add_comments(&f.engagement, id, 2).await;

    let assessment = f.service.recalculate_urgency(id).await.unwrap();
    assert!(assessment.escalated);
    assert!((assessment.urgency_score - 4.1).abs() < 0.01);

    let stored = f.complaints.stored(id).unwrap();
    assert_eq!(stored.severity, Severity::High);
    assert!((stored.engagement_score - 0.7).abs() < 0.01);
    assert_eq!(f.complaints.escalate_calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn already_high_severity_never_re_escalates() {
    let complaint = make_complaint(Severity::High, 1);
    let id = complaint.id;
    let f = fixture(
        MockComplaintRepo::with_complaint(complaint),
        MockEngagementRepo::default(),
    );
    add_likes(&f.engagement, id, 20).await; // saturated signal

    let assessment = f.service.recalculate_urgency(id).await.unwrap();
    assert!(!assessment.escalated);
    assert_eq!(assessment.engagement_score, 1.0);
    assert_eq!(assessment.urgency_score, 6.0);

    // Severity write skipped; the fresh score is still recorded.
    let stored = f.complaints.stored(id).unwrap();
    assert_eq!(stored.severity, Severity::High);
    assert_eq!(stored.engagement_score, 1.0);
    assert_eq!(f.complaints.escalate_calls.load(Ordering::SeqCst), 0);
    assert_eq!(f.complaints.score_calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn escalation_fires_exactly_once() {
    let complaint = make_complaint(Severity::Normal, 1);
    let id = complaint.id;
    let f = fixture(
        MockComplaintRepo::with_complaint(complaint),
        MockEngagementRepo::default(),
    );
    add_likes(&f.engagement, id, 10).await; // saturated -> urgency 5.0

    let first = f.service.recalculate_urgency(id).await.unwrap();
    assert!(first.escalated);

    // Second pass sees severity High already; score-only update.
    let second = f.service.recalculate_urgency(id).await.unwrap();
    assert!(!second.escalated);
    assert_eq!(second.engagement_score, first.engagement_score);
    assert_eq!(f.complaints.escalate_calls.load(Ordering::SeqCst), 1);
    assert_eq!(f.complaints.score_calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn recomputation_is_idempotent_with_unchanged_counts() {
    let complaint = make_complaint(Severity::Normal, 5);
    let id = complaint.id;
    let f = fixture(
        MockComplaintRepo::with_complaint(complaint),
        MockEngagementRepo::default(),
    );

    let first = f.service.recalculate_urgency(id).await.unwrap();
    let second = f.service.recalculate_urgency(id).await.unwrap();
    // Zero engagement both times: byte-identical assessments, no escalation,
    // nothing but the identical score write.
    assert_eq!(first, second);
    assert_eq!(first.urgency_score, 2.0);
    assert!(!first.escalated);
    assert_eq!(f.complaints.escalate_calls.load(Ordering::SeqCst), 0);
    assert_eq!(f.complaints.score_calls.load(Ordering::SeqCst), 2);
    assert_eq!(f.complaints.stored(id).unwrap().severity, Severity::Normal);
}

#[tokio::test]
async fn urgency_returns_none_for_missing_complaint() {
    let f = fixture(MockComplaintRepo::default(), MockEngagementRepo::default());
    assert!(f.service.recalculate_urgency(Uuid::new_v4()).await.is_none());
}

#[tokio::test]
async fn urgency_returns_none_when_fetch_fails() {
    let f = fixture(
        MockComplaintRepo {
            fail_get: true,
            ..Default::default()
        },
        MockEngagementRepo::default(),
    );
    assert!(f.service.recalculate_urgency(Uuid::new_v4()).await.is_none());
}

// --- likes & comments ------------------------------------------------------

#[tokio::test]
async fn toggle_like_inserts_then_removes() {
    let complaint = make_complaint(Severity::Normal, 2);
    let id = complaint.id;
    let user = Uuid::new_v4();
    let f = fixture(
        MockComplaintRepo::with_complaint(complaint),
        MockEngagementRepo::default(),
    );

    assert!(f.service.toggle_like(id, user).await.unwrap());
    assert!(f.service.has_user_liked(id, user).await);
    assert_eq!(f.service.engagement_stats(id).await.like_count, 1);

    assert!(!f.service.toggle_like(id, user).await.unwrap());
    assert!(!f.service.has_user_liked(id, user).await);
    assert_eq!(f.service.engagement_stats(id).await.like_count, 0);
}

#[tokio::test]
async fn add_comment_rejects_empty_text() {
    let complaint = make_complaint(Severity::Normal, 2);
    let id = complaint.id;
    let f = fixture(
        MockComplaintRepo::with_complaint(complaint),
        MockEngagementRepo::default(),
    );
    let result = f.service.add_comment(id, Uuid::new_v4(), "   ").await;
    assert!(matches!(result, Err(Error::Validation(_))));
}

#[tokio::test]
async fn comments_come_back_newest_first() {
    let complaint = make_complaint(Severity::Normal, 2);
    let id = complaint.id;
    let f = fixture(
        MockComplaintRepo::with_complaint(complaint),
        MockEngagementRepo::default(),
    );
    f.service
        .add_comment(id, Uuid::new_v4(), "first")
        .await
        .unwrap();
    f.service
        .add_comment(id, Uuid::new_v4(), "second")
        .await
        .unwrap();

    let stats = f.service.engagement_stats(id).await;
    assert_eq!(stats.comment_count, 2);
    assert!(stats.comments[0].created_at >= stats.comments[1].created_at);
}
