// src/repositories/postgres/complaint.rs

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{Pool, Postgres, Row};
use uuid::Uuid;

use crate::Error;
use crate::models::{Complaint, Severity, Status};

/// Timestamps of one resolved complaint, for the historical duration average.
#[derive(Debug, Clone)]
pub struct ResolutionSample {
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[async_trait]
pub trait ComplaintRepo: Send + Sync {
    async fn create(&self, complaint: &Complaint) -> Result<(), Error>;
    async fn get(&self, id: Uuid) -> Result<Option<Complaint>, Error>;
    async fn list_public(&self) -> Result<Vec<Complaint>, Error>;
    async fn list_for_user(&self, user_id: Uuid) -> Result<Vec<Complaint>, Error>;
    async fn list_for_department(&self, route_to: &str) -> Result<Vec<Complaint>, Error>;
    async fn update_status(
        &self,
        id: Uuid,
        status: Status,
        resolution_notes: Option<&str>,
    ) -> Result<(), Error>;
    async fn update_route(&self, id: Uuid, route_to: &str) -> Result<(), Error>;
    async fn set_engagement_score(&self, id: Uuid, score: f64) -> Result<(), Error>;
    /// One-way severity upgrade to High, recording the score that caused it.
    async fn escalate(&self, id: Uuid, engagement_score: f64) -> Result<(), Error>;
    /// Bounded select of resolved complaints of one severity. No ordering
    /// guarantee; the limit keeps the estimator scan cheap.
    async fn resolution_samples(
        &self,
        severity: Severity,
        limit: i64,
    ) -> Result<Vec<ResolutionSample>, Error>;
    /// Exact count of non-resolved complaints routed to a department.
    async fn open_count_for_department(&self, route_to: &str) -> Result<i64, Error>;
    async fn delete(&self, id: Uuid) -> Result<(), Error>;
}

#[derive(Clone)]
pub struct PostgresComplaintRepository {
    pool: Pool<Postgres>,
}

impl PostgresComplaintRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    fn row_to_complaint(r: &sqlx::postgres::PgRow) -> Result<Complaint, Error> {
        let categories: serde_json::Value = r.try_get("categories")?;
        let categories: Vec<String> = serde_json::from_value(categories)?;
        Ok(Complaint {
            id: r.try_get("id")?,
            complaint_text: r.try_get("complaint_text")?,
            categories,
            severity: r.try_get::<String, _>("severity")?.into(),
            status: r.try_get::<String, _>("status")?.into(),
            route_to: r.try_get("route_to")?,
            anonymous: r.try_get("anonymous")?,
            anonymous_recommended: r.try_get("anonymous_recommended")?,
            escalation_required: r.try_get("escalation_required")?,
            sla_hours: r.try_get("sla_hours")?,
            sla_deadline: r.try_get::<DateTime<Utc>, _>("sla_deadline")?,
            predicted_resolution_days: r.try_get("predicted_resolution_days")?,
            engagement_score: r.try_get("engagement_score")?,
            visibility: r.try_get::<String, _>("visibility")?.into(),
            resolution_notes: r.try_get("resolution_notes")?,
            user_id: r.try_get("user_id")?,
            created_at: r.try_get::<DateTime<Utc>, _>("created_at")?,
            updated_at: r.try_get::<DateTime<Utc>, _>("updated_at")?,
        })
    }
}

const COMPLAINT_COLUMNS: &str = r#"
    id, complaint_text, categories, severity, status, route_to,
    anonymous, anonymous_recommended, escalation_required,
    sla_hours, sla_deadline, predicted_resolution_days,
    engagement_score, visibility, resolution_notes, user_id,
    created_at, updated_at
"#;

#[async_trait]
impl ComplaintRepo for PostgresComplaintRepository {
    async fn create(&self, complaint: &Complaint) -> Result<(), Error> {
        sqlx::query(
            r#"
            INSERT INTO complaints (
                id, complaint_text, categories, severity, status, route_to,
                anonymous, anonymous_recommended, escalation_required,
                sla_hours, sla_deadline, predicted_resolution_days,
                engagement_score, visibility, resolution_notes, user_id,
                created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12,
                    $13, $14, $15, $16, $17, $18)
            "#,
        )
            .bind(complaint.id)
            .bind(&complaint.complaint_text)
            .bind(serde_json::to_value(&complaint.categories)?)
            .bind(complaint.severity.to_string())
            .bind(complaint.status.to_string())
            .bind(&complaint.route_to)
            .bind(complaint.anonymous)
            .bind(complaint.anonymous_recommended)
            .bind(complaint.escalation_required)
            .bind(complaint.sla_hours)
            .bind(complaint.sla_deadline)
            .bind(&complaint.predicted_resolution_days)
            .bind(complaint.engagement_score)
            .bind(complaint.visibility.to_string())
            .bind(&complaint.resolution_notes)
            .bind(complaint.user_id)
            .bind(complaint.created_at)
            .bind(complaint.updated_at)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn get(&self, id: Uuid) -> Result<Option<Complaint>, Error> {
        let row = sqlx::query(&format!(
            "SELECT {COMPLAINT_COLUMNS} FROM complaints WHERE id = $1"
        ))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        match row {
            Some(r) => Ok(Some(Self::row_to_complaint(&r)?)),
            None => Ok(None),
        }
    }

    async fn list_public(&self) -> Result<Vec<Complaint>, Error> {
        let rows = sqlx::query(&format!(
            r#"
            SELECT {COMPLAINT_COLUMNS}
            FROM complaints
            WHERE visibility = 'public'
            ORDER BY created_at DESC
            "#
        ))
            .fetch_all(&self.pool)
            .await?;

        rows.iter().map(Self::row_to_complaint).collect()
    }

    async fn list_for_user(&self, user_id: Uuid) -> Result<Vec<Complaint>, Error> {
        let rows = sqlx::query(&format!(
            r#"
            SELECT {COMPLAINT_COLUMNS}
            FROM complaints
            WHERE user_id = $1
            ORDER BY created_at DESC
            "#
        ))
            .bind(user_id)
            .fetch_all(&self.pool)
            .await?;

        rows.iter().map(Self::row_to_complaint).collect()
    }

    async fn list_for_department(&self, route_to: &str) -> Result<Vec<Complaint>, Error> {
        let rows = sqlx::query(&format!(
            r#"
            SELECT {COMPLAINT_COLUMNS}
            FROM complaints
            WHERE route_to = $1
            ORDER BY created_at DESC
            "#
        ))
            .bind(route_to)
            .fetch_all(&self.pool)
            .await?;

        rows.iter().map(Self::row_to_complaint).collect()
    }

    async fn update_status(
        &self,
        id: Uuid,
        status: Status,
        resolution_notes: Option<&str>,
    ) -> Result<(), Error> {
        sqlx::query(
            r#"
            UPDATE complaints
            SET status = $1,
                resolution_notes = COALESCE($2, resolution_notes),
                updated_at = now()
            WHERE id = $3
            "#,
        )
            .bind(status.to_string())
            .bind(resolution_notes)
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn update_route(&self, id: Uuid, route_to: &str) -> Result<(), Error> {
        sqlx::query(
            r#"
            UPDATE complaints
            SET route_to = $1,
                updated_at = now()
            WHERE id = $2
            "#,
        )
            .bind(route_to)
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn set_engagement_score(&self, id: Uuid, score: f64) -> Result<(), Error> {
        sqlx::query(
            r#"
            UPDATE complaints
            SET engagement_score = $1,
                updated_at = now()
            WHERE id = $2
            "#,
        )
            .bind(score)
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn escalate(&self, id: Uuid, engagement_score: f64) -> Result<(), Error> {
        sqlx::query(
            r#"
            UPDATE complaints
            SET severity = 'High',
                engagement_score = $1,
                updated_at = now()
            WHERE id = $2
            "#,
        )
            .bind(engagement_score)
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn resolution_samples(
        &self,
        severity: Severity,
        limit: i64,
    ) -> Result<Vec<ResolutionSample>, Error> {
        let rows = sqlx::query(
            r#"
            SELECT created_at, updated_at
            FROM complaints
            WHERE severity = $1
              AND status = 'resolved'
            LIMIT $2
            "#,
        )
            .bind(severity.to_string())
            .bind(limit)
            .fetch_all(&self.pool)
            .await?;

        rows.iter()
            .map(|r| {
                Ok(ResolutionSample {
                    created_at: r.try_get::<DateTime<Utc>, _>("created_at")?,
                    updated_at: r.try_get::<DateTime<Utc>, _>("updated_at")?,
                })
            })
            .collect()
    }

    async fn open_count_for_department(&self, route_to: &str) -> Result<i64, Error> {
        let row = sqlx::query(
            r#"
            SELECT COUNT(*) AS open_count
            FROM complaints
            WHERE route_to = $1
              AND status <> 'resolved'
            "#,
        )
            .bind(route_to)
            .fetch_one(&self.pool)
            .await?;

        Ok(row.try_get::<i64, _>("open_count")?)
    }

    async fn delete(&self, id: Uuid) -> Result<(), Error> {
        sqlx::query("DELETE FROM complaints WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}
