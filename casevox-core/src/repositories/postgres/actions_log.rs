// src/repositories/postgres/actions_log.rs

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{Pool, Postgres, Row};
use uuid::Uuid;

use crate::Error;
use crate::models::ActionLogEntry;

#[async_trait]
pub trait ActionsLogRepo: Send + Sync {
    async fn insert(&self, entry: &ActionLogEntry) -> Result<(), Error>;
    async fn list_for_complaint(&self, complaint_id: Uuid) -> Result<Vec<ActionLogEntry>, Error>;
}

#[derive(Clone)]
pub struct PostgresActionsLogRepository {
    pool: Pool<Postgres>,
}

impl PostgresActionsLogRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ActionsLogRepo for PostgresActionsLogRepository {
    async fn insert(&self, entry: &ActionLogEntry) -> Result<(), Error> {
        sqlx::query(
            r#"
            INSERT INTO actions_log (id, complaint_id, action_type, performed_by, notes, created_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
            .bind(entry.id)
            .bind(entry.complaint_id)
            .bind(&entry.action_type)
            .bind(entry.performed_by)
            .bind(&entry.notes)
            .bind(entry.created_at)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn list_for_complaint(
        &self,
        complaint_id: Uuid,
    ) -> Result<Vec<ActionLogEntry>, Error> {
        let rows = sqlx::query(
            r#"
            SELECT id, complaint_id, action_type, performed_by, notes, created_at
            FROM actions_log
            WHERE complaint_id = $1
            ORDER BY created_at DESC
            "#,
        )
            .bind(complaint_id)
            .fetch_all(&self.pool)
            .await?;

        rows.iter()
            .map(|r| {
                Ok(ActionLogEntry {
                    id: r.try_get("id")?,
                    complaint_id: r.try_get("complaint_id")?,
                    action_type: r.try_get("action_type")?,
                    performed_by: r.try_get("performed_by")?,
                    notes: r.try_get("notes")?,
                    created_at: r.try_get::<DateTime<Utc>, _>("created_at")?,
                })
            })
            .collect()
    }
}
