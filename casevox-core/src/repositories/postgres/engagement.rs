// src/repositories/postgres/engagement.rs

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{Pool, Postgres, Row};
use uuid::Uuid;

use crate::Error;
use crate::models::{ActionType, EngagementEvent};

#[async_trait]
pub trait EngagementRepo: Send + Sync {
    /// The id of this user's like row on the complaint, if one exists.
    async fn find_like(&self, complaint_id: Uuid, user_id: Uuid) -> Result<Option<Uuid>, Error>;
    async fn insert_like(&self, complaint_id: Uuid, user_id: Uuid) -> Result<EngagementEvent, Error>;
    async fn insert_comment(
        &self,
        complaint_id: Uuid,
        user_id: Uuid,
        comment_text: &str,
    ) -> Result<EngagementEvent, Error>;
    async fn delete(&self, event_id: Uuid) -> Result<(), Error>;
    async fn count(&self, complaint_id: Uuid, action_type: ActionType) -> Result<i64, Error>;
    /// Comments newest-first.
    async fn comments(&self, complaint_id: Uuid) -> Result<Vec<EngagementEvent>, Error>;
}

#[derive(Clone)]
pub struct PostgresEngagementRepository {
    pool: Pool<Postgres>,
}

impl PostgresEngagementRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    fn row_to_event(r: &sqlx::postgres::PgRow) -> Result<EngagementEvent, Error> {
        let action_type: String = r.try_get("action_type")?;
        Ok(EngagementEvent {
            id: r.try_get("id")?,
            complaint_id: r.try_get("complaint_id")?,
            user_id: r.try_get("user_id")?,
            action_type: action_type
                .parse::<ActionType>()
                .map_err(Error::Parse)?,
            comment_text: r.try_get("comment_text")?,
            created_at: r.try_get::<DateTime<Utc>, _>("created_at")?,
        })
    }
}

#[async_trait]
impl EngagementRepo for PostgresEngagementRepository {
    async fn find_like(&self, complaint_id: Uuid, user_id: Uuid) -> Result<Option<Uuid>, Error> {
        let row = sqlx::query(
            r#"
            SELECT id
            FROM complaint_engagement
            WHERE complaint_id = $1
              AND user_id = $2
              AND action_type = 'like'
            "#,
        )
            .bind(complaint_id)
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?;

        match row {
            Some(r) => Ok(Some(r.try_get("id")?)),
            None => Ok(None),
        }
    }

    async fn insert_like(
        &self,
        complaint_id: Uuid,
        user_id: Uuid,
    ) -> Result<EngagementEvent, Error> {
        let row = sqlx::query(
            r#"
            INSERT INTO complaint_engagement (id, complaint_id, user_id, action_type)
            VALUES ($1, $2, $3, 'like')
            RETURNING id, complaint_id, user_id, action_type, comment_text, created_at
            "#,
        )
            .bind(Uuid::new_v4())
            .bind(complaint_id)
            .bind(user_id)
            .fetch_one(&self.pool)
            .await?;

        Self::row_to_event(&row)
    }

    async fn insert_comment(
        &self,
        complaint_id: Uuid,
        user_id: Uuid,
        comment_text: &str,
    ) -> Result<EngagementEvent, Error> {
        let row = sqlx::query(
            r#"
            INSERT INTO complaint_engagement (id, complaint_id, user_id, action_type, comment_text)
            VALUES ($1, $2, $3, 'comment', $4)
            RETURNING id, complaint_id, user_id, action_type, comment_text, created_at
            "#,
        )
            .bind(Uuid::new_v4())
            .bind(complaint_id)
            .bind(user_id)
            .bind(comment_text)
            .fetch_one(&self.pool)
            .await?;

        Self::row_to_event(&row)
    }

    async fn delete(&self, event_id: Uuid) -> Result<(), Error> {
        sqlx::query("DELETE FROM complaint_engagement WHERE id = $1")
            .bind(event_id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn count(&self, complaint_id: Uuid, action_type: ActionType) -> Result<i64, Error> {
        let row = sqlx::query(
            r#"
            SELECT COUNT(*) AS event_count
            FROM complaint_engagement
            WHERE complaint_id = $1
              AND action_type = $2
            "#,
        )
            .bind(complaint_id)
            .bind(action_type.to_string())
            .fetch_one(&self.pool)
            .await?;

        Ok(row.try_get::<i64, _>("event_count")?)
    }

    async fn comments(&self, complaint_id: Uuid) -> Result<Vec<EngagementEvent>, Error> {
        let rows = sqlx::query(
            r#"
            SELECT id, complaint_id, user_id, action_type, comment_text, created_at
            FROM complaint_engagement
            WHERE complaint_id = $1
              AND action_type = 'comment'
            ORDER BY created_at DESC
            "#,
        )
            .bind(complaint_id)
            .fetch_all(&self.pool)
            .await?;

        rows.iter().map(Self::row_to_event).collect()
    }
}
