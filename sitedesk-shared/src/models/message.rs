/// Project message board model
///
/// Messages are plain project-scoped posts. Mentioned users are stored as a
/// UUID array; the handler filters them to actual project members before
/// notification dispatch.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE messages (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     project_id UUID NOT NULL REFERENCES projects(id) ON DELETE CASCADE,
///     sender_id UUID REFERENCES users(id) ON DELETE SET NULL,
///     body TEXT NOT NULL,
///     mentions UUID[] NOT NULL DEFAULT '{}',
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

/// Message model
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Message {
    /// Unique message ID
    pub id: Uuid,

    /// Project message board this belongs to
    pub project_id: Uuid,

    /// Author; None if the account was since removed
    pub sender_id: Option<Uuid>,

    /// Message text
    pub body: String,

    /// Mentioned user IDs
    pub mentions: Vec<Uuid>,

    /// When the message was posted
    pub created_at: DateTime<Utc>,
}

/// Input for posting a message
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateMessage {
    /// Project message board
    pub project_id: Uuid,

    /// Author
    pub sender_id: Option<Uuid>,

    /// Message text
    pub body: String,

    /// Mentioned user IDs
    #[serde(default)]
    pub mentions: Vec<Uuid>,
}

impl Message {
    /// Posts a message
    pub async fn create(pool: &PgPool, data: CreateMessage) -> Result<Self, sqlx::Error> {
        let message = sqlx::query_as::<_, Message>(
            r#"
            INSERT INTO messages (project_id, sender_id, body, mentions)
            VALUES ($1, $2, $3, $4)
            RETURNING id, project_id, sender_id, body, mentions, created_at
            "#,
        )
        .bind(data.project_id)
        .bind(data.sender_id)
        .bind(data.body)
        .bind(&data.mentions)
        .fetch_one(pool)
        .await?;

        Ok(message)
    }

    /// Finds a message by ID
    pub async fn find(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        let message = sqlx::query_as::<_, Message>(
            "SELECT id, project_id, sender_id, body, mentions, created_at FROM messages WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(message)
    }

    /// Lists messages of a project, newest first
    pub async fn list_by_project(
        pool: &PgPool,
        project_id: Uuid,
        limit: i64,
    ) -> Result<Vec<Self>, sqlx::Error> {
        let messages = sqlx::query_as::<_, Message>(
            r#"
            SELECT id, project_id, sender_id, body, mentions, created_at
            FROM messages
            WHERE project_id = $1
            ORDER BY created_at DESC
            LIMIT $2
            "#,
        )
        .bind(project_id)
        .bind(limit)
        .fetch_all(pool)
        .await?;

        Ok(messages)
    }

    /// Deletes a message
    pub async fn delete(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM messages WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
