/// Subtask model: checklist items under a task
///
/// Subtasks have no project reference of their own; authorization goes
/// through the parent task.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

/// Subtask model
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Subtask {
    /// Unique subtask ID
    pub id: Uuid,

    /// Parent task
    pub task_id: Uuid,

    /// Checklist item text
    pub title: String,

    /// Done flag
    pub is_completed: bool,

    /// When the subtask was created
    pub created_at: DateTime<Utc>,

    /// When the subtask was last updated
    pub updated_at: DateTime<Utc>,
}

/// Input for creating a subtask
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateSubtask {
    /// Parent task
    pub task_id: Uuid,

    /// Checklist item text
    pub title: String,
}

/// Input for updating a subtask
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateSubtask {
    /// New text
    pub title: Option<String>,

    /// Toggle done flag
    pub is_completed: Option<bool>,
}

impl Subtask {
    /// Creates a subtask under a task
    pub async fn create(pool: &PgPool, data: CreateSubtask) -> Result<Self, sqlx::Error> {
        let subtask = sqlx::query_as::<_, Subtask>(
            r#"
            INSERT INTO subtasks (task_id, title)
            VALUES ($1, $2)
            RETURNING id, task_id, title, is_completed, created_at, updated_at
            "#,
        )
        .bind(data.task_id)
        .bind(data.title)
        .fetch_one(pool)
        .await?;

        Ok(subtask)
    }

    /// Finds a subtask by ID
    pub async fn find(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        let subtask = sqlx::query_as::<_, Subtask>(
            "SELECT id, task_id, title, is_completed, created_at, updated_at FROM subtasks WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(subtask)
    }

    /// Lists subtasks of a task, oldest first
    pub async fn list_by_task(pool: &PgPool, task_id: Uuid) -> Result<Vec<Self>, sqlx::Error> {
        let subtasks = sqlx::query_as::<_, Subtask>(
            r#"
            SELECT id, task_id, title, is_completed, created_at, updated_at
            FROM subtasks
            WHERE task_id = $1
            ORDER BY created_at ASC
            "#,
        )
        .bind(task_id)
        .fetch_all(pool)
        .await?;

        Ok(subtasks)
    }

    /// Applies a partial update
    pub async fn update(
        pool: &PgPool,
        id: Uuid,
        data: UpdateSubtask,
    ) -> Result<Option<Self>, sqlx::Error> {
        let subtask = sqlx::query_as::<_, Subtask>(
            r#"
            UPDATE subtasks
            SET title = COALESCE($2, title),
                is_completed = COALESCE($3, is_completed),
                updated_at = NOW()
            WHERE id = $1
            RETURNING id, task_id, title, is_completed, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(data.title)
        .bind(data.is_completed)
        .fetch_optional(pool)
        .await?;

        Ok(subtask)
    }

    /// Deletes a subtask
    pub async fn delete(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM subtasks WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
