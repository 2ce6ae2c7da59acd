/// Notification model and per-user email preferences
///
/// In-app notifications are plain rows the client polls; the email leg is
/// handled separately by [`crate::notify`]. Preferences are stored one row
/// per user; a missing row means everything enabled, and lookups must
/// tolerate absence (a user who never touched their settings still gets
/// notified).
///
/// # Schema
///
/// ```sql
/// CREATE TYPE notification_kind AS ENUM (
///     'task_assigned', 'document_uploaded', 'mention', 'approval_status'
/// );
///
/// CREATE TABLE notifications (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     user_id UUID NOT NULL REFERENCES users(id) ON DELETE CASCADE,
///     kind notification_kind NOT NULL,
///     title VARCHAR(255) NOT NULL,
///     body TEXT,
///     project_id UUID REFERENCES projects(id) ON DELETE CASCADE,
///     is_read BOOLEAN NOT NULL DEFAULT FALSE,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
///
/// CREATE TABLE notification_preferences (
///     user_id UUID PRIMARY KEY REFERENCES users(id) ON DELETE CASCADE,
///     email_task_assigned BOOLEAN NOT NULL DEFAULT TRUE,
///     email_document_uploaded BOOLEAN NOT NULL DEFAULT TRUE,
///     email_mentions BOOLEAN NOT NULL DEFAULT TRUE,
///     email_approvals BOOLEAN NOT NULL DEFAULT TRUE,
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

/// What triggered a notification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "notification_kind", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    /// A task was assigned to the user
    TaskAssigned,

    /// A document was uploaded to one of the user's projects
    DocumentUploaded,

    /// The user was mentioned in a message
    Mention,

    /// A city approval changed status
    ApprovalStatus,
}

impl NotificationKind {
    /// Converts kind to string for display
    pub fn as_str(&self) -> &'static str {
        match self {
            NotificationKind::TaskAssigned => "task_assigned",
            NotificationKind::DocumentUploaded => "document_uploaded",
            NotificationKind::Mention => "mention",
            NotificationKind::ApprovalStatus => "approval_status",
        }
    }
}

/// In-app notification row
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Notification {
    /// Unique notification ID
    pub id: Uuid,

    /// Recipient
    pub user_id: Uuid,

    /// What triggered this
    pub kind: NotificationKind,

    /// Short headline
    pub title: String,

    /// Longer text
    pub body: Option<String>,

    /// Related project, for client-side linking
    pub project_id: Option<Uuid>,

    /// Read flag
    pub is_read: bool,

    /// When the notification was created
    pub created_at: DateTime<Utc>,
}

/// Input for creating a notification
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateNotification {
    /// Recipient
    pub user_id: Uuid,

    /// What triggered this
    pub kind: NotificationKind,

    /// Short headline
    pub title: String,

    /// Longer text
    pub body: Option<String>,

    /// Related project
    pub project_id: Option<Uuid>,
}

impl Notification {
    /// Creates a notification row
    pub async fn create(pool: &PgPool, data: CreateNotification) -> Result<Self, sqlx::Error> {
        let notification = sqlx::query_as::<_, Notification>(
            r#"
            INSERT INTO notifications (user_id, kind, title, body, project_id)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, user_id, kind, title, body, project_id, is_read, created_at
            "#,
        )
        .bind(data.user_id)
        .bind(data.kind)
        .bind(data.title)
        .bind(data.body)
        .bind(data.project_id)
        .fetch_one(pool)
        .await?;

        Ok(notification)
    }

    /// Finds a notification by ID
    pub async fn find(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        let notification = sqlx::query_as::<_, Notification>(
            "SELECT id, user_id, kind, title, body, project_id, is_read, created_at FROM notifications WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(notification)
    }

    /// Lists a user's notifications, newest first
    pub async fn list_by_user(
        pool: &PgPool,
        user_id: Uuid,
        unread_only: bool,
        limit: i64,
    ) -> Result<Vec<Self>, sqlx::Error> {
        let notifications = sqlx::query_as::<_, Notification>(
            r#"
            SELECT id, user_id, kind, title, body, project_id, is_read, created_at
            FROM notifications
            WHERE user_id = $1 AND (NOT $2 OR NOT is_read)
            ORDER BY created_at DESC
            LIMIT $3
            "#,
        )
        .bind(user_id)
        .bind(unread_only)
        .bind(limit)
        .fetch_all(pool)
        .await?;

        Ok(notifications)
    }

    /// Counts a user's unread notifications
    pub async fn count_unread(pool: &PgPool, user_id: Uuid) -> Result<i64, sqlx::Error> {
        let (count,): (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM notifications WHERE user_id = $1 AND NOT is_read",
        )
        .bind(user_id)
        .fetch_one(pool)
        .await?;

        Ok(count)
    }

    /// Marks a notification read
    pub async fn mark_read(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        let notification = sqlx::query_as::<_, Notification>(
            r#"
            UPDATE notifications
            SET is_read = TRUE
            WHERE id = $1
            RETURNING id, user_id, kind, title, body, project_id, is_read, created_at
            "#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(notification)
    }

    /// Marks all of a user's notifications read, returns the count
    pub async fn mark_all_read(pool: &PgPool, user_id: Uuid) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE notifications SET is_read = TRUE WHERE user_id = $1 AND NOT is_read",
        )
        .bind(user_id)
        .execute(pool)
        .await?;

        Ok(result.rows_affected())
    }

    /// Deletes a notification
    pub async fn delete(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM notifications WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

/// Per-user email opt-outs
///
/// `Default` matches the schema defaults and stands in for a missing row.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct NotificationPreferences {
    /// Owner of these preferences
    pub user_id: Uuid,

    /// Email on task assignment
    pub email_task_assigned: bool,

    /// Email on document upload
    pub email_document_uploaded: bool,

    /// Email on mention
    pub email_mentions: bool,

    /// Email on approval status change
    pub email_approvals: bool,

    /// Last change
    pub updated_at: DateTime<Utc>,
}

impl NotificationPreferences {
    /// Defaults for a user without a stored row: everything enabled
    pub fn defaults_for(user_id: Uuid) -> Self {
        Self {
            user_id,
            email_task_assigned: true,
            email_document_uploaded: true,
            email_mentions: true,
            email_approvals: true,
            updated_at: Utc::now(),
        }
    }

    /// Whether email is enabled for the given notification kind
    pub fn email_enabled(&self, kind: NotificationKind) -> bool {
        match kind {
            NotificationKind::TaskAssigned => self.email_task_assigned,
            NotificationKind::DocumentUploaded => self.email_document_uploaded,
            NotificationKind::Mention => self.email_mentions,
            NotificationKind::ApprovalStatus => self.email_approvals,
        }
    }

    /// Loads a user's preferences, falling back to defaults when no row
    /// exists
    pub async fn find_or_default(pool: &PgPool, user_id: Uuid) -> Result<Self, sqlx::Error> {
        let prefs = sqlx::query_as::<_, NotificationPreferences>(
            r#"
            SELECT user_id, email_task_assigned, email_document_uploaded,
                   email_mentions, email_approvals, updated_at
            FROM notification_preferences
            WHERE user_id = $1
            "#,
        )
        .bind(user_id)
        .fetch_optional(pool)
        .await?;

        Ok(prefs.unwrap_or_else(|| Self::defaults_for(user_id)))
    }

    /// Upserts a user's preferences
    pub async fn upsert(
        pool: &PgPool,
        user_id: Uuid,
        task_assigned: bool,
        document_uploaded: bool,
        mentions: bool,
        approvals: bool,
    ) -> Result<Self, sqlx::Error> {
        let prefs = sqlx::query_as::<_, NotificationPreferences>(
            r#"
            INSERT INTO notification_preferences
                (user_id, email_task_assigned, email_document_uploaded, email_mentions, email_approvals)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (user_id) DO UPDATE
            SET email_task_assigned = EXCLUDED.email_task_assigned,
                email_document_uploaded = EXCLUDED.email_document_uploaded,
                email_mentions = EXCLUDED.email_mentions,
                email_approvals = EXCLUDED.email_approvals,
                updated_at = NOW()
            RETURNING user_id, email_task_assigned, email_document_uploaded,
                      email_mentions, email_approvals, updated_at
            "#,
        )
        .bind(user_id)
        .bind(task_assigned)
        .bind(document_uploaded)
        .bind(mentions)
        .bind(approvals)
        .fetch_one(pool)
        .await?;

        Ok(prefs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_as_str() {
        assert_eq!(NotificationKind::TaskAssigned.as_str(), "task_assigned");
        assert_eq!(NotificationKind::Mention.as_str(), "mention");
    }

    #[test]
    fn test_default_preferences_allow_everything() {
        let prefs = NotificationPreferences::defaults_for(Uuid::new_v4());
        assert!(prefs.email_enabled(NotificationKind::TaskAssigned));
        assert!(prefs.email_enabled(NotificationKind::DocumentUploaded));
        assert!(prefs.email_enabled(NotificationKind::Mention));
        assert!(prefs.email_enabled(NotificationKind::ApprovalStatus));
    }
}
