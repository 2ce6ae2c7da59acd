/// Project model and database operations
///
/// Projects are the central entity of SiteDesk: documents, tasks, approvals,
/// and messages all hang off a project. A project belongs to exactly one
/// company and records its creator; the creator has implicit ownership even
/// without a membership row (see [`crate::auth::access`]).
///
/// # Schema
///
/// ```sql
/// CREATE TYPE project_status AS ENUM ('planning', 'active', 'on_hold', 'completed', 'cancelled');
///
/// CREATE TABLE projects (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     company_id UUID NOT NULL REFERENCES companies(id) ON DELETE CASCADE,
///     created_by UUID REFERENCES users(id) ON DELETE SET NULL,
///     name VARCHAR(255) NOT NULL,
///     description TEXT,
///     address VARCHAR(512),
///     status project_status NOT NULL DEFAULT 'planning',
///     start_date DATE,
///     end_date DATE,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

use crate::auth::identity::Identity;

/// Project lifecycle status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "project_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum ProjectStatus {
    /// Pre-construction planning and permitting
    Planning,

    /// Construction underway
    Active,

    /// Paused (funding, permits, weather)
    OnHold,

    /// Delivered
    Completed,

    /// Abandoned
    Cancelled,
}

impl ProjectStatus {
    /// Converts status to string for display
    pub fn as_str(&self) -> &'static str {
        match self {
            ProjectStatus::Planning => "planning",
            ProjectStatus::Active => "active",
            ProjectStatus::OnHold => "on_hold",
            ProjectStatus::Completed => "completed",
            ProjectStatus::Cancelled => "cancelled",
        }
    }

    /// Terminal statuses accept no further work
    pub fn is_terminal(&self) -> bool {
        matches!(self, ProjectStatus::Completed | ProjectStatus::Cancelled)
    }
}

/// Project model
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Project {
    /// Unique project ID
    pub id: Uuid,

    /// Owning company (tenant boundary)
    pub company_id: Uuid,

    /// Creator; None if the account was since removed
    pub created_by: Option<Uuid>,

    /// Project name
    pub name: String,

    /// Free-form description
    pub description: Option<String>,

    /// Site address
    pub address: Option<String>,

    /// Lifecycle status
    pub status: ProjectStatus,

    /// Planned construction start
    pub start_date: Option<NaiveDate>,

    /// Planned completion
    pub end_date: Option<NaiveDate>,

    /// When the project was created
    pub created_at: DateTime<Utc>,

    /// When the project was last updated
    pub updated_at: DateTime<Utc>,
}

/// Input for creating a new project
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateProject {
    /// Owning company
    pub company_id: Uuid,

    /// Creator
    pub created_by: Option<Uuid>,

    /// Project name
    pub name: String,

    /// Free-form description
    pub description: Option<String>,

    /// Site address
    pub address: Option<String>,

    /// Initial status (defaults to Planning)
    #[serde(default = "default_status")]
    pub status: ProjectStatus,

    /// Planned construction start
    pub start_date: Option<NaiveDate>,

    /// Planned completion
    pub end_date: Option<NaiveDate>,
}

fn default_status() -> ProjectStatus {
    ProjectStatus::Planning
}

/// Input for updating a project
///
/// The allow-list of mutable fields; anything else on the row is immutable
/// through the API.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateProject {
    /// New name
    pub name: Option<String>,

    /// New description
    pub description: Option<String>,

    /// New site address
    pub address: Option<String>,

    /// New lifecycle status
    pub status: Option<ProjectStatus>,

    /// New planned start
    pub start_date: Option<NaiveDate>,

    /// New planned completion
    pub end_date: Option<NaiveDate>,
}

impl Project {
    /// Creates a new project
    ///
    /// No membership row is written for the creator; creator access is
    /// implicit (see [`crate::auth::access::evaluate`]).
    pub async fn create(pool: &PgPool, data: CreateProject) -> Result<Self, sqlx::Error> {
        let project = sqlx::query_as::<_, Project>(
            r#"
            INSERT INTO projects (company_id, created_by, name, description, address, status, start_date, end_date)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING id, company_id, created_by, name, description, address, status,
                      start_date, end_date, created_at, updated_at
            "#,
        )
        .bind(data.company_id)
        .bind(data.created_by)
        .bind(data.name)
        .bind(data.description)
        .bind(data.address)
        .bind(data.status)
        .bind(data.start_date)
        .bind(data.end_date)
        .fetch_one(pool)
        .await?;

        Ok(project)
    }

    /// Finds a project by ID
    pub async fn find(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        let project = sqlx::query_as::<_, Project>(
            r#"
            SELECT id, company_id, created_by, name, description, address, status,
                   start_date, end_date, created_at, updated_at
            FROM projects
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(project)
    }

    /// Lists every project the identity can access
    ///
    /// The predicate mirrors [`crate::auth::access::evaluate`]: membership
    /// row, creatorship, or same-company admin bypass. Keep the two in sync.
    pub async fn list_accessible(pool: &PgPool, identity: &Identity) -> Result<Vec<Self>, sqlx::Error> {
        let admin_company = if identity.global_role.is_admin() {
            identity.company_id
        } else {
            None
        };

        let projects = sqlx::query_as::<_, Project>(
            r#"
            SELECT p.id, p.company_id, p.created_by, p.name, p.description, p.address, p.status,
                   p.start_date, p.end_date, p.created_at, p.updated_at
            FROM projects p
            WHERE p.id IN (SELECT project_id FROM project_members WHERE user_id = $1)
               OR p.created_by = $1
               OR p.company_id = $2
            ORDER BY p.created_at DESC
            "#,
        )
        .bind(identity.user_id)
        .bind(admin_company)
        .fetch_all(pool)
        .await?;

        Ok(projects)
    }

    /// Applies a partial update
    ///
    /// Returns the updated project, or None if no row matched. Authorization
    /// (manage tier) happens in the handler before this is called.
    pub async fn update(
        pool: &PgPool,
        id: Uuid,
        data: UpdateProject,
    ) -> Result<Option<Self>, sqlx::Error> {
        let project = sqlx::query_as::<_, Project>(
            r#"
            UPDATE projects
            SET name = COALESCE($2, name),
                description = COALESCE($3, description),
                address = COALESCE($4, address),
                status = COALESCE($5, status),
                start_date = COALESCE($6, start_date),
                end_date = COALESCE($7, end_date),
                updated_at = NOW()
            WHERE id = $1
            RETURNING id, company_id, created_by, name, description, address, status,
                      start_date, end_date, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(data.name)
        .bind(data.description)
        .bind(data.address)
        .bind(data.status)
        .bind(data.start_date)
        .bind(data.end_date)
        .fetch_optional(pool)
        .await?;

        Ok(project)
    }

    /// Deletes a project and everything under it (FK cascade)
    pub async fn delete(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM projects WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_as_str() {
        assert_eq!(ProjectStatus::Planning.as_str(), "planning");
        assert_eq!(ProjectStatus::OnHold.as_str(), "on_hold");
        assert_eq!(ProjectStatus::Cancelled.as_str(), "cancelled");
    }

    #[test]
    fn test_terminal_statuses() {
        assert!(ProjectStatus::Completed.is_terminal());
        assert!(ProjectStatus::Cancelled.is_terminal());
        assert!(!ProjectStatus::Planning.is_terminal());
        assert!(!ProjectStatus::Active.is_terminal());
        assert!(!ProjectStatus::OnHold.is_terminal());
    }

    #[test]
    fn test_create_project_default_status() {
        assert_eq!(default_status(), ProjectStatus::Planning);
    }
}
