/// Project membership model and database operations
///
/// This module provides the ProjectMember model for user-project
/// relationships with project-scoped RBAC. It implements a many-to-many
/// relationship between users and projects; the role here is independent of
/// the user's company-wide role.
///
/// Note that membership rows are not the only access path: project creators
/// and same-company administrators are allowed in without one (see
/// [`crate::auth::access`]).
///
/// # Schema
///
/// ```sql
/// CREATE TYPE project_role AS ENUM (
///     'owner', 'admin', 'manager', 'member', 'consultant', 'client', 'viewer'
/// );
///
/// CREATE TABLE project_members (
///     project_id UUID NOT NULL REFERENCES projects(id) ON DELETE CASCADE,
///     user_id UUID NOT NULL REFERENCES users(id) ON DELETE CASCADE,
///     role project_role NOT NULL DEFAULT 'member',
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     PRIMARY KEY (project_id, user_id)
/// );
/// ```
///
/// # Roles
///
/// - **owner**: full control over the project
/// - **admin**: full management rights, one step below owner
/// - **manager**: manage members, project fields, all work items
/// - **member**: day-to-day staff work (tasks, documents, approvals)
/// - **consultant**: external contributor, same write surface as member
/// - **client**: may read and post messages, no work-item writes
/// - **viewer**: read-only
///
/// # Example
///
/// ```no_run
/// use sitedesk_shared::models::membership::{ProjectMember, CreateProjectMember, ProjectRole};
/// use sitedesk_shared::db::pool::{create_pool, DatabaseConfig};
/// use uuid::Uuid;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let pool = create_pool(DatabaseConfig::default()).await?;
///
/// let member = ProjectMember::create(&pool, CreateProjectMember {
///     project_id: Uuid::new_v4(),
///     user_id: Uuid::new_v4(),
///     role: ProjectRole::Consultant,
/// }).await?;
/// # Ok(())
/// # }
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

/// Project-scoped RBAC role
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "project_role", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum ProjectRole {
    /// Full control, may delete the project
    Owner,

    /// Everything except deleting the project
    Admin,

    /// Manages members, project fields, and all work items
    Manager,

    /// Regular staff contributor
    Member,

    /// External contributor
    Consultant,

    /// Client contact; reads and messages only
    Client,

    /// Read-only access
    Viewer,
}

impl ProjectRole {
    /// Converts role to string for display
    pub fn as_str(&self) -> &'static str {
        match self {
            ProjectRole::Owner => "owner",
            ProjectRole::Admin => "admin",
            ProjectRole::Manager => "manager",
            ProjectRole::Member => "member",
            ProjectRole::Consultant => "consultant",
            ProjectRole::Client => "client",
            ProjectRole::Viewer => "viewer",
        }
    }

    /// May mutate project fields, membership, and project lifecycle
    ///
    /// This is the second authorization tier on top of mere access: only
    /// owners, admins, and managers pass.
    pub fn can_manage_project(&self) -> bool {
        matches!(self, ProjectRole::Owner | ProjectRole::Admin | ProjectRole::Manager)
    }

    /// May create/update work items (tasks, documents, approvals)
    pub fn can_contribute(&self) -> bool {
        !matches!(self, ProjectRole::Client | ProjectRole::Viewer)
    }

    /// May post to the project message board
    pub fn can_comment(&self) -> bool {
        !matches!(self, ProjectRole::Viewer)
    }

    /// Checks if this role has the permission level of the required role
    ///
    /// Hierarchy: Owner > Admin > Manager > Member > Consultant > Client > Viewer
    pub fn has_permission(&self, required: &ProjectRole) -> bool {
        self.permission_level() >= required.permission_level()
    }

    /// Returns numeric permission level for comparison
    pub(crate) fn permission_level(&self) -> u8 {
        match self {
            ProjectRole::Owner => 7,
            ProjectRole::Admin => 6,
            ProjectRole::Manager => 5,
            ProjectRole::Member => 4,
            ProjectRole::Consultant => 3,
            ProjectRole::Client => 2,
            ProjectRole::Viewer => 1,
        }
    }
}

/// Membership row linking a user to a project with a role
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct ProjectMember {
    /// Project ID
    pub project_id: Uuid,

    /// User ID
    pub user_id: Uuid,

    /// Role within the project
    pub role: ProjectRole,

    /// When the membership was created
    pub created_at: DateTime<Utc>,
}

/// Membership row joined with user details, for member listings
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct ProjectMemberWithUser {
    /// Project ID
    pub project_id: Uuid,

    /// User ID
    pub user_id: Uuid,

    /// Role within the project
    pub role: ProjectRole,

    /// When the membership was created
    pub created_at: DateTime<Utc>,

    /// Member's email
    pub email: String,

    /// Member's display name
    pub name: Option<String>,
}

/// Input for creating a new membership
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateProjectMember {
    /// Project ID
    pub project_id: Uuid,

    /// User ID
    pub user_id: Uuid,

    /// Role to assign (defaults to Member)
    #[serde(default = "default_role")]
    pub role: ProjectRole,
}

fn default_role() -> ProjectRole {
    ProjectRole::Member
}

impl ProjectMember {
    /// Creates a new membership (adds a user to a project)
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Membership already exists (unique constraint violation)
    /// - Project or user doesn't exist (foreign key violation)
    /// - Database connection fails
    pub async fn create(pool: &PgPool, data: CreateProjectMember) -> Result<Self, sqlx::Error> {
        let member = sqlx::query_as::<_, ProjectMember>(
            r#"
            INSERT INTO project_members (project_id, user_id, role)
            VALUES ($1, $2, $3)
            RETURNING project_id, user_id, role, created_at
            "#,
        )
        .bind(data.project_id)
        .bind(data.user_id)
        .bind(data.role)
        .fetch_one(pool)
        .await?;

        Ok(member)
    }

    /// Finds a specific membership
    pub async fn find(
        pool: &PgPool,
        project_id: Uuid,
        user_id: Uuid,
    ) -> Result<Option<Self>, sqlx::Error> {
        let member = sqlx::query_as::<_, ProjectMember>(
            r#"
            SELECT project_id, user_id, role, created_at
            FROM project_members
            WHERE project_id = $1 AND user_id = $2
            "#,
        )
        .bind(project_id)
        .bind(user_id)
        .fetch_optional(pool)
        .await?;

        Ok(member)
    }

    /// Gets a user's membership role in a project, if any
    pub async fn get_role(
        pool: &PgPool,
        project_id: Uuid,
        user_id: Uuid,
    ) -> Result<Option<ProjectRole>, sqlx::Error> {
        let role: Option<ProjectRole> = sqlx::query_scalar(
            r#"
            SELECT role FROM project_members
            WHERE project_id = $1 AND user_id = $2
            "#,
        )
        .bind(project_id)
        .bind(user_id)
        .fetch_optional(pool)
        .await?;

        Ok(role)
    }

    /// Updates a member's role
    ///
    /// Returns the updated membership, or None if no row matched.
    pub async fn update_role(
        pool: &PgPool,
        project_id: Uuid,
        user_id: Uuid,
        role: ProjectRole,
    ) -> Result<Option<Self>, sqlx::Error> {
        let member = sqlx::query_as::<_, ProjectMember>(
            r#"
            UPDATE project_members
            SET role = $3
            WHERE project_id = $1 AND user_id = $2
            RETURNING project_id, user_id, role, created_at
            "#,
        )
        .bind(project_id)
        .bind(user_id)
        .bind(role)
        .fetch_optional(pool)
        .await?;

        Ok(member)
    }

    /// Removes a user from a project
    pub async fn delete(pool: &PgPool, project_id: Uuid, user_id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "DELETE FROM project_members WHERE project_id = $1 AND user_id = $2",
        )
        .bind(project_id)
        .bind(user_id)
        .execute(pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Lists all members of a project with user details
    pub async fn list_by_project(
        pool: &PgPool,
        project_id: Uuid,
    ) -> Result<Vec<ProjectMemberWithUser>, sqlx::Error> {
        let members = sqlx::query_as::<_, ProjectMemberWithUser>(
            r#"
            SELECT m.project_id, m.user_id, m.role, m.created_at, u.email, u.name
            FROM project_members m
            JOIN users u ON u.id = m.user_id
            WHERE m.project_id = $1
            ORDER BY m.created_at ASC
            "#,
        )
        .bind(project_id)
        .fetch_all(pool)
        .await?;

        Ok(members)
    }

    /// Lists the user IDs of a project's members
    ///
    /// Used by the notification dispatcher to fan out project-wide events.
    pub async fn list_user_ids(pool: &PgPool, project_id: Uuid) -> Result<Vec<Uuid>, sqlx::Error> {
        let ids: Vec<Uuid> = sqlx::query_scalar(
            "SELECT user_id FROM project_members WHERE project_id = $1",
        )
        .bind(project_id)
        .fetch_all(pool)
        .await?;

        Ok(ids)
    }
}
