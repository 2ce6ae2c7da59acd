/// User model and database operations
///
/// This module provides the User model. Accounts originate at the external
/// identity provider; SiteDesk stores the synced profile, the user's global
/// role, and their company affiliation. Users are never hard-deleted, only
/// deactivated (`is_active = false`).
///
/// The global role is company-wide. Per-project roles live on
/// [`crate::models::membership::ProjectMember`] and are independent of it.
///
/// # Schema
///
/// ```sql
/// CREATE TYPE user_role AS ENUM ('admin', 'member', 'consultant', 'client', 'guest');
///
/// CREATE TABLE users (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     email VARCHAR(320) NOT NULL UNIQUE,
///     name VARCHAR(255),
///     role user_role NOT NULL DEFAULT 'member',
///     company_id UUID REFERENCES companies(id) ON DELETE SET NULL,
///     is_active BOOLEAN NOT NULL DEFAULT TRUE,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```
///
/// # Example
///
/// ```no_run
/// use sitedesk_shared::models::user::{User, CreateUser, GlobalRole};
/// use sitedesk_shared::db::pool::{create_pool, DatabaseConfig};
/// use uuid::Uuid;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let pool = create_pool(DatabaseConfig::default()).await?;
///
/// let user = User::create(&pool, CreateUser {
///     email: "jane@hartmann-blau.example".to_string(),
///     name: Some("Jane Hartmann".to_string()),
///     role: GlobalRole::Admin,
///     company_id: Some(Uuid::new_v4()),
/// }).await?;
/// # Ok(())
/// # }
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

/// Company-wide user role
///
/// Distinct from project-scoped roles: a global `admin` administers their
/// company, while a project `admin` administers a single project.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "user_role", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum GlobalRole {
    /// Company administrator; bypasses membership checks within their company
    Admin,

    /// Regular staff member
    Member,

    /// External consultant (structural engineers, surveyors, ...)
    Consultant,

    /// Client contact
    Client,

    /// Minimal access, no company affiliation expected
    Guest,
}

impl GlobalRole {
    /// Converts role to string for display
    pub fn as_str(&self) -> &'static str {
        match self {
            GlobalRole::Admin => "admin",
            GlobalRole::Member => "member",
            GlobalRole::Consultant => "consultant",
            GlobalRole::Client => "client",
            GlobalRole::Guest => "guest",
        }
    }

    /// Company administrators may manage company users and bypass
    /// project-membership checks within their own company
    pub fn is_admin(&self) -> bool {
        matches!(self, GlobalRole::Admin)
    }
}

/// User model
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct User {
    /// Unique user ID (UUID v4)
    pub id: Uuid,

    /// Email address, unique across all users
    pub email: String,

    /// Optional display name
    pub name: Option<String>,

    /// Company-wide role
    pub role: GlobalRole,

    /// Company affiliation; None for guests and not-yet-assigned accounts
    pub company_id: Option<Uuid>,

    /// Deactivation flag; inactive users cannot authenticate
    pub is_active: bool,

    /// When the account was created
    pub created_at: DateTime<Utc>,

    /// When the account was last updated
    pub updated_at: DateTime<Utc>,
}

/// Input for creating a new user
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateUser {
    /// Email address
    pub email: String,

    /// Optional display name
    pub name: Option<String>,

    /// Company-wide role (defaults to Member)
    #[serde(default = "default_role")]
    pub role: GlobalRole,

    /// Company affiliation
    pub company_id: Option<Uuid>,
}

fn default_role() -> GlobalRole {
    GlobalRole::Member
}

/// Input for updating a user
///
/// Only non-None fields are applied; this is the full allow-list of
/// mutable fields.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateUser {
    /// New display name
    pub name: Option<String>,

    /// New global role
    pub role: Option<GlobalRole>,

    /// Activate/deactivate the account
    pub is_active: Option<bool>,
}

impl User {
    /// Creates a new user
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Email already exists (unique constraint violation)
    /// - Database connection fails
    pub async fn create(pool: &PgPool, data: CreateUser) -> Result<Self, sqlx::Error> {
        let user = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (email, name, role, company_id)
            VALUES ($1, $2, $3, $4)
            RETURNING id, email, name, role, company_id, is_active, created_at, updated_at
            "#,
        )
        .bind(data.email)
        .bind(data.name)
        .bind(data.role)
        .bind(data.company_id)
        .fetch_one(pool)
        .await?;

        Ok(user)
    }

    /// Finds a user by ID
    pub async fn find(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, email, name, role, company_id, is_active, created_at, updated_at
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(user)
    }

    /// Finds a user by email
    pub async fn find_by_email(pool: &PgPool, email: &str) -> Result<Option<Self>, sqlx::Error> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, email, name, role, company_id, is_active, created_at, updated_at
            FROM users
            WHERE email = $1
            "#,
        )
        .bind(email)
        .fetch_optional(pool)
        .await?;

        Ok(user)
    }

    /// Applies a partial update
    ///
    /// Returns the updated user, or None if no row matched.
    pub async fn update(
        pool: &PgPool,
        id: Uuid,
        data: UpdateUser,
    ) -> Result<Option<Self>, sqlx::Error> {
        let user = sqlx::query_as::<_, User>(
            r#"
            UPDATE users
            SET name = COALESCE($2, name),
                role = COALESCE($3, role),
                is_active = COALESCE($4, is_active),
                updated_at = NOW()
            WHERE id = $1
            RETURNING id, email, name, role, company_id, is_active, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(data.name)
        .bind(data.role)
        .bind(data.is_active)
        .fetch_optional(pool)
        .await?;

        Ok(user)
    }

    /// Deactivates a user account
    ///
    /// Soft operation: the row stays for audit and FK integrity, the user
    /// just cannot act anymore.
    pub async fn deactivate(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE users SET is_active = FALSE, updated_at = NOW() WHERE id = $1 AND is_active",
        )
        .bind(id)
        .execute(pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Lists active users of a company
    pub async fn list_by_company(pool: &PgPool, company_id: Uuid) -> Result<Vec<Self>, sqlx::Error> {
        let users = sqlx::query_as::<_, User>(
            r#"
            SELECT id, email, name, role, company_id, is_active, created_at, updated_at
            FROM users
            WHERE company_id = $1 AND is_active
            ORDER BY created_at ASC
            "#,
        )
        .bind(company_id)
        .fetch_all(pool)
        .await?;

        Ok(users)
    }
}
