/// City-approval workflow models
///
/// A city approval tracks one permit application (building permit, fire
/// safety, zoning variance, ...) through the municipal review process.
/// Reviewers may attach corrections that must be resolved before
/// resubmission.
///
/// # State Machine
///
/// ```text
/// pending → submitted → in_review → approved
///                                 → rejected
///                                 → corrections_required → submitted
/// ```
///
/// # Schema
///
/// ```sql
/// CREATE TYPE approval_status AS ENUM (
///     'pending', 'submitted', 'in_review', 'corrections_required', 'approved', 'rejected'
/// );
///
/// CREATE TABLE city_approvals (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     project_id UUID NOT NULL REFERENCES projects(id) ON DELETE CASCADE,
///     approval_type VARCHAR(255) NOT NULL,
///     reference_number VARCHAR(100),
///     status approval_status NOT NULL DEFAULT 'pending',
///     notes TEXT,
///     submitted_at TIMESTAMPTZ,
///     decided_at TIMESTAMPTZ,
///     created_by UUID REFERENCES users(id) ON DELETE SET NULL,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
///
/// CREATE TYPE correction_status AS ENUM ('open', 'resolved');
///
/// CREATE TABLE corrections (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     city_approval_id UUID NOT NULL REFERENCES city_approvals(id) ON DELETE CASCADE,
///     description TEXT NOT NULL,
///     status correction_status NOT NULL DEFAULT 'open',
///     resolved_at TIMESTAMPTZ,
///     created_by UUID REFERENCES users(id) ON DELETE SET NULL,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

/// Municipal review status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "approval_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum ApprovalStatus {
    /// Being prepared, not yet filed
    Pending,

    /// Filed with the city
    Submitted,

    /// Under municipal review
    InReview,

    /// Reviewer requested corrections
    CorrectionsRequired,

    /// Permit granted
    Approved,

    /// Permit denied
    Rejected,
}

impl ApprovalStatus {
    /// Converts status to string for display
    pub fn as_str(&self) -> &'static str {
        match self {
            ApprovalStatus::Pending => "pending",
            ApprovalStatus::Submitted => "submitted",
            ApprovalStatus::InReview => "in_review",
            ApprovalStatus::CorrectionsRequired => "corrections_required",
            ApprovalStatus::Approved => "approved",
            ApprovalStatus::Rejected => "rejected",
        }
    }

    /// A decision has been made
    pub fn is_decided(&self) -> bool {
        matches!(self, ApprovalStatus::Approved | ApprovalStatus::Rejected)
    }
}

/// City approval model
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct CityApproval {
    /// Unique approval ID
    pub id: Uuid,

    /// Project being permitted
    pub project_id: Uuid,

    /// Kind of permit ("building permit", "fire safety", ...)
    pub approval_type: String,

    /// Municipal file/reference number once assigned
    pub reference_number: Option<String>,

    /// Review status
    pub status: ApprovalStatus,

    /// Free-form notes
    pub notes: Option<String>,

    /// When the application was filed
    pub submitted_at: Option<DateTime<Utc>>,

    /// When the city decided (approved or rejected)
    pub decided_at: Option<DateTime<Utc>>,

    /// Creator
    pub created_by: Option<Uuid>,

    /// When the record was created
    pub created_at: DateTime<Utc>,

    /// When the record was last updated
    pub updated_at: DateTime<Utc>,
}

/// Input for creating a city approval
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateCityApproval {
    /// Project being permitted
    pub project_id: Uuid,

    /// Kind of permit
    pub approval_type: String,

    /// Municipal reference number, if already known
    pub reference_number: Option<String>,

    /// Free-form notes
    pub notes: Option<String>,

    /// Creator
    pub created_by: Option<Uuid>,
}

/// Input for updating a city approval (allow-listed fields)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateCityApproval {
    /// New status; `submitted_at`/`decided_at` are stamped on the matching
    /// transitions by [`CityApproval::update`]
    pub status: Option<ApprovalStatus>,

    /// New reference number
    pub reference_number: Option<String>,

    /// New notes
    pub notes: Option<String>,
}

impl CityApproval {
    /// Creates a city approval in `pending` status
    pub async fn create(pool: &PgPool, data: CreateCityApproval) -> Result<Self, sqlx::Error> {
        let approval = sqlx::query_as::<_, CityApproval>(
            r#"
            INSERT INTO city_approvals (project_id, approval_type, reference_number, notes, created_by)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, project_id, approval_type, reference_number, status, notes,
                      submitted_at, decided_at, created_by, created_at, updated_at
            "#,
        )
        .bind(data.project_id)
        .bind(data.approval_type)
        .bind(data.reference_number)
        .bind(data.notes)
        .bind(data.created_by)
        .fetch_one(pool)
        .await?;

        Ok(approval)
    }

    /// Finds an approval by ID
    pub async fn find(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        let approval = sqlx::query_as::<_, CityApproval>(
            r#"
            SELECT id, project_id, approval_type, reference_number, status, notes,
                   submitted_at, decided_at, created_by, created_at, updated_at
            FROM city_approvals
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(approval)
    }

    /// Lists approvals of a project, newest first
    pub async fn list_by_project(pool: &PgPool, project_id: Uuid) -> Result<Vec<Self>, sqlx::Error> {
        let approvals = sqlx::query_as::<_, CityApproval>(
            r#"
            SELECT id, project_id, approval_type, reference_number, status, notes,
                   submitted_at, decided_at, created_by, created_at, updated_at
            FROM city_approvals
            WHERE project_id = $1
            ORDER BY created_at DESC
            "#,
        )
        .bind(project_id)
        .fetch_all(pool)
        .await?;

        Ok(approvals)
    }

    /// Applies a partial update
    ///
    /// A transition to `submitted` stamps `submitted_at`; a transition to a
    /// decided status stamps `decided_at`. Returns the updated approval, or
    /// None if no row matched.
    pub async fn update(
        pool: &PgPool,
        id: Uuid,
        data: UpdateCityApproval,
    ) -> Result<Option<Self>, sqlx::Error> {
        let approval = sqlx::query_as::<_, CityApproval>(
            r#"
            UPDATE city_approvals
            SET status = COALESCE($2, status),
                reference_number = COALESCE($3, reference_number),
                notes = COALESCE($4, notes),
                submitted_at = CASE
                    WHEN $2 = 'submitted'::approval_status AND submitted_at IS NULL THEN NOW()
                    ELSE submitted_at
                END,
                decided_at = CASE
                    WHEN $2 IN ('approved'::approval_status, 'rejected'::approval_status) THEN NOW()
                    ELSE decided_at
                END,
                updated_at = NOW()
            WHERE id = $1
            RETURNING id, project_id, approval_type, reference_number, status, notes,
                      submitted_at, decided_at, created_by, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(data.status)
        .bind(data.reference_number)
        .bind(data.notes)
        .fetch_optional(pool)
        .await?;

        Ok(approval)
    }

    /// Deletes an approval (corrections cascade)
    pub async fn delete(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM city_approvals WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

/// Correction status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "correction_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum CorrectionStatus {
    /// Still outstanding
    Open,

    /// Addressed
    Resolved,
}

impl CorrectionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            CorrectionStatus::Open => "open",
            CorrectionStatus::Resolved => "resolved",
        }
    }
}

/// Reviewer correction attached to a city approval
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Correction {
    /// Unique correction ID
    pub id: Uuid,

    /// Approval this correction belongs to
    pub city_approval_id: Uuid,

    /// What the reviewer asked for
    pub description: String,

    /// Open/resolved
    pub status: CorrectionStatus,

    /// When the correction was resolved
    pub resolved_at: Option<DateTime<Utc>>,

    /// Creator
    pub created_by: Option<Uuid>,

    /// When the correction was recorded
    pub created_at: DateTime<Utc>,
}

/// Input for recording a correction
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateCorrection {
    /// Approval this correction belongs to
    pub city_approval_id: Uuid,

    /// What the reviewer asked for
    pub description: String,

    /// Creator
    pub created_by: Option<Uuid>,
}

impl Correction {
    /// Records a correction against an approval
    pub async fn create(pool: &PgPool, data: CreateCorrection) -> Result<Self, sqlx::Error> {
        let correction = sqlx::query_as::<_, Correction>(
            r#"
            INSERT INTO corrections (city_approval_id, description, created_by)
            VALUES ($1, $2, $3)
            RETURNING id, city_approval_id, description, status, resolved_at, created_by, created_at
            "#,
        )
        .bind(data.city_approval_id)
        .bind(data.description)
        .bind(data.created_by)
        .fetch_one(pool)
        .await?;

        Ok(correction)
    }

    /// Finds a correction by ID
    pub async fn find(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        let correction = sqlx::query_as::<_, Correction>(
            r#"
            SELECT id, city_approval_id, description, status, resolved_at, created_by, created_at
            FROM corrections
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(correction)
    }

    /// Lists corrections of an approval, oldest first
    pub async fn list_by_approval(
        pool: &PgPool,
        city_approval_id: Uuid,
    ) -> Result<Vec<Self>, sqlx::Error> {
        let corrections = sqlx::query_as::<_, Correction>(
            r#"
            SELECT id, city_approval_id, description, status, resolved_at, created_by, created_at
            FROM corrections
            WHERE city_approval_id = $1
            ORDER BY created_at ASC
            "#,
        )
        .bind(city_approval_id)
        .fetch_all(pool)
        .await?;

        Ok(corrections)
    }

    /// Marks a correction resolved
    pub async fn resolve(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        let correction = sqlx::query_as::<_, Correction>(
            r#"
            UPDATE corrections
            SET status = 'resolved', resolved_at = NOW()
            WHERE id = $1 AND status = 'open'
            RETURNING id, city_approval_id, description, status, resolved_at, created_by, created_at
            "#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(correction)
    }

    /// Deletes a correction
    pub async fn delete(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM corrections WHERE id = $1")
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
    fn test_approval_status_as_str() {
        assert_eq!(ApprovalStatus::Pending.as_str(), "pending");
        assert_eq!(ApprovalStatus::CorrectionsRequired.as_str(), "corrections_required");
    }

    #[test]
    fn test_decided_statuses() {
        assert!(ApprovalStatus::Approved.is_decided());
        assert!(ApprovalStatus::Rejected.is_decided());
        assert!(!ApprovalStatus::Submitted.is_decided());
        assert!(!ApprovalStatus::CorrectionsRequired.is_decided());
    }
}
