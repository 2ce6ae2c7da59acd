/// Project access-control evaluator
///
/// Decides whether an identity may act on a project, and with which
/// effective role. The decision itself is the pure [`evaluate`] function so
/// it can be tested without storage; [`project_access`] and
/// [`require_project_role`] wrap it with the two row lookups handlers need.
///
/// # Access Rules
///
/// An identity may access a project iff at least one of:
///
/// 1. a membership row exists for `(project, user)` — the effective role is
///    the row's role;
/// 2. the identity created the project — with no membership row the
///    effective role is synthesized as `owner`;
/// 3. the identity is a global admin of the **project's own company** — the
///    effective role is `admin` unless (1) or (2) grant a higher one.
///
/// The admin bypass is deliberately company-scoped: tenant isolation holds
/// even for administrators, and an identity without a company never matches.
///
/// On top of mere access, mutating membership or project lifecycle requires
/// the manage tier (`owner`/`admin`/`manager`); handlers express that as
/// `require_project_role(..., ProjectRole::Manager)`.
///
/// # Example
///
/// ```no_run
/// use sitedesk_shared::auth::access::{require_project_role, project_access};
/// use sitedesk_shared::auth::identity::Identity;
/// use sitedesk_shared::models::membership::ProjectRole;
/// use sqlx::PgPool;
/// use uuid::Uuid;
///
/// # async fn example(pool: PgPool, identity: Identity, project_id: Uuid) -> Result<(), Box<dyn std::error::Error>> {
/// // Any access at all, with the caller's effective role
/// let role = project_access(&pool, &identity, project_id).await?;
///
/// // Manage tier for lifecycle mutations
/// require_project_role(&pool, &identity, project_id, ProjectRole::Manager).await?;
/// # Ok(())
/// # }
/// ```

use sqlx::PgPool;
use uuid::Uuid;

use super::identity::Identity;
use crate::models::membership::{ProjectMember, ProjectRole};

/// Error type for access checks
#[derive(Debug, thiserror::Error)]
pub enum AccessError {
    /// Project row does not exist
    #[error("Project {0} not found")]
    ProjectNotFound(Uuid),

    /// Identity has no access path to the project
    #[error("No access to project {0}")]
    Denied(Uuid),

    /// Identity has access but not the required role
    #[error("Insufficient role: requires {required:?}, has {actual:?}")]
    InsufficientRole {
        required: ProjectRole,
        actual: ProjectRole,
    },

    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// The two project columns access decisions depend on
#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::FromRow)]
pub struct ProjectScope {
    /// Owning company
    pub company_id: Uuid,

    /// Creator, if the account still exists
    pub created_by: Option<Uuid>,
}

/// Pure access decision
///
/// Returns the effective project role, or None for deny. See the module
/// docs for the rule set. `membership` is the caller's membership role in
/// the project, if a row exists.
pub fn evaluate(
    identity: &Identity,
    project: &ProjectScope,
    membership: Option<ProjectRole>,
) -> Option<ProjectRole> {
    let base = membership.or_else(|| {
        (project.created_by == Some(identity.user_id)).then_some(ProjectRole::Owner)
    });

    if identity.is_admin_of(project.company_id) {
        return Some(match base {
            Some(role) if role.has_permission(&ProjectRole::Admin) => role,
            _ => ProjectRole::Admin,
        });
    }

    base
}

/// Checks access and returns the caller's effective role
///
/// # Errors
///
/// - [`AccessError::ProjectNotFound`] if the project row is missing
/// - [`AccessError::Denied`] if no access path applies
/// - [`AccessError::Database`] on storage failure
pub async fn project_access(
    pool: &PgPool,
    identity: &Identity,
    project_id: Uuid,
) -> Result<ProjectRole, AccessError> {
    let scope = sqlx::query_as::<_, ProjectScope>(
        "SELECT company_id, created_by FROM projects WHERE id = $1",
    )
    .bind(project_id)
    .fetch_optional(pool)
    .await?
    .ok_or(AccessError::ProjectNotFound(project_id))?;

    let membership = ProjectMember::get_role(pool, project_id, identity.user_id).await?;

    evaluate(identity, &scope, membership).ok_or(AccessError::Denied(project_id))
}

/// Checks access and requires a minimum effective role
///
/// Hierarchy: owner > admin > manager > member > consultant > client >
/// viewer. The manage tier is `ProjectRole::Manager`; the contribute tier is
/// `ProjectRole::Consultant`; the comment tier is `ProjectRole::Client`.
///
/// # Errors
///
/// Everything [`project_access`] returns, plus
/// [`AccessError::InsufficientRole`] when access exists but the role is too
/// low.
pub async fn require_project_role(
    pool: &PgPool,
    identity: &Identity,
    project_id: Uuid,
    required: ProjectRole,
) -> Result<ProjectRole, AccessError> {
    let actual = project_access(pool, identity, project_id).await?;

    if !actual.has_permission(&required) {
        return Err(AccessError::InsufficientRole { required, actual });
    }

    Ok(actual)
}
