/// Project membership endpoints
///
/// Membership rows grant project access with a project-scoped role; adding,
/// re-roling, and removing members all sit behind the manage tier. The
/// membership key is composite, so PUT and DELETE address rows by
/// `?project_id=&user_id=` instead of a single `?id=`.
///
/// # Endpoints
///
/// - `GET /api/project-members?project_id=` - List members with user details
/// - `POST /api/project-members` - Add a member (manage tier)
/// - `PUT /api/project-members?project_id=&user_id=` - Change role (manage tier)
/// - `DELETE /api/project-members?project_id=&user_id=` - Remove (manage tier)

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
    response::ApiResponse,
};
use axum::{
    extract::{Query, State},
    Extension, Json,
};
use serde::Deserialize;
use sitedesk_shared::auth::access::{project_access, require_project_role};
use sitedesk_shared::auth::identity::Identity;
use sitedesk_shared::models::membership::{
    CreateProjectMember, ProjectMember, ProjectMemberWithUser, ProjectRole,
};
use uuid::Uuid;

/// Query parameters for membership listing
#[derive(Debug, Deserialize)]
pub struct MemberListQuery {
    /// Project to list members of
    pub project_id: Uuid,
}

/// Query parameters addressing one membership row
#[derive(Debug, Deserialize)]
pub struct MemberKeyQuery {
    /// Project half of the membership key
    pub project_id: Uuid,

    /// User half of the membership key
    pub user_id: Uuid,
}

/// Add member request
#[derive(Debug, Deserialize)]
pub struct AddMemberRequest {
    /// Project to add to
    pub project_id: Uuid,

    /// User to add
    pub user_id: Uuid,

    /// Role to assign (defaults to member)
    pub role: Option<ProjectRole>,
}

/// Change role request
#[derive(Debug, Deserialize)]
pub struct UpdateMemberRequest {
    /// New role
    pub role: ProjectRole,
}

/// `GET /api/project-members?project_id=`
///
/// Lists the project's members joined with email and name. Any access to
/// the project suffices.
pub async fn get_members(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Query(query): Query<MemberListQuery>,
) -> ApiResult<ApiResponse<Vec<ProjectMemberWithUser>>> {
    project_access(&state.db, &identity, query.project_id).await?;

    let members = ProjectMember::list_by_project(&state.db, query.project_id).await?;
    Ok(ApiResponse::list(members))
}

/// `POST /api/project-members`
///
/// Adds a user to a project. Requires the manage tier; adding an existing
/// member is a conflict.
pub async fn add_member(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Json(req): Json<AddMemberRequest>,
) -> ApiResult<ApiResponse<ProjectMember>> {
    require_project_role(&state.db, &identity, req.project_id, ProjectRole::Manager).await?;

    if ProjectMember::find(&state.db, req.project_id, req.user_id)
        .await?
        .is_some()
    {
        return Err(ApiError::Conflict(
            "User is already a member of this project".to_string(),
        ));
    }

    let member = ProjectMember::create(
        &state.db,
        CreateProjectMember {
            project_id: req.project_id,
            user_id: req.user_id,
            role: req.role.unwrap_or(ProjectRole::Member),
        },
    )
    .await?;

    Ok(ApiResponse::created(member))
}

/// `PUT /api/project-members?project_id=&user_id=`
///
/// Changes a member's role. Requires the manage tier.
pub async fn update_member_role(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Query(query): Query<MemberKeyQuery>,
    Json(req): Json<UpdateMemberRequest>,
) -> ApiResult<ApiResponse<ProjectMember>> {
    require_project_role(&state.db, &identity, query.project_id, ProjectRole::Manager).await?;

    let member = ProjectMember::update_role(&state.db, query.project_id, query.user_id, req.role)
        .await?
        .ok_or_else(|| ApiError::NotFound("Membership not found".to_string()))?;

    Ok(ApiResponse::success(member))
}

/// `DELETE /api/project-members?project_id=&user_id=`
///
/// Removes a user from a project. Requires the manage tier.
pub async fn remove_member(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Query(query): Query<MemberKeyQuery>,
) -> ApiResult<ApiResponse<()>> {
    require_project_role(&state.db, &identity, query.project_id, ProjectRole::Manager).await?;

    let removed = ProjectMember::delete(&state.db, query.project_id, query.user_id).await?;
    if !removed {
        return Err(ApiError::NotFound("Membership not found".to_string()));
    }

    Ok(ApiResponse::success(()).with_message("Member removed"))
}
