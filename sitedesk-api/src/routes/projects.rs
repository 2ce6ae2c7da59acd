/// Project endpoints
///
/// Projects are the root of everything else; listing is scoped to what the
/// caller can access, and the single-project response carries the caller's
/// effective role so the client can decide what to render.
///
/// # Endpoints
///
/// - `GET /api/projects` - List accessible projects
/// - `GET /api/projects?id=` - Get one project with `my_role`
/// - `POST /api/projects` - Create a project (requires company affiliation)
/// - `PUT /api/projects?id=` - Update (manage tier)
/// - `DELETE /api/projects?id=` - Delete (manage tier)

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
    response::ApiResponse,
};
use axum::{
    extract::{Query, State},
    response::{IntoResponse, Response},
    Extension, Json,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sitedesk_shared::auth::access::{project_access, require_project_role};
use sitedesk_shared::auth::identity::Identity;
use sitedesk_shared::models::membership::ProjectRole;
use sitedesk_shared::models::project::{CreateProject, Project, ProjectStatus, UpdateProject};
use uuid::Uuid;
use validator::Validate;

/// Query parameters for project GET/PUT/DELETE
#[derive(Debug, Deserialize)]
pub struct ProjectQuery {
    /// Project ID; absent on GET means "list accessible"
    pub id: Option<Uuid>,
}

/// Create project request
#[derive(Debug, Deserialize, Validate)]
pub struct CreateProjectRequest {
    /// Project name
    #[validate(length(min = 1, max = 255, message = "Name must be 1-255 characters"))]
    pub name: String,

    /// Free-form description
    pub description: Option<String>,

    /// Site address
    #[validate(length(max = 512, message = "Address must be at most 512 characters"))]
    pub address: Option<String>,

    /// Initial status (defaults to planning)
    pub status: Option<ProjectStatus>,

    /// Planned construction start
    pub start_date: Option<NaiveDate>,

    /// Planned completion
    pub end_date: Option<NaiveDate>,
}

/// Update project request (the allow-listed mutable fields)
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateProjectRequest {
    /// New name
    #[validate(length(min = 1, max = 255, message = "Name must be 1-255 characters"))]
    pub name: Option<String>,

    /// New description
    pub description: Option<String>,

    /// New site address
    #[validate(length(max = 512, message = "Address must be at most 512 characters"))]
    pub address: Option<String>,

    /// New lifecycle status
    pub status: Option<ProjectStatus>,

    /// New planned start
    pub start_date: Option<NaiveDate>,

    /// New planned completion
    pub end_date: Option<NaiveDate>,
}

/// Single-project response: the row plus the caller's effective role
#[derive(Debug, Serialize)]
pub struct ProjectWithRole {
    /// The project
    #[serde(flatten)]
    pub project: Project,

    /// The caller's effective role in this project
    pub my_role: ProjectRole,
}

/// `GET /api/projects` and `GET /api/projects?id=`
///
/// Without `id`, lists every project the caller can access (membership,
/// creatorship, or same-company admin). With `id`, returns the project and
/// the caller's effective role; access is checked first, so callers without
/// a path to the project get 403 and never learn its fields.
pub async fn get_projects(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Query(query): Query<ProjectQuery>,
) -> ApiResult<Response> {
    match query.id {
        Some(id) => {
            let my_role = project_access(&state.db, &identity, id).await?;

            let project = Project::find(&state.db, id)
                .await?
                .ok_or_else(|| ApiError::NotFound("Project not found".to_string()))?;

            Ok(ApiResponse::success(ProjectWithRole { project, my_role }).into_response())
        }
        None => {
            let projects = Project::list_accessible(&state.db, &identity).await?;
            Ok(ApiResponse::list(projects).into_response())
        }
    }
}

/// `POST /api/projects`
///
/// Creates a project in the caller's company. No membership row is written;
/// the creator holds implicit ownership.
pub async fn create_project(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Json(req): Json<CreateProjectRequest>,
) -> ApiResult<ApiResponse<Project>> {
    req.validate()?;

    let company_id = identity.company_id.ok_or_else(|| {
        ApiError::Forbidden("A company affiliation is required to create projects".to_string())
    })?;

    let project = Project::create(
        &state.db,
        CreateProject {
            company_id,
            created_by: Some(identity.user_id),
            name: req.name,
            description: req.description,
            address: req.address,
            status: req.status.unwrap_or(ProjectStatus::Planning),
            start_date: req.start_date,
            end_date: req.end_date,
        },
    )
    .await?;

    Ok(ApiResponse::created(project))
}

/// `PUT /api/projects?id=`
///
/// Applies the allow-listed partial update. Requires the manage tier.
pub async fn update_project(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Query(query): Query<ProjectQuery>,
    Json(req): Json<UpdateProjectRequest>,
) -> ApiResult<ApiResponse<Project>> {
    let id = query
        .id
        .ok_or_else(|| ApiError::BadRequest("Query parameter 'id' is required".to_string()))?;
    req.validate()?;

    require_project_role(&state.db, &identity, id, ProjectRole::Manager).await?;

    let project = Project::update(
        &state.db,
        id,
        UpdateProject {
            name: req.name,
            description: req.description,
            address: req.address,
            status: req.status,
            start_date: req.start_date,
            end_date: req.end_date,
        },
    )
    .await?
    .ok_or_else(|| ApiError::NotFound("Project not found".to_string()))?;

    Ok(ApiResponse::success(project))
}

/// `DELETE /api/projects?id=`
///
/// Deletes the project and everything under it. Requires the manage tier.
pub async fn delete_project(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Query(query): Query<ProjectQuery>,
) -> ApiResult<ApiResponse<()>> {
    let id = query
        .id
        .ok_or_else(|| ApiError::BadRequest("Query parameter 'id' is required".to_string()))?;

    require_project_role(&state.db, &identity, id, ProjectRole::Manager).await?;

    let deleted = Project::delete(&state.db, id).await?;
    if !deleted {
        return Err(ApiError::NotFound("Project not found".to_string()));
    }

    Ok(ApiResponse::success(()).with_message("Project deleted"))
}
