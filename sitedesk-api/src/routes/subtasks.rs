/// Subtask endpoints
///
/// Subtasks are checklist items under a task; they carry no project
/// reference of their own, so authorization resolves through the parent
/// task's project. All writes require the contribute tier.
///
/// # Endpoints
///
/// - `GET /api/subtasks?task_id=` - List a task's subtasks
/// - `GET /api/subtasks?id=` - Get one subtask
/// - `POST /api/subtasks` - Create (contribute tier)
/// - `PUT /api/subtasks?id=` - Update title / done flag (contribute tier)
/// - `DELETE /api/subtasks?id=` - Delete (contribute tier)

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
use serde::Deserialize;
use sitedesk_shared::auth::access::{project_access, require_project_role};
use sitedesk_shared::auth::identity::Identity;
use sitedesk_shared::models::membership::ProjectRole;
use sitedesk_shared::models::subtask::{CreateSubtask, Subtask, UpdateSubtask};
use sitedesk_shared::models::task::Task;
use sqlx::PgPool;
use uuid::Uuid;
use validator::Validate;

/// Query parameters for subtask GET/PUT/DELETE
#[derive(Debug, Deserialize)]
pub struct SubtaskQuery {
    /// Subtask ID
    pub id: Option<Uuid>,

    /// Task to list subtasks of
    pub task_id: Option<Uuid>,
}

/// Create subtask request
#[derive(Debug, Deserialize, Validate)]
pub struct CreateSubtaskRequest {
    /// Parent task
    pub task_id: Uuid,

    /// Checklist item text
    #[validate(length(min = 1, max = 255, message = "Title must be 1-255 characters"))]
    pub title: String,
}

/// Update subtask request
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateSubtaskRequest {
    /// New text
    #[validate(length(min = 1, max = 255, message = "Title must be 1-255 characters"))]
    pub title: Option<String>,

    /// Toggle done flag
    pub is_completed: Option<bool>,
}

/// Resolves a task's project for authorization
async fn parent_project(pool: &PgPool, task_id: Uuid) -> Result<Uuid, ApiError> {
    let task = Task::find(pool, task_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Task not found".to_string()))?;
    Ok(task.project_id)
}

/// `GET /api/subtasks?task_id=` and `GET /api/subtasks?id=`
pub async fn get_subtasks(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Query(query): Query<SubtaskQuery>,
) -> ApiResult<Response> {
    if let Some(id) = query.id {
        let subtask = Subtask::find(&state.db, id)
            .await?
            .ok_or_else(|| ApiError::NotFound("Subtask not found".to_string()))?;

        let project_id = parent_project(&state.db, subtask.task_id).await?;
        project_access(&state.db, &identity, project_id).await?;
        return Ok(ApiResponse::success(subtask).into_response());
    }

    let task_id = query.task_id.ok_or_else(|| {
        ApiError::BadRequest("Query parameter 'id' or 'task_id' is required".to_string())
    })?;

    let project_id = parent_project(&state.db, task_id).await?;
    project_access(&state.db, &identity, project_id).await?;

    let subtasks = Subtask::list_by_task(&state.db, task_id).await?;
    Ok(ApiResponse::list(subtasks).into_response())
}

/// `POST /api/subtasks`
pub async fn create_subtask(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Json(req): Json<CreateSubtaskRequest>,
) -> ApiResult<ApiResponse<Subtask>> {
    req.validate()?;

    let project_id = parent_project(&state.db, req.task_id).await?;
    require_project_role(&state.db, &identity, project_id, ProjectRole::Consultant).await?;

    let subtask = Subtask::create(
        &state.db,
        CreateSubtask {
            task_id: req.task_id,
            title: req.title,
        },
    )
    .await?;

    Ok(ApiResponse::created(subtask))
}

/// `PUT /api/subtasks?id=`
pub async fn update_subtask(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Query(query): Query<SubtaskQuery>,
    Json(req): Json<UpdateSubtaskRequest>,
) -> ApiResult<ApiResponse<Subtask>> {
    let id = query
        .id
        .ok_or_else(|| ApiError::BadRequest("Query parameter 'id' is required".to_string()))?;
    req.validate()?;

    let existing = Subtask::find(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Subtask not found".to_string()))?;

    let project_id = parent_project(&state.db, existing.task_id).await?;
    require_project_role(&state.db, &identity, project_id, ProjectRole::Consultant).await?;

    let subtask = Subtask::update(
        &state.db,
        id,
        UpdateSubtask {
            title: req.title,
            is_completed: req.is_completed,
        },
    )
    .await?
    .ok_or_else(|| ApiError::NotFound("Subtask not found".to_string()))?;

    Ok(ApiResponse::success(subtask))
}

/// `DELETE /api/subtasks?id=`
pub async fn delete_subtask(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Query(query): Query<SubtaskQuery>,
) -> ApiResult<ApiResponse<()>> {
    let id = query
        .id
        .ok_or_else(|| ApiError::BadRequest("Query parameter 'id' is required".to_string()))?;

    let subtask = Subtask::find(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Subtask not found".to_string()))?;

    let project_id = parent_project(&state.db, subtask.task_id).await?;
    require_project_role(&state.db, &identity, project_id, ProjectRole::Consultant).await?;

    Subtask::delete(&state.db, id).await?;
    Ok(ApiResponse::success(()).with_message("Subtask deleted"))
}
