/// Task endpoints
///
/// Tasks are project work items. Creating and updating requires the
/// contribute tier; assignment (and re-assignment) notifies the assignee
/// through the dispatcher, which never fails the request.
///
/// # Endpoints
///
/// - `GET /api/tasks?id=` - Get one task
/// - `GET /api/tasks?project_id=&status=&assigned_to=` - List project tasks
/// - `POST /api/tasks` - Create (contribute tier)
/// - `PUT /api/tasks?id=` - Update allow-listed fields (contribute tier)
/// - `DELETE /api/tasks?id=` - Delete (task creator or manage tier)

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
use serde::Deserialize;
use sitedesk_shared::auth::access::{project_access, require_project_role};
use sitedesk_shared::auth::identity::Identity;
use sitedesk_shared::models::membership::ProjectRole;
use sitedesk_shared::models::task::{CreateTask, Task, TaskPriority, TaskStatus, UpdateTask};
use sitedesk_shared::notify::NotificationEvent;
use uuid::Uuid;
use validator::Validate;

/// Query parameters for task GET/PUT/DELETE
#[derive(Debug, Deserialize)]
pub struct TaskQuery {
    /// Task ID
    pub id: Option<Uuid>,

    /// Project to list tasks of
    pub project_id: Option<Uuid>,

    /// Filter by status
    pub status: Option<TaskStatus>,

    /// Filter by assignee
    pub assigned_to: Option<Uuid>,
}

/// Create task request
#[derive(Debug, Deserialize, Validate)]
pub struct CreateTaskRequest {
    /// Project this task belongs to
    pub project_id: Uuid,

    /// Short title
    #[validate(length(min = 1, max = 255, message = "Title must be 1-255 characters"))]
    pub title: String,

    /// Longer description
    pub description: Option<String>,

    /// Priority (defaults to medium)
    pub priority: Option<TaskPriority>,

    /// Assignee
    pub assigned_to: Option<Uuid>,

    /// Due date
    pub due_date: Option<NaiveDate>,
}

/// Update task request (the allow-listed mutable fields)
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateTaskRequest {
    /// New title
    #[validate(length(min = 1, max = 255, message = "Title must be 1-255 characters"))]
    pub title: Option<String>,

    /// New description
    pub description: Option<String>,

    /// New status
    pub status: Option<TaskStatus>,

    /// New priority
    pub priority: Option<TaskPriority>,

    /// New assignee
    pub assigned_to: Option<Uuid>,

    /// New due date
    pub due_date: Option<NaiveDate>,
}

/// `GET /api/tasks?id=` and `GET /api/tasks?project_id=`
pub async fn get_tasks(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Query(query): Query<TaskQuery>,
) -> ApiResult<Response> {
    if let Some(id) = query.id {
        let task = Task::find(&state.db, id)
            .await?
            .ok_or_else(|| ApiError::NotFound("Task not found".to_string()))?;

        project_access(&state.db, &identity, task.project_id).await?;
        return Ok(ApiResponse::success(task).into_response());
    }

    let project_id = query.project_id.ok_or_else(|| {
        ApiError::BadRequest("Query parameter 'id' or 'project_id' is required".to_string())
    })?;

    project_access(&state.db, &identity, project_id).await?;

    let tasks = Task::list_by_project(&state.db, project_id, query.status, query.assigned_to)
        .await?;
    Ok(ApiResponse::list(tasks).into_response())
}

/// `POST /api/tasks`
///
/// Creates a task; requires the contribute tier. An initial assignee gets a
/// `task_assigned` notification after the insert.
pub async fn create_task(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Json(req): Json<CreateTaskRequest>,
) -> ApiResult<ApiResponse<Task>> {
    req.validate()?;

    require_project_role(&state.db, &identity, req.project_id, ProjectRole::Consultant).await?;

    let task = Task::create(
        &state.db,
        CreateTask {
            project_id: req.project_id,
            title: req.title,
            description: req.description,
            priority: req.priority.unwrap_or(TaskPriority::Medium),
            assigned_to: req.assigned_to,
            created_by: Some(identity.user_id),
            due_date: req.due_date,
        },
    )
    .await?;

    if let Some(assignee) = task.assigned_to {
        state
            .notifier
            .dispatch(NotificationEvent::TaskAssigned {
                project_id: task.project_id,
                task_title: task.title.clone(),
                assignee,
            })
            .await;
    }

    Ok(ApiResponse::created(task))
}

/// `PUT /api/tasks?id=`
///
/// Applies the allow-listed partial update; requires the contribute tier.
/// Changing the assignee re-notifies.
pub async fn update_task(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Query(query): Query<TaskQuery>,
    Json(req): Json<UpdateTaskRequest>,
) -> ApiResult<ApiResponse<Task>> {
    let id = query
        .id
        .ok_or_else(|| ApiError::BadRequest("Query parameter 'id' is required".to_string()))?;
    req.validate()?;

    let existing = Task::find(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Task not found".to_string()))?;

    require_project_role(&state.db, &identity, existing.project_id, ProjectRole::Consultant)
        .await?;

    let reassigned = matches!(req.assigned_to, Some(new) if existing.assigned_to != Some(new));

    let task = Task::update(
        &state.db,
        id,
        UpdateTask {
            title: req.title,
            description: req.description,
            status: req.status,
            priority: req.priority,
            assigned_to: req.assigned_to,
            due_date: req.due_date,
        },
    )
    .await?
    .ok_or_else(|| ApiError::NotFound("Task not found".to_string()))?;

    if reassigned {
        if let Some(assignee) = task.assigned_to {
            state
                .notifier
                .dispatch(NotificationEvent::TaskAssigned {
                    project_id: task.project_id,
                    task_title: task.title.clone(),
                    assignee,
                })
                .await;
        }
    }

    Ok(ApiResponse::success(task))
}

/// `DELETE /api/tasks?id=`
///
/// Deletes a task and its subtasks. Allowed for the task creator and the
/// manage tier.
pub async fn delete_task(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Query(query): Query<TaskQuery>,
) -> ApiResult<ApiResponse<()>> {
    let id = query
        .id
        .ok_or_else(|| ApiError::BadRequest("Query parameter 'id' is required".to_string()))?;

    let task = Task::find(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Task not found".to_string()))?;

    let role = project_access(&state.db, &identity, task.project_id).await?;
    if task.created_by != Some(identity.user_id) && !role.can_manage_project() {
        return Err(ApiError::Forbidden(
            "Only the task creator or a project manager may delete a task".to_string(),
        ));
    }

    Task::delete(&state.db, id).await?;
    Ok(ApiResponse::success(()).with_message("Task deleted"))
}
