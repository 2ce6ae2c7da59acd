/// City-approval endpoints
///
/// City approvals track permit applications through municipal review. A
/// status change fans out an `approval_status` notification to the
/// project's members; `submitted_at` and `decided_at` stamping happens in
/// the model on the matching transitions.
///
/// # Endpoints
///
/// - `GET /api/city-approvals?project_id=` - List a project's approvals
/// - `GET /api/city-approvals?id=` - Get one approval
/// - `POST /api/city-approvals` - Create (contribute tier)
/// - `PUT /api/city-approvals?id=` - Update status/reference/notes (contribute tier)
/// - `DELETE /api/city-approvals?id=` - Delete (contribute tier)

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
use sitedesk_shared::models::city_approval::{
    ApprovalStatus, CityApproval, CreateCityApproval, UpdateCityApproval,
};
use sitedesk_shared::models::membership::{ProjectMember, ProjectRole};
use sitedesk_shared::notify::NotificationEvent;
use uuid::Uuid;
use validator::Validate;

/// Query parameters for approval GET/PUT/DELETE
#[derive(Debug, Deserialize)]
pub struct ApprovalQuery {
    /// Approval ID
    pub id: Option<Uuid>,

    /// Project to list approvals of
    pub project_id: Option<Uuid>,
}

/// Create approval request
#[derive(Debug, Deserialize, Validate)]
pub struct CreateApprovalRequest {
    /// Project being permitted
    pub project_id: Uuid,

    /// Kind of permit ("building permit", "fire safety", ...)
    #[validate(length(min = 1, max = 255, message = "approval_type must be 1-255 characters"))]
    pub approval_type: String,

    /// Municipal reference number, if already known
    #[validate(length(max = 100, message = "reference_number must be at most 100 characters"))]
    pub reference_number: Option<String>,

    /// Free-form notes
    pub notes: Option<String>,
}

/// Update approval request (the allow-listed mutable fields)
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateApprovalRequest {
    /// New review status
    pub status: Option<ApprovalStatus>,

    /// New reference number
    #[validate(length(max = 100, message = "reference_number must be at most 100 characters"))]
    pub reference_number: Option<String>,

    /// New notes
    pub notes: Option<String>,
}

/// `GET /api/city-approvals?project_id=` and `?id=`
pub async fn get_approvals(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Query(query): Query<ApprovalQuery>,
) -> ApiResult<Response> {
    if let Some(id) = query.id {
        let approval = CityApproval::find(&state.db, id)
            .await?
            .ok_or_else(|| ApiError::NotFound("City approval not found".to_string()))?;

        project_access(&state.db, &identity, approval.project_id).await?;
        return Ok(ApiResponse::success(approval).into_response());
    }

    let project_id = query.project_id.ok_or_else(|| {
        ApiError::BadRequest("Query parameter 'id' or 'project_id' is required".to_string())
    })?;

    project_access(&state.db, &identity, project_id).await?;

    let approvals = CityApproval::list_by_project(&state.db, project_id).await?;
    Ok(ApiResponse::list(approvals).into_response())
}

/// `POST /api/city-approvals`
pub async fn create_approval(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Json(req): Json<CreateApprovalRequest>,
) -> ApiResult<ApiResponse<CityApproval>> {
    req.validate()?;

    require_project_role(&state.db, &identity, req.project_id, ProjectRole::Consultant).await?;

    let approval = CityApproval::create(
        &state.db,
        CreateCityApproval {
            project_id: req.project_id,
            approval_type: req.approval_type,
            reference_number: req.reference_number,
            notes: req.notes,
            created_by: Some(identity.user_id),
        },
    )
    .await?;

    Ok(ApiResponse::created(approval))
}

/// `PUT /api/city-approvals?id=`
///
/// Applies the allow-listed partial update; a status change notifies the
/// project's members (excluding the actor).
pub async fn update_approval(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Query(query): Query<ApprovalQuery>,
    Json(req): Json<UpdateApprovalRequest>,
) -> ApiResult<ApiResponse<CityApproval>> {
    let id = query
        .id
        .ok_or_else(|| ApiError::BadRequest("Query parameter 'id' is required".to_string()))?;
    req.validate()?;

    let existing = CityApproval::find(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("City approval not found".to_string()))?;

    require_project_role(&state.db, &identity, existing.project_id, ProjectRole::Consultant)
        .await?;

    let status_changed = matches!(req.status, Some(new) if new != existing.status);

    let approval = CityApproval::update(
        &state.db,
        id,
        UpdateCityApproval {
            status: req.status,
            reference_number: req.reference_number,
            notes: req.notes,
        },
    )
    .await?
    .ok_or_else(|| ApiError::NotFound("City approval not found".to_string()))?;

    if status_changed {
        let recipients: Vec<Uuid> =
            match ProjectMember::list_user_ids(&state.db, approval.project_id).await {
                Ok(ids) => ids.into_iter().filter(|id| *id != identity.user_id).collect(),
                Err(e) => {
                    tracing::warn!("Failed to load approval notification recipients: {e}");
                    Vec::new()
                }
            };

        if !recipients.is_empty() {
            state
                .notifier
                .dispatch(NotificationEvent::ApprovalStatusChanged {
                    project_id: approval.project_id,
                    approval_type: approval.approval_type.clone(),
                    status: approval.status.as_str().to_string(),
                    recipients,
                })
                .await;
        }
    }

    Ok(ApiResponse::success(approval))
}

/// `DELETE /api/city-approvals?id=`
pub async fn delete_approval(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Query(query): Query<ApprovalQuery>,
) -> ApiResult<ApiResponse<()>> {
    let id = query
        .id
        .ok_or_else(|| ApiError::BadRequest("Query parameter 'id' is required".to_string()))?;

    let approval = CityApproval::find(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("City approval not found".to_string()))?;

    require_project_role(&state.db, &identity, approval.project_id, ProjectRole::Consultant)
        .await?;

    CityApproval::delete(&state.db, id).await?;
    Ok(ApiResponse::success(()).with_message("City approval deleted"))
}
