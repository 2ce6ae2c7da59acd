/// Correction endpoints
///
/// Corrections are reviewer findings attached to a city approval; they are
/// recorded open and resolved once addressed. Authorization resolves
/// through the parent approval's project.
///
/// # Endpoints
///
/// - `GET /api/corrections?city_approval_id=` - List an approval's corrections
/// - `GET /api/corrections?id=` - Get one correction
/// - `POST /api/corrections` - Record (contribute tier)
/// - `PUT /api/corrections?id=` - Mark resolved (contribute tier)
/// - `DELETE /api/corrections?id=` - Delete (contribute tier)

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
use sitedesk_shared::models::city_approval::{CityApproval, Correction, CreateCorrection};
use sitedesk_shared::models::membership::ProjectRole;
use sqlx::PgPool;
use uuid::Uuid;
use validator::Validate;

/// Query parameters for correction GET/PUT/DELETE
#[derive(Debug, Deserialize)]
pub struct CorrectionQuery {
    /// Correction ID
    pub id: Option<Uuid>,

    /// Approval to list corrections of
    pub city_approval_id: Option<Uuid>,
}

/// Record correction request
#[derive(Debug, Deserialize, Validate)]
pub struct CreateCorrectionRequest {
    /// Approval the correction belongs to
    pub city_approval_id: Uuid,

    /// What the reviewer asked for
    #[validate(length(min = 1, message = "Description must not be empty"))]
    pub description: String,
}

/// Resolves an approval's project for authorization
async fn parent_project(pool: &PgPool, city_approval_id: Uuid) -> Result<Uuid, ApiError> {
    let approval = CityApproval::find(pool, city_approval_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("City approval not found".to_string()))?;
    Ok(approval.project_id)
}

/// `GET /api/corrections?city_approval_id=` and `?id=`
pub async fn get_corrections(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Query(query): Query<CorrectionQuery>,
) -> ApiResult<Response> {
    if let Some(id) = query.id {
        let correction = Correction::find(&state.db, id)
            .await?
            .ok_or_else(|| ApiError::NotFound("Correction not found".to_string()))?;

        let project_id = parent_project(&state.db, correction.city_approval_id).await?;
        project_access(&state.db, &identity, project_id).await?;
        return Ok(ApiResponse::success(correction).into_response());
    }

    let city_approval_id = query.city_approval_id.ok_or_else(|| {
        ApiError::BadRequest("Query parameter 'id' or 'city_approval_id' is required".to_string())
    })?;

    let project_id = parent_project(&state.db, city_approval_id).await?;
    project_access(&state.db, &identity, project_id).await?;

    let corrections = Correction::list_by_approval(&state.db, city_approval_id).await?;
    Ok(ApiResponse::list(corrections).into_response())
}

/// `POST /api/corrections`
pub async fn create_correction(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Json(req): Json<CreateCorrectionRequest>,
) -> ApiResult<ApiResponse<Correction>> {
    req.validate()?;

    let project_id = parent_project(&state.db, req.city_approval_id).await?;
    require_project_role(&state.db, &identity, project_id, ProjectRole::Consultant).await?;

    let correction = Correction::create(
        &state.db,
        CreateCorrection {
            city_approval_id: req.city_approval_id,
            description: req.description,
            created_by: Some(identity.user_id),
        },
    )
    .await?;

    Ok(ApiResponse::created(correction))
}

/// `PUT /api/corrections?id=`
///
/// Marks an open correction resolved, stamping `resolved_at`. Resolving an
/// already-resolved correction is a conflict.
pub async fn resolve_correction(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Query(query): Query<CorrectionQuery>,
) -> ApiResult<ApiResponse<Correction>> {
    let id = query
        .id
        .ok_or_else(|| ApiError::BadRequest("Query parameter 'id' is required".to_string()))?;

    let existing = Correction::find(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Correction not found".to_string()))?;

    let project_id = parent_project(&state.db, existing.city_approval_id).await?;
    require_project_role(&state.db, &identity, project_id, ProjectRole::Consultant).await?;

    let correction = Correction::resolve(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::Conflict("Correction is already resolved".to_string()))?;

    Ok(ApiResponse::success(correction))
}

/// `DELETE /api/corrections?id=`
pub async fn delete_correction(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Query(query): Query<CorrectionQuery>,
) -> ApiResult<ApiResponse<()>> {
    let id = query
        .id
        .ok_or_else(|| ApiError::BadRequest("Query parameter 'id' is required".to_string()))?;

    let correction = Correction::find(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Correction not found".to_string()))?;

    let project_id = parent_project(&state.db, correction.city_approval_id).await?;
    require_project_role(&state.db, &identity, project_id, ProjectRole::Consultant).await?;

    Correction::delete(&state.db, id).await?;
    Ok(ApiResponse::success(()).with_message("Correction deleted"))
}
