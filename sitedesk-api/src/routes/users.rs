/// User endpoints
///
/// Accounts originate at the identity provider; this surface covers what a
/// company does with them afterwards: directory listing, profile/role
/// edits, and deactivation. Visibility is tenant-scoped, and lookups
/// outside the caller's company read as not-found rather than forbidden.
///
/// # Endpoints
///
/// - `GET /api/users` - List own-company active users (self when companyless)
/// - `GET /api/users?id=` - Get one user (self or same company)
/// - `PUT /api/users?id=` - Update name/role/active (company admin)
/// - `DELETE /api/users?id=` - Deactivate (company admin)

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
use sitedesk_shared::auth::identity::Identity;
use sitedesk_shared::models::user::{GlobalRole, UpdateUser, User};
use uuid::Uuid;
use validator::Validate;

/// Query parameters for user GET/PUT/DELETE
#[derive(Debug, Deserialize)]
pub struct UserQuery {
    /// User ID
    pub id: Option<Uuid>,
}

/// Update user request (the allow-listed mutable fields)
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateUserRequest {
    /// New display name
    #[validate(length(max = 255, message = "Name must be at most 255 characters"))]
    pub name: Option<String>,

    /// New global role
    pub role: Option<GlobalRole>,

    /// Activate/deactivate the account
    pub is_active: Option<bool>,
}

/// Looks a user up and enforces tenant-scoped visibility
///
/// Self is always visible; anyone else must share the caller's company.
/// Everything outside that is a 404, so callers cannot probe for accounts.
async fn find_visible(
    state: &AppState,
    identity: &Identity,
    id: Uuid,
) -> Result<User, ApiError> {
    let user = User::find(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

    let visible = user.id == identity.user_id
        || (identity.company_id.is_some() && user.company_id == identity.company_id);
    if !visible {
        return Err(ApiError::NotFound("User not found".to_string()));
    }

    Ok(user)
}

/// `GET /api/users` and `GET /api/users?id=`
pub async fn get_users(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Query(query): Query<UserQuery>,
) -> ApiResult<Response> {
    if let Some(id) = query.id {
        let user = find_visible(&state, &identity, id).await?;
        return Ok(ApiResponse::success(user).into_response());
    }

    let users = match identity.company_id {
        Some(company_id) => User::list_by_company(&state.db, company_id).await?,
        // Companyless callers see only themselves.
        None => User::find(&state.db, identity.user_id)
            .await?
            .into_iter()
            .collect(),
    };

    Ok(ApiResponse::list(users).into_response())
}

/// `PUT /api/users?id=`
///
/// Updates a user's name, global role, or active flag. Only a company
/// admin may do this, and only within their own company.
pub async fn update_user(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Query(query): Query<UserQuery>,
    Json(req): Json<UpdateUserRequest>,
) -> ApiResult<ApiResponse<User>> {
    let id = query
        .id
        .ok_or_else(|| ApiError::BadRequest("Query parameter 'id' is required".to_string()))?;
    req.validate()?;

    let target = find_visible(&state, &identity, id).await?;

    let same_company_admin = target
        .company_id
        .is_some_and(|company| identity.is_admin_of(company));
    if !same_company_admin {
        return Err(ApiError::Forbidden(
            "Only a company administrator may update users".to_string(),
        ));
    }

    let user = User::update(
        &state.db,
        id,
        UpdateUser {
            name: req.name,
            role: req.role,
            is_active: req.is_active,
        },
    )
    .await?
    .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

    Ok(ApiResponse::success(user))
}

/// `DELETE /api/users?id=`
///
/// Deactivates an account (soft; the row stays). Only a company admin may
/// do this, and only within their own company.
pub async fn deactivate_user(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Query(query): Query<UserQuery>,
) -> ApiResult<ApiResponse<()>> {
    let id = query
        .id
        .ok_or_else(|| ApiError::BadRequest("Query parameter 'id' is required".to_string()))?;

    let target = find_visible(&state, &identity, id).await?;

    let same_company_admin = target
        .company_id
        .is_some_and(|company| identity.is_admin_of(company));
    if !same_company_admin {
        return Err(ApiError::Forbidden(
            "Only a company administrator may deactivate users".to_string(),
        ));
    }

    let deactivated = User::deactivate(&state.db, id).await?;
    if !deactivated {
        return Err(ApiError::Conflict("User is already deactivated".to_string()));
    }

    Ok(ApiResponse::success(()).with_message("User deactivated"))
}
