/// Notification endpoints
///
/// Notifications are personal: every operation here is scoped to the
/// caller's own rows, and addressing someone else's notification reads as
/// not-found rather than forbidden.
///
/// # Endpoints
///
/// - `GET /api/notifications?unread_only=&limit=` - List own notifications
/// - `PUT /api/notifications?id=` - Mark one read
/// - `PUT /api/notifications?all=true` - Mark all read
/// - `DELETE /api/notifications?id=` - Delete one

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
    response::ApiResponse,
};
use axum::{
    extract::{Query, State},
    response::{IntoResponse, Response},
    Extension,
};
use serde::Deserialize;
use sitedesk_shared::auth::identity::Identity;
use sitedesk_shared::models::notification::Notification;
use uuid::Uuid;

/// Default and maximum page sizes for notification listings
const DEFAULT_LIMIT: i64 = 50;
const MAX_LIMIT: i64 = 200;

/// Query parameters for notification GET/PUT/DELETE
#[derive(Debug, Deserialize)]
pub struct NotificationQuery {
    /// Notification ID
    pub id: Option<Uuid>,

    /// Only unread rows
    #[serde(default)]
    pub unread_only: bool,

    /// With PUT: mark everything read
    #[serde(default)]
    pub all: bool,

    /// Page size (default 50, capped at 200)
    pub limit: Option<i64>,
}

/// `GET /api/notifications?unread_only=&limit=`
///
/// Lists the caller's notifications, newest first.
pub async fn get_notifications(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Query(query): Query<NotificationQuery>,
) -> ApiResult<ApiResponse<Vec<Notification>>> {
    let limit = query.limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT);

    let notifications =
        Notification::list_by_user(&state.db, identity.user_id, query.unread_only, limit).await?;
    Ok(ApiResponse::list(notifications))
}

/// `PUT /api/notifications?id=` and `PUT /api/notifications?all=true`
///
/// Marks one notification (or all of the caller's) read.
pub async fn mark_read(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Query(query): Query<NotificationQuery>,
) -> ApiResult<Response> {
    if query.all {
        let updated = Notification::mark_all_read(&state.db, identity.user_id).await?;
        return Ok(ApiResponse::success(())
            .with_message(format!("{updated} notifications marked read"))
            .into_response());
    }

    let id = query.id.ok_or_else(|| {
        ApiError::BadRequest("Query parameter 'id' or 'all=true' is required".to_string())
    })?;

    let existing = Notification::find(&state.db, id)
        .await?
        .filter(|n| n.user_id == identity.user_id)
        .ok_or_else(|| ApiError::NotFound("Notification not found".to_string()))?;

    let notification = Notification::mark_read(&state.db, existing.id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Notification not found".to_string()))?;

    Ok(ApiResponse::success(notification).into_response())
}

/// `DELETE /api/notifications?id=`
pub async fn delete_notification(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Query(query): Query<NotificationQuery>,
) -> ApiResult<ApiResponse<()>> {
    let id = query
        .id
        .ok_or_else(|| ApiError::BadRequest("Query parameter 'id' is required".to_string()))?;

    let existing = Notification::find(&state.db, id)
        .await?
        .filter(|n| n.user_id == identity.user_id)
        .ok_or_else(|| ApiError::NotFound("Notification not found".to_string()))?;

    Notification::delete(&state.db, existing.id).await?;
    Ok(ApiResponse::success(()).with_message("Notification deleted"))
}
