/// Notification preference endpoints
///
/// Preferences control the email leg only; in-app notification rows are
/// always written. A user without a stored row gets the defaults
/// (everything enabled), so GET never 404s.
///
/// # Endpoints
///
/// - `GET /api/notification-preferences` - Own preferences (or defaults)
/// - `PUT /api/notification-preferences` - Upsert own preferences

use crate::{app::AppState, error::ApiResult, response::ApiResponse};
use axum::{extract::State, Extension, Json};
use serde::Deserialize;
use sitedesk_shared::auth::identity::Identity;
use sitedesk_shared::models::notification::NotificationPreferences;

/// Preference update request; omitted fields fall back to enabled
#[derive(Debug, Deserialize)]
pub struct UpdatePreferencesRequest {
    /// Email on task assignment
    #[serde(default = "enabled")]
    pub email_task_assigned: bool,

    /// Email on document upload
    #[serde(default = "enabled")]
    pub email_document_uploaded: bool,

    /// Email on mention
    #[serde(default = "enabled")]
    pub email_mentions: bool,

    /// Email on approval status change
    #[serde(default = "enabled")]
    pub email_approvals: bool,
}

fn enabled() -> bool {
    true
}

/// `GET /api/notification-preferences`
pub async fn get_preferences(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
) -> ApiResult<ApiResponse<NotificationPreferences>> {
    let prefs = NotificationPreferences::find_or_default(&state.db, identity.user_id).await?;
    Ok(ApiResponse::success(prefs))
}

/// `PUT /api/notification-preferences`
pub async fn update_preferences(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Json(req): Json<UpdatePreferencesRequest>,
) -> ApiResult<ApiResponse<NotificationPreferences>> {
    let prefs = NotificationPreferences::upsert(
        &state.db,
        identity.user_id,
        req.email_task_assigned,
        req.email_document_uploaded,
        req.email_mentions,
        req.email_approvals,
    )
    .await?;

    Ok(ApiResponse::success(prefs))
}
