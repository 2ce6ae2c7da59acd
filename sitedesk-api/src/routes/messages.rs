/// Project message board endpoints
///
/// Posting requires the comment tier (clients may post, viewers may not).
/// Mentions are filtered down to actual project members before the mention
/// notifications go out; unknown or non-member IDs are silently dropped.
///
/// # Endpoints
///
/// - `GET /api/messages?project_id=&limit=` - List messages, newest first
/// - `POST /api/messages` - Post (comment tier)
/// - `DELETE /api/messages?id=` - Delete (sender or manage tier)

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
use sitedesk_shared::models::membership::{ProjectMember, ProjectRole};
use sitedesk_shared::models::message::{CreateMessage, Message};
use sitedesk_shared::models::user::User;
use sitedesk_shared::notify::NotificationEvent;
use uuid::Uuid;
use validator::Validate;

/// Default and maximum page sizes for message listings
const DEFAULT_LIMIT: i64 = 100;
const MAX_LIMIT: i64 = 500;

/// Characters of the message body quoted in mention notifications
const EXCERPT_LEN: usize = 140;

/// Query parameters for message GET/DELETE
#[derive(Debug, Deserialize)]
pub struct MessageQuery {
    /// Message ID (for DELETE)
    pub id: Option<Uuid>,

    /// Project message board to list
    pub project_id: Option<Uuid>,

    /// Page size (default 100, capped at 500)
    pub limit: Option<i64>,
}

/// Post message request
#[derive(Debug, Deserialize, Validate)]
pub struct PostMessageRequest {
    /// Project message board
    pub project_id: Uuid,

    /// Message text
    #[validate(length(min = 1, message = "Message body must not be empty"))]
    pub body: String,

    /// Mentioned user IDs
    #[serde(default)]
    pub mentions: Vec<Uuid>,
}

/// `GET /api/messages?project_id=&limit=`
pub async fn get_messages(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Query(query): Query<MessageQuery>,
) -> ApiResult<ApiResponse<Vec<Message>>> {
    let project_id = query.project_id.ok_or_else(|| {
        ApiError::BadRequest("Query parameter 'project_id' is required".to_string())
    })?;

    project_access(&state.db, &identity, project_id).await?;

    let limit = query.limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT);
    let messages = Message::list_by_project(&state.db, project_id, limit).await?;
    Ok(ApiResponse::list(messages))
}

/// `POST /api/messages`
///
/// Posts a message; requires the comment tier. Mentioned project members
/// get a `mention` notification carrying an excerpt of the body.
pub async fn post_message(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Json(req): Json<PostMessageRequest>,
) -> ApiResult<ApiResponse<Message>> {
    req.validate()?;

    require_project_role(&state.db, &identity, req.project_id, ProjectRole::Client).await?;

    // Mentions are stored as given but only notify actual members.
    let message = Message::create(
        &state.db,
        CreateMessage {
            project_id: req.project_id,
            sender_id: Some(identity.user_id),
            body: req.body,
            mentions: req.mentions,
        },
    )
    .await?;

    let mentioned = match ProjectMember::list_user_ids(&state.db, message.project_id).await {
        Ok(member_ids) => message
            .mentions
            .iter()
            .copied()
            .filter(|id| *id != identity.user_id && member_ids.contains(id))
            .collect::<Vec<_>>(),
        Err(e) => {
            tracing::warn!("Failed to load members for mention filtering: {e}");
            Vec::new()
        }
    };

    if !mentioned.is_empty() {
        let sender_name = match User::find(&state.db, identity.user_id).await {
            Ok(Some(user)) => user.name.unwrap_or(user.email),
            _ => "Someone".to_string(),
        };

        let mut excerpt = message.body.clone();
        if excerpt.len() > EXCERPT_LEN {
            let cut = excerpt
                .char_indices()
                .take_while(|(i, _)| *i < EXCERPT_LEN)
                .last()
                .map(|(i, c)| i + c.len_utf8())
                .unwrap_or(0);
            excerpt.truncate(cut);
            excerpt.push('…');
        }

        state
            .notifier
            .dispatch(NotificationEvent::Mentioned {
                project_id: message.project_id,
                sender_name,
                excerpt,
                mentioned,
            })
            .await;
    }

    Ok(ApiResponse::created(message))
}

/// `DELETE /api/messages?id=`
///
/// Deletes a message. Allowed for the sender and the manage tier.
pub async fn delete_message(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Query(query): Query<MessageQuery>,
) -> ApiResult<ApiResponse<()>> {
    let id = query
        .id
        .ok_or_else(|| ApiError::BadRequest("Query parameter 'id' is required".to_string()))?;

    let message = Message::find(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Message not found".to_string()))?;

    let role = project_access(&state.db, &identity, message.project_id).await?;
    if message.sender_id != Some(identity.user_id) && !role.can_manage_project() {
        return Err(ApiError::Forbidden(
            "Only the sender or a project manager may delete a message".to_string(),
        ));
    }

    Message::delete(&state.db, id).await?;
    Ok(ApiResponse::success(()).with_message("Message deleted"))
}
