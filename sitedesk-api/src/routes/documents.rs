/// Document endpoints
///
/// POST uploads a document version: without `parent_document_id` it starts a
/// new chain, with it the upload supersedes the chain's current version (the
/// latest flag moves atomically inside the model call). Project members are
/// notified of uploads, excluding the uploader.
///
/// # Endpoints
///
/// - `GET /api/documents?project_id=` - Latest version of every chain
/// - `GET /api/documents?id=` - One version
/// - `GET /api/documents?id=&history=true` - The version's full chain, newest first
/// - `POST /api/documents` - Upload a version (contribute tier)
/// - `PUT /api/documents?id=` - Rename (contribute tier)
/// - `DELETE /api/documents?id=` - Delete a version (contribute tier)

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
use sitedesk_shared::models::document::{CreateDocument, Document};
use sitedesk_shared::models::membership::{ProjectMember, ProjectRole};
use sitedesk_shared::notify::NotificationEvent;
use uuid::Uuid;
use validator::Validate;

/// Query parameters for document GET/PUT/DELETE
#[derive(Debug, Deserialize)]
pub struct DocumentQuery {
    /// Document (version) ID
    pub id: Option<Uuid>,

    /// Project to list latest versions of
    pub project_id: Option<Uuid>,

    /// With `id`: return the whole chain instead of the single version
    #[serde(default)]
    pub history: bool,
}

/// Upload document request
#[derive(Debug, Deserialize, Validate)]
pub struct UploadDocumentRequest {
    /// Project the chain belongs to
    pub project_id: Uuid,

    /// File name
    #[validate(length(min = 1, max = 255, message = "Name must be 1-255 characters"))]
    pub name: String,

    /// Storage URL of the uploaded file
    #[validate(url(message = "file_url must be a valid URL"))]
    pub file_url: String,

    /// MIME type
    #[validate(length(max = 100, message = "file_type must be at most 100 characters"))]
    pub file_type: Option<String>,

    /// Size in bytes
    pub file_size: Option<i64>,

    /// Any version of an existing chain; absent starts a new chain
    pub parent_document_id: Option<Uuid>,
}

/// Rename document request
#[derive(Debug, Deserialize, Validate)]
pub struct RenameDocumentRequest {
    /// New file name
    #[validate(length(min = 1, max = 255, message = "Name must be 1-255 characters"))]
    pub name: String,
}

/// `GET /api/documents?project_id=`, `?id=`, and `?id=&history=true`
pub async fn get_documents(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Query(query): Query<DocumentQuery>,
) -> ApiResult<Response> {
    if let Some(id) = query.id {
        let document = Document::find(&state.db, id)
            .await?
            .ok_or_else(|| ApiError::NotFound("Document not found".to_string()))?;

        project_access(&state.db, &identity, document.project_id).await?;

        if query.history {
            let chain = Document::history(&state.db, id).await?;
            return Ok(ApiResponse::list(chain).into_response());
        }
        return Ok(ApiResponse::success(document).into_response());
    }

    let project_id = query.project_id.ok_or_else(|| {
        ApiError::BadRequest("Query parameter 'id' or 'project_id' is required".to_string())
    })?;

    project_access(&state.db, &identity, project_id).await?;

    let documents = Document::list_latest(&state.db, project_id).await?;
    Ok(ApiResponse::list(documents).into_response())
}

/// `POST /api/documents`
///
/// Uploads a document version; requires the contribute tier. The version
/// number and latest flag are managed by the chain manager, and every
/// project member except the uploader is notified.
pub async fn upload_document(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Json(req): Json<UploadDocumentRequest>,
) -> ApiResult<ApiResponse<Document>> {
    req.validate()?;

    require_project_role(&state.db, &identity, req.project_id, ProjectRole::Consultant).await?;

    let document = Document::create(
        &state.db,
        CreateDocument {
            project_id: req.project_id,
            name: req.name,
            file_url: req.file_url,
            file_type: req.file_type,
            file_size: req.file_size,
            parent_document_id: req.parent_document_id,
            uploaded_by: Some(identity.user_id),
        },
    )
    .await?;

    // Recipient lookup failure only costs the notifications, never the upload.
    let recipients: Vec<Uuid> = match ProjectMember::list_user_ids(&state.db, document.project_id)
        .await
    {
        Ok(ids) => ids.into_iter().filter(|id| *id != identity.user_id).collect(),
        Err(e) => {
            tracing::warn!("Failed to load upload notification recipients: {e}");
            Vec::new()
        }
    };

    if !recipients.is_empty() {
        state
            .notifier
            .dispatch(NotificationEvent::DocumentUploaded {
                project_id: document.project_id,
                document_name: document.name.clone(),
                version: document.version,
                recipients,
            })
            .await;
    }

    Ok(ApiResponse::created(document))
}

/// `PUT /api/documents?id=`
///
/// Renames a document version; requires the contribute tier.
pub async fn rename_document(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Query(query): Query<DocumentQuery>,
    Json(req): Json<RenameDocumentRequest>,
) -> ApiResult<ApiResponse<Document>> {
    let id = query
        .id
        .ok_or_else(|| ApiError::BadRequest("Query parameter 'id' is required".to_string()))?;
    req.validate()?;

    let existing = Document::find(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Document not found".to_string()))?;

    require_project_role(&state.db, &identity, existing.project_id, ProjectRole::Consultant)
        .await?;

    let document = Document::rename(&state.db, id, &req.name)
        .await?
        .ok_or_else(|| ApiError::NotFound("Document not found".to_string()))?;

    Ok(ApiResponse::success(document))
}

/// `DELETE /api/documents?id=`
///
/// Deletes a document version; requires the contribute tier. Deleting a
/// chain head removes the whole chain; deleting the latest of a longer
/// chain promotes the previous version.
pub async fn delete_document(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Query(query): Query<DocumentQuery>,
) -> ApiResult<ApiResponse<()>> {
    let id = query
        .id
        .ok_or_else(|| ApiError::BadRequest("Query parameter 'id' is required".to_string()))?;

    let document = Document::find(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Document not found".to_string()))?;

    require_project_role(&state.db, &identity, document.project_id, ProjectRole::Consultant)
        .await?;

    Document::delete(&state.db, id).await?;
    Ok(ApiResponse::success(()).with_message("Document deleted"))
}
