/// Document model and version-chain operations
///
/// Documents form version chains: the first upload is the chain head
/// (`version = 1`, `parent_document_id` NULL) and every later version points
/// at the head. Exactly one row per chain carries `is_latest = true` at any
/// time.
///
/// The flag flip and the insert of the new version happen in one
/// transaction, with the chain head locked `FOR UPDATE` so concurrent
/// uploads against the same chain serialize instead of racing the flag.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE documents (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     project_id UUID NOT NULL REFERENCES projects(id) ON DELETE CASCADE,
///     parent_document_id UUID REFERENCES documents(id) ON DELETE CASCADE,
///     name VARCHAR(255) NOT NULL,
///     file_url VARCHAR(2048) NOT NULL,
///     file_type VARCHAR(100),
///     file_size BIGINT,
///     version INTEGER NOT NULL DEFAULT 1,
///     is_latest BOOLEAN NOT NULL DEFAULT TRUE,
///     uploaded_by UUID REFERENCES users(id) ON DELETE SET NULL,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```
///
/// # Example
///
/// ```no_run
/// use sitedesk_shared::models::document::{Document, CreateDocument};
/// use sitedesk_shared::db::pool::{create_pool, DatabaseConfig};
/// use uuid::Uuid;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let pool = create_pool(DatabaseConfig::default()).await?;
/// let project_id = Uuid::new_v4();
///
/// // Chain head
/// let v1 = Document::create(&pool, CreateDocument {
///     project_id,
///     name: "plan.pdf".to_string(),
///     file_url: "https://files.example/plan-v1.pdf".to_string(),
///     file_type: Some("application/pdf".to_string()),
///     file_size: Some(1_204_224),
///     parent_document_id: None,
///     uploaded_by: None,
/// }).await?;
///
/// // New version; v1 loses its latest flag atomically
/// let v2 = Document::create(&pool, CreateDocument {
///     parent_document_id: Some(v1.id),
///     file_url: "https://files.example/plan-v2.pdf".to_string(),
///     ..CreateDocument::new_version_of(&v1)
/// }).await?;
/// assert_eq!(v2.version, 2);
/// # Ok(())
/// # }
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

/// Error type for version-chain operations
#[derive(Debug, thiserror::Error)]
pub enum DocumentError {
    /// Parent version does not exist, or belongs to a different project
    #[error("Parent document {0} not found")]
    ParentNotFound(Uuid),

    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Document model: one version within a chain
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Document {
    /// Unique document (version) ID
    pub id: Uuid,

    /// Project this document belongs to
    pub project_id: Uuid,

    /// Chain head; NULL on the head itself
    pub parent_document_id: Option<Uuid>,

    /// File name
    pub name: String,

    /// Storage URL of this version's file
    pub file_url: String,

    /// MIME type
    pub file_type: Option<String>,

    /// Size in bytes
    pub file_size: Option<i64>,

    /// Version number within the chain, starting at 1
    pub version: i32,

    /// Whether this row is the chain's current version
    pub is_latest: bool,

    /// Uploader; None if the account was since removed
    pub uploaded_by: Option<Uuid>,

    /// When this version was uploaded
    pub created_at: DateTime<Utc>,
}

/// Input for uploading a document version
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateDocument {
    /// Project the chain belongs to
    pub project_id: Uuid,

    /// File name
    pub name: String,

    /// Storage URL
    pub file_url: String,

    /// MIME type
    pub file_type: Option<String>,

    /// Size in bytes
    pub file_size: Option<i64>,

    /// Any version of an existing chain; absent for a new chain head
    pub parent_document_id: Option<Uuid>,

    /// Uploader
    pub uploaded_by: Option<Uuid>,
}

impl CreateDocument {
    /// Builds an upload input carrying over chain metadata from an existing
    /// version (name, type, project)
    pub fn new_version_of(parent: &Document) -> Self {
        Self {
            project_id: parent.project_id,
            name: parent.name.clone(),
            file_url: String::new(),
            file_type: parent.file_type.clone(),
            file_size: None,
            parent_document_id: Some(parent.id),
            uploaded_by: None,
        }
    }
}

/// Minimal chain coordinates used while resolving a parent
#[derive(Debug, sqlx::FromRow)]
struct ChainRef {
    id: Uuid,
    project_id: Uuid,
    version: i32,
    parent_document_id: Option<Uuid>,
}

impl Document {
    /// Uploads a document version
    ///
    /// Without `parent_document_id` this starts a new chain
    /// (`version = 1`, latest). With it, the new row gets
    /// `parent.version + 1` and the previous latest row of the chain loses
    /// its flag in the same transaction; the chain head row is locked for
    /// the duration, so two concurrent uploads against one chain cannot both
    /// end up latest.
    ///
    /// # Errors
    ///
    /// - [`DocumentError::ParentNotFound`] if the parent is missing or
    ///   belongs to a different project (checked before any write)
    /// - [`DocumentError::Database`] on storage failure
    pub async fn create(pool: &PgPool, data: CreateDocument) -> Result<Self, DocumentError> {
        let mut tx = pool.begin().await?;

        let document = match data.parent_document_id {
            None => {
                sqlx::query_as::<_, Document>(
                    r#"
                    INSERT INTO documents
                        (project_id, parent_document_id, name, file_url, file_type, file_size, version, is_latest, uploaded_by)
                    VALUES ($1, NULL, $2, $3, $4, $5, 1, TRUE, $6)
                    RETURNING id, project_id, parent_document_id, name, file_url, file_type,
                              file_size, version, is_latest, uploaded_by, created_at
                    "#,
                )
                .bind(data.project_id)
                .bind(&data.name)
                .bind(&data.file_url)
                .bind(&data.file_type)
                .bind(data.file_size)
                .bind(data.uploaded_by)
                .fetch_one(&mut *tx)
                .await?
            }
            Some(parent_id) => {
                let parent = sqlx::query_as::<_, ChainRef>(
                    "SELECT id, project_id, version, parent_document_id FROM documents WHERE id = $1",
                )
                .bind(parent_id)
                .fetch_optional(&mut *tx)
                .await?
                .ok_or(DocumentError::ParentNotFound(parent_id))?;

                if parent.project_id != data.project_id {
                    return Err(DocumentError::ParentNotFound(parent_id));
                }

                let root_id = parent.parent_document_id.unwrap_or(parent.id);

                // Per-chain lock: serializes concurrent uploads on this chain.
                sqlx::query("SELECT id FROM documents WHERE id = $1 FOR UPDATE")
                    .bind(root_id)
                    .fetch_one(&mut *tx)
                    .await?;

                sqlx::query(
                    r#"
                    UPDATE documents
                    SET is_latest = FALSE
                    WHERE (id = $1 OR parent_document_id = $1) AND is_latest
                    "#,
                )
                .bind(root_id)
                .execute(&mut *tx)
                .await?;

                sqlx::query_as::<_, Document>(
                    r#"
                    INSERT INTO documents
                        (project_id, parent_document_id, name, file_url, file_type, file_size, version, is_latest, uploaded_by)
                    VALUES ($1, $2, $3, $4, $5, $6, $7, TRUE, $8)
                    RETURNING id, project_id, parent_document_id, name, file_url, file_type,
                              file_size, version, is_latest, uploaded_by, created_at
                    "#,
                )
                .bind(data.project_id)
                .bind(root_id)
                .bind(&data.name)
                .bind(&data.file_url)
                .bind(&data.file_type)
                .bind(data.file_size)
                .bind(parent.version + 1)
                .bind(data.uploaded_by)
                .fetch_one(&mut *tx)
                .await?
            }
        };

        tx.commit().await?;
        Ok(document)
    }

    /// Finds a document version by ID
    pub async fn find(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        let document = sqlx::query_as::<_, Document>(
            r#"
            SELECT id, project_id, parent_document_id, name, file_url, file_type,
                   file_size, version, is_latest, uploaded_by, created_at
            FROM documents
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(document)
    }

    /// Lists the current version of every chain in a project
    pub async fn list_latest(pool: &PgPool, project_id: Uuid) -> Result<Vec<Self>, sqlx::Error> {
        let documents = sqlx::query_as::<_, Document>(
            r#"
            SELECT id, project_id, parent_document_id, name, file_url, file_type,
                   file_size, version, is_latest, uploaded_by, created_at
            FROM documents
            WHERE project_id = $1 AND is_latest
            ORDER BY created_at DESC
            "#,
        )
        .bind(project_id)
        .fetch_all(pool)
        .await?;

        Ok(documents)
    }

    /// Returns the full chain any version belongs to, newest first
    ///
    /// Walks to the chain head, then collects the head plus every row
    /// pointing at it, ordered by version descending.
    pub async fn history(pool: &PgPool, document_id: Uuid) -> Result<Vec<Self>, sqlx::Error> {
        let chain: Option<(Uuid, Option<Uuid>)> = sqlx::query_as(
            "SELECT id, parent_document_id FROM documents WHERE id = $1",
        )
        .bind(document_id)
        .fetch_optional(pool)
        .await?;

        let Some((id, parent)) = chain else {
            return Ok(Vec::new());
        };
        let root_id = parent.unwrap_or(id);

        let documents = sqlx::query_as::<_, Document>(
            r#"
            SELECT id, project_id, parent_document_id, name, file_url, file_type,
                   file_size, version, is_latest, uploaded_by, created_at
            FROM documents
            WHERE id = $1 OR parent_document_id = $1
            ORDER BY version DESC, created_at DESC
            "#,
        )
        .bind(root_id)
        .fetch_all(pool)
        .await?;

        Ok(documents)
    }

    /// Renames a document version
    pub async fn rename(pool: &PgPool, id: Uuid, name: &str) -> Result<Option<Self>, sqlx::Error> {
        let document = sqlx::query_as::<_, Document>(
            r#"
            UPDATE documents
            SET name = $2
            WHERE id = $1
            RETURNING id, project_id, parent_document_id, name, file_url, file_type,
                      file_size, version, is_latest, uploaded_by, created_at
            "#,
        )
        .bind(id)
        .bind(name)
        .fetch_optional(pool)
        .await?;

        Ok(document)
    }

    /// Deletes a document version
    ///
    /// Deleting the chain head removes the whole chain (FK cascade).
    /// Deleting a later version promotes the highest surviving version back
    /// to latest within the same transaction, so the chain never ends up
    /// with zero latest rows.
    pub async fn delete(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let row: Option<(Option<Uuid>, bool)> = sqlx::query_as(
            "SELECT parent_document_id, is_latest FROM documents WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?;

        let Some((parent, was_latest)) = row else {
            return Ok(false);
        };

        if let Some(root_id) = parent {
            sqlx::query("SELECT id FROM documents WHERE id = $1 FOR UPDATE")
                .bind(root_id)
                .fetch_one(&mut *tx)
                .await?;

            sqlx::query("DELETE FROM documents WHERE id = $1")
                .bind(id)
                .execute(&mut *tx)
                .await?;

            if was_latest {
                sqlx::query(
                    r#"
                    UPDATE documents
                    SET is_latest = TRUE
                    WHERE id = (
                        SELECT id FROM documents
                        WHERE id = $1 OR parent_document_id = $1
                        ORDER BY version DESC, created_at DESC
                        LIMIT 1
                    )
                    "#,
                )
                .bind(root_id)
                .execute(&mut *tx)
                .await?;
            }
        } else {
            // Chain head: cascade removes every version.
            sqlx::query("DELETE FROM documents WHERE id = $1")
                .bind(id)
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;
        Ok(true)
    }
}
