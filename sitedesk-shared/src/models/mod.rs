/// Database models for SiteDesk
///
/// This module contains all database models and their CRUD operations.
///
/// # Models
///
/// - `company`: Companies (the tenant boundary)
/// - `user`: User accounts synced from the identity provider
/// - `project`: Construction/engineering projects
/// - `membership`: Project memberships with project-scoped roles
/// - `document`: Project documents with version chains
/// - `task` / `subtask`: Project tasks and their checklist items
/// - `city_approval`: City-approval workflows and corrections
/// - `message`: Project message board
/// - `notification`: In-app notifications and per-user email preferences
///
/// # Example
///
/// ```no_run
/// use sitedesk_shared::models::project::{Project, CreateProject, ProjectStatus};
/// use sitedesk_shared::db::pool::{create_pool, DatabaseConfig};
/// use uuid::Uuid;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let pool = create_pool(DatabaseConfig::default()).await?;
///
/// let project = Project::create(&pool, CreateProject {
///     company_id: Uuid::new_v4(),
///     created_by: Some(Uuid::new_v4()),
///     name: "Riverside Office Complex".to_string(),
///     description: None,
///     address: Some("12 Riverside Dr".to_string()),
///     status: ProjectStatus::Planning,
///     start_date: None,
///     end_date: None,
/// }).await?;
/// # Ok(())
/// # }
/// ```

pub mod city_approval;
pub mod company;
pub mod document;
pub mod membership;
pub mod message;
pub mod notification;
pub mod project;
pub mod subtask;
pub mod task;
pub mod user;
