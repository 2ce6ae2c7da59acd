/// Database layer for SiteDesk
///
/// This module provides connection pooling and the migration runner; models
/// live in the `models` module at crate root level.
///
/// # Example
///
/// ```no_run
/// use sitedesk_shared::db::pool::{create_pool, DatabaseConfig};
/// use sitedesk_shared::db::migrations::run_migrations;
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let config = DatabaseConfig {
///         url: std::env::var("DATABASE_URL")?,
///         ..Default::default()
///     };
///
///     let pool = create_pool(config).await?;
///     run_migrations(&pool).await?;
///     Ok(())
/// }
/// ```

pub mod migrations;
pub mod pool;
