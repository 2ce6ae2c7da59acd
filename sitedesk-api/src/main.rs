//! # SiteDesk API Server
//!
//! The HTTP entry point of SiteDesk: a multi-tenant project-management API
//! for AEC firms (projects, versioned documents, tasks, city approvals,
//! messaging, notifications).
//!
//! ## Startup sequence
//!
//! 1. Initialize tracing
//! 2. Load configuration from the environment
//! 3. Create the database pool and run migrations
//! 4. Wire the notifier (HTTP email provider when a key is configured)
//! 5. Serve until ctrl-c
//!
//! ## Usage
//!
//! ```bash
//! cargo run -p sitedesk-api
//! ```

use std::sync::Arc;

use sitedesk_api::app::{build_router, AppState};
use sitedesk_api::config::Config;
use sitedesk_shared::db::migrations::run_migrations;
use sitedesk_shared::db::pool::{create_pool, DatabaseConfig};
use sitedesk_shared::notify::email::{EmailProvider, HttpEmailProvider, NoopEmailProvider};
use sitedesk_shared::notify::Notifier;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "sitedesk_api=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!(
        "SiteDesk API Server v{} starting...",
        env!("CARGO_PKG_VERSION")
    );

    let config = Config::from_env()?;

    let pool = create_pool(DatabaseConfig {
        url: config.database.url.clone(),
        max_connections: config.database.max_connections,
        ..Default::default()
    })
    .await?;

    run_migrations(&pool).await?;

    let email_provider: Arc<dyn EmailProvider> = match &config.email.api_key {
        Some(api_key) => Arc::new(HttpEmailProvider::new(
            config.email.api_url.clone(),
            api_key.clone(),
            config.email.from.clone(),
        )),
        None => {
            tracing::info!("No EMAIL_API_KEY configured, outbound email disabled");
            Arc::new(NoopEmailProvider)
        }
    };
    let notifier = Notifier::new(pool.clone(), email_provider);

    let bind_address = config.bind_address();
    let state = AppState::new(pool, config, notifier);
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(&bind_address).await?;
    tracing::info!("Server listening on http://{}", bind_address);

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            tracing::info!("Shutdown signal received, exiting...");
        })
        .await?;

    Ok(())
}
