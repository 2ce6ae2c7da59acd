/// Application state and router builder
///
/// This module defines the shared application state and provides
/// a function to build the Axum router with all routes and middleware.
///
/// # Example
///
/// ```no_run
/// use std::sync::Arc;
/// use sitedesk_api::{app::AppState, config::Config};
/// use sitedesk_shared::notify::{email::NoopEmailProvider, Notifier};
/// use sqlx::PgPool;
///
/// # async fn example() -> anyhow::Result<()> {
/// let config = Config::from_env()?;
/// let pool = PgPool::connect(&config.database.url).await?;
/// let notifier = Notifier::new(pool.clone(), Arc::new(NoopEmailProvider));
/// let state = AppState::new(pool, config, notifier);
/// let app = sitedesk_api::app::build_router(state);
/// # Ok(())
/// # }
/// ```

use crate::{config::Config, middleware::security::SecurityHeadersLayer};
use axum::{
    extract::Request,
    http::{header, HeaderValue, Method},
    middleware::Next,
    response::Response,
    routing::get,
    Router,
};
use sitedesk_shared::auth::{identity::Identity, jwt};
use sitedesk_shared::notify::Notifier;
use sqlx::PgPool;
use std::sync::Arc;
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

/// Shared application state
///
/// This is cloned for each request handler via Axum's `State` extractor.
/// Uses Arc internally for cheap cloning.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool
    pub db: PgPool,

    /// Application configuration
    pub config: Arc<Config>,

    /// Notification/email dispatcher
    pub notifier: Arc<Notifier>,
}

impl AppState {
    /// Creates new application state
    pub fn new(db: PgPool, config: Config, notifier: Notifier) -> Self {
        Self {
            db,
            config: Arc::new(config),
            notifier: Arc::new(notifier),
        }
    }

    /// Gets JWT secret for token validation
    pub fn jwt_secret(&self) -> &str {
        &self.config.jwt.secret
    }
}

/// Builds the complete Axum router with all routes and middleware
///
/// # Architecture
///
/// ```text
/// /
/// ├── /health                        # Health check (public)
/// └── /api/                          # Authenticated resources
///     ├── /projects                  # GET ?id= | POST | PUT ?id= | DELETE ?id=
///     ├── /project-members           # GET ?project_id= | POST | PUT | DELETE
///     ├── /tasks                     # GET ?id=|?project_id= | POST | PUT | DELETE
///     ├── /subtasks
///     ├── /documents                 # POST uploads a version; GET ?id=&history=true
///     ├── /city-approvals
///     ├── /corrections
///     ├── /messages
///     ├── /notifications
///     ├── /notification-preferences
///     └── /users
/// ```
///
/// Every resource uses the uniform query-param addressed surface
/// (`GET /api/{resource}?id=&project_id=`, `POST`, `PUT ?id=`,
/// `DELETE ?id=`). All `/api` routes require a bearer token; the auth layer
/// resolves it into an [`Identity`] and inserts it into request extensions,
/// from where handlers take it as an explicit parameter.
///
/// # Middleware Stack
///
/// Applied in order (bottom to top):
/// 1. Logging (tower-http TraceLayer)
/// 2. CORS (tower-http CorsLayer; answers OPTIONS preflight)
/// 3. Security headers
pub fn build_router(state: AppState) -> Router {
    use crate::routes;

    // Health check (public, no auth)
    let health_routes = Router::new().route("/health", get(routes::health::health_check));

    let projects = Router::new().route(
        "/",
        get(routes::projects::get_projects)
            .post(routes::projects::create_project)
            .put(routes::projects::update_project)
            .delete(routes::projects::delete_project),
    );

    let project_members = Router::new().route(
        "/",
        get(routes::project_members::get_members)
            .post(routes::project_members::add_member)
            .put(routes::project_members::update_member_role)
            .delete(routes::project_members::remove_member),
    );

    let tasks = Router::new().route(
        "/",
        get(routes::tasks::get_tasks)
            .post(routes::tasks::create_task)
            .put(routes::tasks::update_task)
            .delete(routes::tasks::delete_task),
    );

    let subtasks = Router::new().route(
        "/",
        get(routes::subtasks::get_subtasks)
            .post(routes::subtasks::create_subtask)
            .put(routes::subtasks::update_subtask)
            .delete(routes::subtasks::delete_subtask),
    );

    let documents = Router::new().route(
        "/",
        get(routes::documents::get_documents)
            .post(routes::documents::upload_document)
            .put(routes::documents::rename_document)
            .delete(routes::documents::delete_document),
    );

    let city_approvals = Router::new().route(
        "/",
        get(routes::city_approvals::get_approvals)
            .post(routes::city_approvals::create_approval)
            .put(routes::city_approvals::update_approval)
            .delete(routes::city_approvals::delete_approval),
    );

    let corrections = Router::new().route(
        "/",
        get(routes::corrections::get_corrections)
            .post(routes::corrections::create_correction)
            .put(routes::corrections::resolve_correction)
            .delete(routes::corrections::delete_correction),
    );

    let messages = Router::new().route(
        "/",
        get(routes::messages::get_messages)
            .post(routes::messages::post_message)
            .delete(routes::messages::delete_message),
    );

    let notifications = Router::new().route(
        "/",
        get(routes::notifications::get_notifications)
            .put(routes::notifications::mark_read)
            .delete(routes::notifications::delete_notification),
    );

    let notification_preferences = Router::new().route(
        "/",
        get(routes::notification_preferences::get_preferences)
            .put(routes::notification_preferences::update_preferences),
    );

    let users = Router::new().route(
        "/",
        get(routes::users::get_users)
            .put(routes::users::update_user)
            .delete(routes::users::deactivate_user),
    );

    let api_routes = Router::new()
        .nest("/projects", projects)
        .nest("/project-members", project_members)
        .nest("/tasks", tasks)
        .nest("/subtasks", subtasks)
        .nest("/documents", documents)
        .nest("/city-approvals", city_approvals)
        .nest("/corrections", corrections)
        .nest("/messages", messages)
        .nest("/notifications", notifications)
        .nest("/notification-preferences", notification_preferences)
        .nest("/users", users)
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            jwt_auth_layer,
        ));

    // Configure CORS based on environment
    let cors = if state.config.api.cors_origins.contains(&"*".to_string()) {
        // Development mode: permissive CORS
        CorsLayer::permissive()
    } else {
        // Production mode: configure allowed origins
        let origins: Vec<HeaderValue> = state
            .config
            .api
            .cors_origins
            .iter()
            .filter_map(|origin| origin.parse().ok())
            .collect();

        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods([
                Method::GET,
                Method::POST,
                Method::PUT,
                Method::DELETE,
                Method::OPTIONS,
            ])
            .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
            .allow_credentials(true)
            .max_age(std::time::Duration::from_secs(3600))
    };

    // Combine all routes with middleware stack
    Router::new()
        .merge(health_routes)
        .nest("/api", api_routes)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(cors)
        .layer(SecurityHeadersLayer::new(state.config.api.production))
        .with_state(state)
}

/// JWT authentication middleware layer
///
/// Extracts and validates the bearer token from the Authorization header,
/// then inserts the resolved [`Identity`] into request extensions. Handlers
/// take the identity as an explicit `Extension<Identity>` parameter; nothing
/// downstream reads ambient auth state.
async fn jwt_auth_layer(
    state: axum::extract::State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, crate::error::ApiError> {
    let auth_header = req
        .headers()
        .get(axum::http::header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| {
            crate::error::ApiError::Unauthorized("Missing authorization header".to_string())
        })?;

    let token = auth_header.strip_prefix("Bearer ").ok_or_else(|| {
        crate::error::ApiError::Unauthorized("Expected Bearer token".to_string())
    })?;

    let claims = jwt::validate_token(token, state.jwt_secret())?;
    let identity = Identity::from_claims(&claims);

    req.extensions_mut().insert(identity);

    Ok(next.run(req).await)
}
