use askama::Template;
use axum::http::{HeaderName, StatusCode, header};
use axum::response::{Html, IntoResponse, Json};
use axum::{Router, routing::get};
use migration::MigratorTrait;
use sea_orm::Database;
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::config::{self, Config};
use crate::issue::web::{IssueState, create_issue_router};
use crate::issue::{DbIssueStore, IssueStore, MemoryIssueStore};

/// Custom error type for web handler operations.
#[derive(Debug, thiserror::Error)]
pub enum WebError {
    /// Represents an error during template rendering.
    /// The specific `askama::Error` is captured as the source of this error.
    #[error("Template rendering failed")]
    Template(#[from] askama::Error),
}

impl IntoResponse for WebError {
    fn into_response(self) -> axum::response::Response {
        tracing::error!(error = ?self, "Web request failed");
        let user_facing_error_message =
            "An unexpected error occurred while processing your request. Please try again later.";
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Html(format!(
                "<h1>Internal Server Error</h1><p>{}</p>",
                user_facing_error_message
            )),
        )
            .into_response()
    }
}

/// Builds the issue store selected by `config`.
///
/// With a database URL the store is Postgres-backed and pending migrations
/// are applied first; otherwise issues live in memory for the life of the process.
#[tracing::instrument(skip(config))]
pub async fn connect_issue_store(config: &Config) -> anyhow::Result<Arc<dyn IssueStore>> {
    let Some(db_url) = config.database_url() else {
        tracing::info!(
            seed_fixtures = config.seed_fixtures,
            "No database configured, keeping issues in memory"
        );
        let store = if config.seed_fixtures {
            MemoryIssueStore::with_fixtures()
        } else {
            MemoryIssueStore::new()
        };
        return Ok(Arc::new(store));
    };

    let db = Database::connect(db_url).await?;
    db.ping().await?;

    let pending = migration::Migrator::get_pending_migrations(&db).await?;
    if pending.is_empty() {
        tracing::info!("Database migrations up-to-date");
    } else {
        migration::Migrator::up(&db, None).await?;
        tracing::info!(count = pending.len(), "Database migrations applied successfully");
    }

    Ok(Arc::new(DbIssueStore::new(db)))
}

/// Creates the application router around an issue store.
pub fn create_app(store: Arc<dyn IssueStore>) -> Router {
    let issue_state = Arc::new(IssueState { store });

    Router::new()
        .route("/health", get(health_check_handler))
        .route("/", get(index_handler))
        .merge(create_issue_router(issue_state))
        .fallback(not_found_handler)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::new().expose_headers([
                    HeaderName::from_static("hx-retarget"),
                    HeaderName::from_static("hx-reswap"),
                ])),
        )
}

#[tracing::instrument(skip(config))]
pub async fn start_web_server(config: config::Config) -> anyhow::Result<()> {
    let store = connect_issue_store(&config).await?;
    let app = create_app(store);

    let server_address = format!("0.0.0.0:{}", &config.port);
    let listener = tokio::net::TcpListener::bind(&server_address).await?;
    tracing::info!("Web server running on http://{}", server_address);

    axum::serve(listener, app).await?;
    Ok(())
}

#[tracing::instrument]
pub async fn health_check_handler() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}

#[tracing::instrument]
pub async fn index_handler() -> impl IntoResponse {
    (StatusCode::FOUND, [(header::LOCATION, "/issues")])
}

#[tracing::instrument]
pub async fn not_found_handler() -> Result<(StatusCode, Html<String>), WebError> {
    let template = NotFoundTemplate;
    let rendered = template.render()?;
    Ok((StatusCode::NOT_FOUND, Html(rendered)))
}

#[derive(Template)]
#[template(path = "not_found.html")]
struct NotFoundTemplate;
