use askama::Template;
use axum::{
    Form, Router,
    extract::{Path, State},
    http::{HeaderName, HeaderValue, StatusCode},
    response::Html,
    routing::{get, post},
};
use serde::Deserialize;
use std::sync::Arc;

use crate::issue::{Issue, IssueStatus, IssueStore, ParseStatusError, StoreError};

const PAGE_TITLE: &str = "Taskusama | Issues";

#[derive(Debug, Deserialize)]
pub struct CreateIssueForm {
    #[serde(default)]
    title: String,
}

#[derive(Debug, Deserialize)]
pub struct SetStatusForm {
    #[serde(default)]
    status: String,
}

#[derive(Clone)]
pub struct IssueState {
    pub store: Arc<dyn IssueStore>,
}

/// Custom error type for issue handler operations.
#[derive(Debug, thiserror::Error)]
pub enum IssueError {
    /// The path segment was not an issue ID.
    #[error("bad id")]
    BadId,
    /// The posted status is not one of the known labels.
    #[error("bad status")]
    BadStatus(#[from] ParseStatusError),
    /// The posted title was blank.
    #[error("title is required")]
    MissingTitle,
    /// No issue has the requested ID.
    #[error("not found")]
    NotFound,
    /// Represents a failure of the underlying issue store.
    #[error("Issue store error")]
    Store(#[from] StoreError),
    /// Represents an error during template rendering.
    #[error("Template rendering failed")]
    Template(#[from] askama::Error),
}

impl axum::response::IntoResponse for IssueError {
    fn into_response(self) -> axum::response::Response {
        let status_code = match self {
            IssueError::BadId | IssueError::BadStatus(_) | IssueError::MissingTitle => {
                StatusCode::BAD_REQUEST
            }
            IssueError::NotFound => StatusCode::NOT_FOUND,
            IssueError::Store(_) | IssueError::Template(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let mut response = if status_code.is_server_error() {
            tracing::error!(error = ?self, "Issue request failed");
            let error_template = ErrorMessageTemplate::new(
                "An unexpected error occurred while processing your request. Please try again later."
                    .to_string(),
            );
            let Ok(rendered) = error_template.render() else {
                return StatusCode::INTERNAL_SERVER_ERROR.into_response();
            };
            (status_code, Html(rendered)).into_response()
        } else {
            tracing::debug!(error = ?self, "Rejected issue request");
            (status_code, self.to_string()).into_response()
        };

        // Point HTMX at the error area instead of the row being edited
        let headers = response.headers_mut();
        headers.insert(
            HeaderName::from_static("hx-retarget"),
            HeaderValue::from_static("#error-message"),
        );
        headers.insert(
            HeaderName::from_static("hx-reswap"),
            HeaderValue::from_static("innerHTML"),
        );
        response
    }
}

/// One status choice in a row's status picker.
#[derive(Debug, Clone)]
struct StatusOption {
    label: &'static str,
    selected: bool,
}

/// Issue prepared for display.
#[derive(Debug, Clone)]
struct IssueView {
    id: u32,
    title: String,
    status: String,
    created_at: String,
    created_at_rfc3339: String,
    status_options: Vec<StatusOption>,
}

impl From<Issue> for IssueView {
    fn from(issue: Issue) -> Self {
        let status_options = IssueStatus::ALL
            .into_iter()
            .map(|status| StatusOption {
                label: status.label(),
                selected: status == issue.status(),
            })
            .collect();
        Self {
            id: issue.id(),
            title: issue.title().to_string(),
            status: issue.status().to_string(),
            created_at: issue.created_at().format("%Y-%m-%d %H:%M").to_string(),
            created_at_rfc3339: issue.created_at().to_rfc3339(),
            status_options,
        }
    }
}

fn issue_views(issues: Vec<Issue>) -> Vec<IssueView> {
    issues.into_iter().map(IssueView::from).collect()
}

#[derive(Template)]
#[template(path = "issues/issues.html")]
struct IssuesTemplate {
    title: &'static str,
    issues: Vec<IssueView>,
}

impl IssuesTemplate {
    pub fn new(issues: Vec<IssueView>) -> Self {
        Self {
            title: PAGE_TITLE,
            issues,
        }
    }
}

#[derive(Template)]
#[template(path = "issues/issue_rows.html")]
struct IssueRowsTemplate {
    issues: Vec<IssueView>,
}

impl IssueRowsTemplate {
    pub fn new(issues: Vec<IssueView>) -> Self {
        Self { issues }
    }
}

#[derive(Template)]
#[template(path = "issues/issue_row.html")]
struct IssueRowTemplate {
    issue: IssueView,
}

impl IssueRowTemplate {
    pub fn new(issue: IssueView) -> Self {
        Self { issue }
    }
}

#[derive(Template)]
#[template(path = "issues/error_message.html")]
struct ErrorMessageTemplate {
    message: String,
}

impl ErrorMessageTemplate {
    pub fn new(message: String) -> Self {
        Self { message }
    }
}

/// Handler for GET /issues that renders the full issues page.
#[tracing::instrument(skip(state))]
async fn issues_handler(State(state): State<Arc<IssueState>>) -> Result<Html<String>, IssueError> {
    let issues = state.store.list().await?;
    let template = IssuesTemplate::new(issue_views(issues));
    template.render().map(Html).map_err(IssueError::from)
}

/// Handler for GET /issues/rows that returns only the table rows.
#[tracing::instrument(skip(state))]
async fn issue_rows_handler(
    State(state): State<Arc<IssueState>>,
) -> Result<Html<String>, IssueError> {
    let issues = state.store.list().await?;
    let template = IssueRowsTemplate::new(issue_views(issues));
    template.render().map(Html).map_err(IssueError::from)
}

/// Handler for POST /issues that creates an issue and returns its row.
#[tracing::instrument(skip(state))]
async fn create_issue_handler(
    State(state): State<Arc<IssueState>>,
    Form(form): Form<CreateIssueForm>,
) -> Result<Html<String>, IssueError> {
    let title = form.title.trim();
    if title.is_empty() {
        return Err(IssueError::MissingTitle);
    }

    let issue = state.store.create(title.to_string()).await?;
    tracing::info!(id = issue.id(), "Created issue");
    let template = IssueRowTemplate::new(issue.into());
    template.render().map(Html).map_err(IssueError::from)
}

/// Handler for POST /issues/{id}/status that changes an issue's status and returns its row.
#[tracing::instrument(skip(state))]
async fn set_status_handler(
    State(state): State<Arc<IssueState>>,
    Path(raw_id): Path<String>,
    Form(form): Form<SetStatusForm>,
) -> Result<Html<String>, IssueError> {
    let raw_id: i64 = raw_id.parse().map_err(|_| IssueError::BadId)?;
    let status: IssueStatus = form.status.parse()?;

    // Integers no issue could carry, such as negatives, are simply unknown
    let Ok(id) = u32::try_from(raw_id) else {
        tracing::debug!(id = raw_id, "No issue to update");
        return Err(IssueError::NotFound);
    };
    let Some(issue) = state.store.set_status(id, status).await? else {
        tracing::debug!(id, "No issue to update");
        return Err(IssueError::NotFound);
    };
    tracing::info!(id, %status, "Changed issue status");
    let template = IssueRowTemplate::new(issue.into());
    template.render().map(Html).map_err(IssueError::from)
}

/// Creates and returns the issue router with all issue-related routes.
pub fn create_issue_router(state: Arc<IssueState>) -> Router {
    Router::new()
        .route("/issues", get(issues_handler).post(create_issue_handler))
        .route("/issues/rows", get(issue_rows_handler))
        .route("/issues/{id}/status", post(set_status_handler))
        .with_state(state)
}
