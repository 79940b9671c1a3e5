use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::fmt;
use std::str::FromStr;

pub mod db;
pub mod memory;
pub mod web;

pub use db::DbIssueStore;
pub use memory::MemoryIssueStore;

/// Workflow state of an issue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IssueStatus {
    Todo,
    InProgress,
    Done,
}

impl IssueStatus {
    /// Every status, in the order they are offered to users.
    pub const ALL: [IssueStatus; 3] = [
        IssueStatus::Todo,
        IssueStatus::InProgress,
        IssueStatus::Done,
    ];

    /// Returns the canonical label used in forms, HTML and the database.
    pub fn label(&self) -> &'static str {
        match self {
            IssueStatus::Todo => "Todo",
            IssueStatus::InProgress => "In Progress",
            IssueStatus::Done => "Done",
        }
    }
}

impl fmt::Display for IssueStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Raised when text does not name one of the known statuses.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown issue status '{0}'")]
pub struct ParseStatusError(pub String);

impl FromStr for IssueStatus {
    type Err = ParseStatusError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        IssueStatus::ALL
            .into_iter()
            .find(|status| status.label() == s)
            .ok_or_else(|| ParseStatusError(s.to_string()))
    }
}

#[derive(Debug, PartialEq, Clone, Eq, Hash)]
pub struct Issue {
    id: u32,
    title: String,
    status: IssueStatus,
    created_at: DateTime<Utc>,
}

impl Issue {
    pub fn new(id: u32, title: String, status: IssueStatus, created_at: DateTime<Utc>) -> Self {
        Self {
            id,
            title,
            status,
            created_at,
        }
    }

    /// Returns the ID of the issue.
    pub fn id(&self) -> u32 {
        self.id
    }

    /// Returns the title of the issue.
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Returns the current status of the issue.
    pub fn status(&self) -> IssueStatus {
        self.status
    }

    /// Returns when the issue was created.
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub(crate) fn set_status(&mut self, status: IssueStatus) {
        self.status = status;
    }
}

/// Error type for IssueStore operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Represents a database error.
    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),
    /// Every issue ID has already been handed out.
    #[error("No issue IDs left to assign")]
    IdsExhausted,
}

/// Authoritative collection of issues.
///
/// Implementations serialize access to their state; callers only ever
/// receive owned snapshots.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait IssueStore: Send + Sync {
    /// Returns every issue, newest first.
    async fn list(&self) -> Result<Vec<Issue>, StoreError>;

    /// Creates a `Todo` issue with the next ID. The title is stored as given.
    async fn create(&self, title: String) -> Result<Issue, StoreError>;

    /// Changes the status of the issue with `id`.
    ///
    /// # Returns
    ///
    /// `Some` with the updated issue, or `None` if no issue has that ID.
    async fn set_status(
        &self,
        id: u32,
        status: IssueStatus,
    ) -> Result<Option<Issue>, StoreError>;
}
