use async_trait::async_trait;
use chrono::{Duration, Utc};
use std::collections::VecDeque;
use std::sync::{Mutex, MutexGuard, PoisonError};

use super::{Issue, IssueStatus, IssueStore, StoreError};

struct Inner {
    /// `None` once `u32::MAX` has been handed out.
    next_id: Option<u32>,
    /// Newest issue at the front.
    issues: VecDeque<Issue>,
}

/// Issue store kept entirely in process memory.
///
/// A single mutex guards both the issues and the ID counter, and every
/// operation holds it for its whole body.
pub struct MemoryIssueStore {
    inner: Mutex<Inner>,
}

impl MemoryIssueStore {
    /// Creates an empty store whose first issue gets ID 1.
    pub fn new() -> Self {
        Self::with_issues(Vec::new())
    }

    /// Creates a store holding `issues`, which must already be ordered newest first.
    ///
    /// The next ID handed out is one past the largest ID present.
    pub fn with_issues(issues: Vec<Issue>) -> Self {
        let next_id = match issues.iter().map(Issue::id).max() {
            Some(max_id) => max_id.checked_add(1),
            None => Some(1),
        };
        Self {
            inner: Mutex::new(Inner {
                next_id,
                issues: issues.into(),
            }),
        }
    }

    /// Creates a store pre-populated with three sample issues, so the next ID is 4.
    pub fn with_fixtures() -> Self {
        let now = Utc::now();
        Self::with_issues(vec![
            Issue::new(
                3,
                "Add Postgres schema".to_string(),
                IssueStatus::Todo,
                now,
            ),
            Issue::new(
                2,
                "Wire axum + templates".to_string(),
                IssueStatus::InProgress,
                now - Duration::hours(2),
            ),
            Issue::new(
                1,
                "Create repo".to_string(),
                IssueStatus::Done,
                now - Duration::hours(48),
            ),
        ])
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        // No operation leaves Inner half-updated, so a poisoned lock is still usable.
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Returns a copy of every issue, newest first.
    #[tracing::instrument(skip(self))]
    pub fn list(&self) -> Vec<Issue> {
        self.lock().issues.iter().cloned().collect()
    }

    /// Creates a `Todo` issue with the next ID and places it first in the list.
    ///
    /// # Errors
    ///
    /// [`StoreError::IdsExhausted`] once `u32::MAX` has been assigned. The store
    /// is left unchanged.
    #[tracing::instrument(skip(self))]
    pub fn create(&self, title: String) -> Result<Issue, StoreError> {
        let mut inner = self.lock();
        let id = inner.next_id.ok_or(StoreError::IdsExhausted)?;
        let issue = Issue::new(id, title, IssueStatus::Todo, Utc::now());
        inner.next_id = id.checked_add(1);
        inner.issues.push_front(issue.clone());
        Ok(issue)
    }

    /// Changes the status of the issue with `id` in place.
    ///
    /// # Returns
    ///
    /// The updated issue, or `None` if no issue has that ID.
    #[tracing::instrument(skip(self))]
    pub fn set_status(&self, id: u32, status: IssueStatus) -> Option<Issue> {
        let mut inner = self.lock();
        let issue = inner.issues.iter_mut().find(|issue| issue.id() == id)?;
        issue.set_status(status);
        Some(issue.clone())
    }
}

impl Default for MemoryIssueStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl IssueStore for MemoryIssueStore {
    async fn list(&self) -> Result<Vec<Issue>, StoreError> {
        Ok(MemoryIssueStore::list(self))
    }

    async fn create(&self, title: String) -> Result<Issue, StoreError> {
        MemoryIssueStore::create(self, title)
    }

    async fn set_status(
        &self,
        id: u32,
        status: IssueStatus,
    ) -> Result<Option<Issue>, StoreError> {
        Ok(MemoryIssueStore::set_status(self, id, status))
    }
}
