use async_trait::async_trait;
use chrono::Utc;
use sea_orm::*;

use super::{Issue, IssueStatus, IssueStore, StoreError};
use crate::entities::issue;

impl From<issue::Status> for IssueStatus {
    fn from(status: issue::Status) -> Self {
        match status {
            issue::Status::Todo => IssueStatus::Todo,
            issue::Status::InProgress => IssueStatus::InProgress,
            issue::Status::Done => IssueStatus::Done,
        }
    }
}

impl From<IssueStatus> for issue::Status {
    fn from(status: IssueStatus) -> Self {
        match status {
            IssueStatus::Todo => issue::Status::Todo,
            IssueStatus::InProgress => issue::Status::InProgress,
            IssueStatus::Done => issue::Status::Done,
        }
    }
}

impl From<issue::Model> for Issue {
    fn from(model: issue::Model) -> Self {
        Issue::new(
            model.id as u32,
            model.title,
            model.status.into(),
            model.created_at.with_timezone(&Utc),
        )
    }
}

/// Issue store backed by the `issues` table.
///
/// IDs come from the table's serial primary key and every statement runs
/// atomically in the database, so no extra locking happens here.
pub struct DbIssueStore {
    db: DatabaseConnection,
}

impl DbIssueStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl IssueStore for DbIssueStore {
    /// Retrieves all issues from the database, newest first.
    #[tracing::instrument(skip(self))]
    async fn list(&self) -> Result<Vec<Issue>, StoreError> {
        let issues = issue::Entity::find()
            .order_by_desc(issue::Column::CreatedAt)
            .order_by_desc(issue::Column::Id)
            .all(&self.db)
            .await?
            .into_iter()
            .map(Issue::from)
            .collect();
        Ok(issues)
    }

    /// Inserts a new `Todo` issue.
    #[tracing::instrument(skip(self))]
    async fn create(&self, title: String) -> Result<Issue, StoreError> {
        let active_model = issue::ActiveModel {
            title: ActiveValue::Set(title),
            status: ActiveValue::Set(issue::Status::Todo),
            created_at: ActiveValue::Set(Utc::now().fixed_offset()),
            ..Default::default()
        };
        let created_model = active_model.insert(&self.db).await?;
        Ok(Issue::from(created_model))
    }

    /// Updates only the status column of an existing issue.
    #[tracing::instrument(skip(self))]
    async fn set_status(
        &self,
        id: u32,
        status: IssueStatus,
    ) -> Result<Option<Issue>, StoreError> {
        let Ok(id) = i32::try_from(id) else {
            return Ok(None);
        };
        let Some(issue_to_update) = issue::Entity::find_by_id(id).one(&self.db).await? else {
            return Ok(None);
        };

        let mut active_model: issue::ActiveModel = issue_to_update.into();
        active_model.status = ActiveValue::Set(status.into());
        let updated_model = active_model.update(&self.db).await?;
        Ok(Some(Issue::from(updated_model)))
    }
}
