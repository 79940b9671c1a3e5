use sea_orm::{ActiveModelTrait, ActiveValue, DatabaseConnection};
use std::collections::HashSet;
use std::sync::Arc;
use taskusama_server::entities::issue;
use taskusama_server::issue::{DbIssueStore, IssueStatus, IssueStore};
use testcontainers_modules::{postgres, testcontainers};

mod common;

pub struct TestContext {
    #[allow(dead_code)] // container is kept to ensure it's not dropped
    pub container: testcontainers::ContainerAsync<postgres::Postgres>,
    pub db: DatabaseConnection,
}

async fn setup() -> anyhow::Result<TestContext> {
    // Allow multiple calls to init for tests.
    let _ = tracing_subscriber::fmt().try_init();
    let container = common::setup_container().await?;
    let db = common::setup_db(&container).await?;
    Ok(TestContext { db, container })
}

/// Inserts an issue directly through the entity, bypassing the store.
async fn insert_issue(db: &DatabaseConnection, title: &str, status: issue::Status) -> i32 {
    let active_model = issue::ActiveModel {
        title: ActiveValue::Set(title.to_string()),
        status: ActiveValue::Set(status),
        ..Default::default()
    };
    active_model.insert(db).await.unwrap().id
}

#[tokio::test]
#[ignore = "requires a Docker daemon"]
async fn can_handle_empty_issues_list() {
    let state = setup().await.expect("Failed to setup test context");
    let store = DbIssueStore::new(state.db.clone());

    let issues = store.list().await.expect("Failed to list issues");

    assert!(issues.is_empty());
}

#[tokio::test]
#[ignore = "requires a Docker daemon"]
async fn can_create_issue_with_todo_status() {
    let state = setup().await.expect("Failed to setup test context");
    let store = DbIssueStore::new(state.db.clone());

    let first = store.create("First".to_string()).await.unwrap();
    let second = store.create("Second".to_string()).await.unwrap();

    assert_eq!(first.title(), "First");
    assert_eq!(first.status(), IssueStatus::Todo);
    assert!(second.id() > first.id());
}

#[tokio::test]
#[ignore = "requires a Docker daemon"]
async fn can_list_newest_first() {
    let state = setup().await.expect("Failed to setup test context");
    let store = DbIssueStore::new(state.db.clone());

    let first = store.create("First".to_string()).await.unwrap();
    let second = store.create("Second".to_string()).await.unwrap();
    let third = store.create("Third".to_string()).await.unwrap();

    let ids: Vec<u32> = store
        .list()
        .await
        .unwrap()
        .iter()
        .map(|issue| issue.id())
        .collect();
    assert_eq!(ids, vec![third.id(), second.id(), first.id()]);
}

#[tokio::test]
#[ignore = "requires a Docker daemon"]
async fn can_update_status_of_existing_issue() {
    let state = setup().await.expect("Failed to setup test context");
    let store = DbIssueStore::new(state.db.clone());
    let id = insert_issue(&state.db, "Stored", issue::Status::Todo).await;

    let updated = store
        .set_status(id as u32, IssueStatus::InProgress)
        .await
        .unwrap()
        .expect("issue should exist");

    assert_eq!(updated.id(), id as u32);
    assert_eq!(updated.title(), "Stored");
    assert_eq!(updated.status(), IssueStatus::InProgress);

    let listed = store.list().await.unwrap();
    assert_eq!(listed, vec![updated]);
}

#[tokio::test]
#[ignore = "requires a Docker daemon"]
async fn can_handle_status_update_when_issue_not_found() {
    let state = setup().await.expect("Failed to setup test context");
    let store = DbIssueStore::new(state.db.clone());
    let id = insert_issue(&state.db, "Only one", issue::Status::Done).await;
    let before = store.list().await.unwrap();

    let result = store
        .set_status(id as u32 + 1, IssueStatus::Todo)
        .await
        .unwrap();

    assert_eq!(result, None);
    assert_eq!(store.list().await.unwrap(), before);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
#[ignore = "requires a Docker daemon"]
async fn can_create_concurrently_with_distinct_ids() {
    let state = setup().await.expect("Failed to setup test context");
    let store: Arc<dyn IssueStore> = Arc::new(DbIssueStore::new(state.db.clone()));
    let tasks = 20;

    let handles: Vec<_> = (0..tasks)
        .map(|n| {
            let store = store.clone();
            tokio::spawn(async move { store.create(format!("Task {n}")).await })
        })
        .collect();

    let mut created = HashSet::new();
    for handle in handles {
        let issue = handle.await.unwrap().expect("Failed to create issue");
        assert!(created.insert(issue.id()), "duplicate id {}", issue.id());
    }

    let listed: HashSet<u32> = store
        .list()
        .await
        .unwrap()
        .iter()
        .map(|issue| issue.id())
        .collect();
    assert_eq!(created.len(), tasks);
    assert_eq!(listed, created);
}
