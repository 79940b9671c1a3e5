use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

const IDX_ISSUES_CREATED_AT: &str = "idx_issues_created_at";

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_index(
                Index::create()
                    .name(IDX_ISSUES_CREATED_AT)
                    .table(Issues::Table)
                    .col(Issues::CreatedAt)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(
                Index::drop()
                    .name(IDX_ISSUES_CREATED_AT)
                    .table(Issues::Table)
                    .to_owned(),
            )
            .await
    }
}

#[derive(DeriveIden)]
enum Issues {
    Table,
    CreatedAt,
}
