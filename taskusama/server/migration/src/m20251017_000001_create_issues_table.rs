use sea_orm_migration::prelude::*;
use sea_orm_migration::schema::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

/// Longest status label stored in `issues.status` is "In Progress".
const STATUS_MAX_LEN: u32 = 16;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Issues::Table)
                    .if_not_exists()
                    .col(pk_auto(Issues::Id))
                    .col(string(Issues::Title))
                    .col(string_len(Issues::Status, STATUS_MAX_LEN).default("Todo"))
                    .col(
                        timestamp_with_time_zone(Issues::CreatedAt)
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Issues::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Issues {
    Table,
    Id,
    Title,
    Status,
    CreatedAt,
}
