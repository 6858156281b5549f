use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(CrawlHistory::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(CrawlHistory::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(CrawlHistory::JobId).uuid())
                    .col(ColumnDef::new(CrawlHistory::SourceId).uuid().not_null())
                    .col(ColumnDef::new(CrawlHistory::ScheduleId).uuid())
                    .col(ColumnDef::new(CrawlHistory::Status).string().not_null())
                    .col(ColumnDef::new(CrawlHistory::Params).json().not_null())
                    .col(ColumnDef::new(CrawlHistory::Attempt).integer().not_null().default(0))
                    .col(ColumnDef::new(CrawlHistory::Found).integer().not_null().default(0))
                    .col(ColumnDef::new(CrawlHistory::Processed).integer().not_null().default(0))
                    .col(ColumnDef::new(CrawlHistory::NewArticles).integer().not_null().default(0))
                    .col(ColumnDef::new(CrawlHistory::Duplicates).integer().not_null().default(0))
                    .col(ColumnDef::new(CrawlHistory::Errors).integer().not_null().default(0))
                    .col(
                        ColumnDef::new(CrawlHistory::DurationMs)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(ColumnDef::new(CrawlHistory::Message).text().not_null())
                    .col(ColumnDef::new(CrawlHistory::ErrorKind).string())
                    .col(ColumnDef::new(CrawlHistory::Failures).json().not_null())
                    .col(
                        ColumnDef::new(CrawlHistory::StartedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(CrawlHistory::FinishedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_crawl_history_source_id")
                    .table(CrawlHistory::Table)
                    .col(CrawlHistory::SourceId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_crawl_history_job_id")
                    .table(CrawlHistory::Table)
                    .col(CrawlHistory::JobId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(OperationLogs::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(OperationLogs::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(OperationLogs::Operation).string().not_null())
                    .col(ColumnDef::new(OperationLogs::EntityType).string().not_null())
                    .col(ColumnDef::new(OperationLogs::EntityId).uuid())
                    .col(ColumnDef::new(OperationLogs::Status).string().not_null())
                    .col(ColumnDef::new(OperationLogs::Message).text().not_null())
                    .col(ColumnDef::new(OperationLogs::Details).json())
                    .col(
                        ColumnDef::new(OperationLogs::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(SelectorConfigs::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(SelectorConfigs::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(SelectorConfigs::Name)
                            .string()
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(SelectorConfigs::Description).text())
                    .col(ColumnDef::new(SelectorConfigs::Driver).string().not_null())
                    .col(ColumnDef::new(SelectorConfigs::Selectors).json().not_null())
                    .col(ColumnDef::new(SelectorConfigs::SampleUrl).text())
                    .col(
                        ColumnDef::new(SelectorConfigs::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(SelectorConfigs::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(SelectorConfigs::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(OperationLogs::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(CrawlHistory::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum CrawlHistory {
    Table,
    Id,
    JobId,
    SourceId,
    ScheduleId,
    Status,
    Params,
    Attempt,
    Found,
    Processed,
    NewArticles,
    Duplicates,
    Errors,
    DurationMs,
    Message,
    ErrorKind,
    Failures,
    StartedAt,
    FinishedAt,
}

#[derive(DeriveIden)]
enum OperationLogs {
    Table,
    Id,
    Operation,
    EntityType,
    EntityId,
    Status,
    Message,
    Details,
    CreatedAt,
}

#[derive(DeriveIden)]
enum SelectorConfigs {
    Table,
    Id,
    Name,
    Description,
    Driver,
    Selectors,
    SampleUrl,
    CreatedAt,
    UpdatedAt,
}
