use sea_orm_migration::prelude::*;

use super::m20251220_000001_create_sources_and_articles::NewsSources;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Schedules::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Schedules::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Schedules::SourceId).uuid().not_null())
                    .col(ColumnDef::new(Schedules::CronExpression).string().not_null())
                    .col(
                        ColumnDef::new(Schedules::Active)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(ColumnDef::new(Schedules::MaxDepth).integer().not_null().default(0))
                    .col(
                        ColumnDef::new(Schedules::ArticleLimit)
                            .integer()
                            .not_null()
                            .default(20),
                    )
                    .col(ColumnDef::new(Schedules::TimeoutMs).big_integer().not_null())
                    .col(
                        ColumnDef::new(Schedules::FullContent)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(Schedules::FollowLinks)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(ColumnDef::new(Schedules::LastRun).timestamp_with_time_zone())
                    .col(ColumnDef::new(Schedules::NextRun).timestamp_with_time_zone())
                    .col(
                        ColumnDef::new(Schedules::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Schedules::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_schedules_source_id")
                            .from(Schedules::Table, Schedules::SourceId)
                            .to(NewsSources::Table, NewsSources::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_schedules_active_next_run")
                    .table(Schedules::Table)
                    .col(Schedules::Active)
                    .col(Schedules::NextRun)
                    .to_owned(),
            )
            .await?;

        // queue_jobs is kept free of foreign keys so that rows outlive their source for audit
        manager
            .create_table(
                Table::create()
                    .table(QueueJobs::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(QueueJobs::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(QueueJobs::JobType).string().not_null())
                    .col(ColumnDef::new(QueueJobs::Priority).integer().not_null().default(1))
                    .col(ColumnDef::new(QueueJobs::Status).string().not_null())
                    .col(ColumnDef::new(QueueJobs::Payload).json().not_null())
                    .col(ColumnDef::new(QueueJobs::SourceId).uuid().not_null())
                    .col(ColumnDef::new(QueueJobs::ScheduleId).uuid())
                    .col(ColumnDef::new(QueueJobs::Attempt).integer().not_null().default(0))
                    .col(
                        ColumnDef::new(QueueJobs::MaxAttempts)
                            .integer()
                            .not_null()
                            .default(3),
                    )
                    .col(
                        ColumnDef::new(QueueJobs::AvailableAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(ColumnDef::new(QueueJobs::LockToken).uuid())
                    .col(ColumnDef::new(QueueJobs::LockExpiresAt).timestamp_with_time_zone())
                    .col(ColumnDef::new(QueueJobs::LastError).text())
                    .col(ColumnDef::new(QueueJobs::ErrorKind).string())
                    .col(ColumnDef::new(QueueJobs::Result).json())
                    .col(
                        ColumnDef::new(QueueJobs::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(ColumnDef::new(QueueJobs::StartedAt).timestamp_with_time_zone())
                    .col(ColumnDef::new(QueueJobs::CompletedAt).timestamp_with_time_zone())
                    .col(ColumnDef::new(QueueJobs::FailedAt).timestamp_with_time_zone())
                    .col(
                        ColumnDef::new(QueueJobs::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_queue_jobs_claim")
                    .table(QueueJobs::Table)
                    .col(QueueJobs::Status)
                    .col(QueueJobs::Priority)
                    .col(QueueJobs::CreatedAt)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_queue_jobs_schedule_id")
                    .table(QueueJobs::Table)
                    .col(QueueJobs::ScheduleId)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(QueueJobs::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Schedules::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Schedules {
    Table,
    Id,
    SourceId,
    CronExpression,
    Active,
    MaxDepth,
    ArticleLimit,
    TimeoutMs,
    FullContent,
    FollowLinks,
    LastRun,
    NextRun,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum QueueJobs {
    Table,
    Id,
    JobType,
    Priority,
    Status,
    Payload,
    SourceId,
    ScheduleId,
    Attempt,
    MaxAttempts,
    AvailableAt,
    LockToken,
    LockExpiresAt,
    LastError,
    ErrorKind,
    Result,
    CreatedAt,
    StartedAt,
    CompletedAt,
    FailedAt,
    UpdatedAt,
}
