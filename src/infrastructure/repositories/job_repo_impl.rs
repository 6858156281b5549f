// Copyright 2025 Kirky.X
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use crate::domain::models::crawl_error::CrawlErrorKind;
use crate::domain::models::crawl_outcome::CrawlSummary;
use crate::domain::models::queue_job::{JobPriority, JobStatus, QueueJob};
use crate::domain::repositories::job_repository::{JobQuery, JobRepository};
use crate::domain::repositories::{Page, RepositoryError};
use crate::infrastructure::database::entities::queue_job as job_entity;
use async_trait::async_trait;
use chrono::{DateTime, FixedOffset};
use sea_orm::{
    sea_query::Expr, ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Set,
};
use std::sync::Arc;
use uuid::Uuid;

/// 队列作业仓库实现
///
/// 领取与所有状态迁移都是带前置条件的 `UPDATE ... WHERE`，
/// 只有一个并发调用者能让前置条件成立
#[derive(Clone)]
pub struct JobRepositoryImpl {
    db: Arc<DatabaseConnection>,
}

impl JobRepositoryImpl {
    /// 创建新的作业仓库实例
    ///
    /// # 参数
    ///
    /// * `db` - 数据库连接
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// 清空锁字段的更新语句
    fn unlocked_update() -> sea_orm::UpdateMany<job_entity::Entity> {
        job_entity::Entity::update_many()
            .col_expr(job_entity::Column::LockToken, Expr::value(Option::<Uuid>::None))
            .col_expr(
                job_entity::Column::LockExpiresAt,
                Expr::value(Option::<DateTime<FixedOffset>>::None),
            )
    }
}

impl TryFrom<job_entity::Model> for QueueJob {
    type Error = RepositoryError;

    fn try_from(model: job_entity::Model) -> Result<Self, Self::Error> {
        let payload = serde_json::from_value(model.payload)
            .map_err(|e| RepositoryError::InvalidData(format!("job payload: {}", e)))?;
        let result = model
            .result
            .map(serde_json::from_value::<CrawlSummary>)
            .transpose()
            .map_err(|e| RepositoryError::InvalidData(format!("job result: {}", e)))?;

        Ok(Self {
            id: model.id,
            job_type: model.job_type.parse().unwrap_or_default(),
            priority: JobPriority::from_i32(model.priority),
            status: model.status.parse().map_err(|_| {
                RepositoryError::InvalidData(format!("unknown job status '{}'", model.status))
            })?,
            payload,
            attempt: model.attempt.max(0) as u32,
            max_attempts: model.max_attempts.max(1) as u32,
            available_at: model.available_at,
            lock_token: model.lock_token,
            lock_expires_at: model.lock_expires_at,
            last_error: model.last_error,
            error_kind: model.error_kind.and_then(|kind| kind.parse().ok()),
            result,
            created_at: model.created_at,
            started_at: model.started_at,
            completed_at: model.completed_at,
            failed_at: model.failed_at,
            updated_at: model.updated_at,
        })
    }
}

impl TryFrom<&QueueJob> for job_entity::ActiveModel {
    type Error = RepositoryError;

    fn try_from(job: &QueueJob) -> Result<Self, Self::Error> {
        let payload = serde_json::to_value(job.payload)
            .map_err(|e| RepositoryError::InvalidData(e.to_string()))?;
        let result = job
            .result
            .map(serde_json::to_value)
            .transpose()
            .map_err(|e| RepositoryError::InvalidData(e.to_string()))?;

        Ok(Self {
            id: Set(job.id),
            job_type: Set(job.job_type.to_string()),
            priority: Set(job.priority.as_i32()),
            status: Set(job.status.to_string()),
            payload: Set(payload),
            source_id: Set(job.payload.source_id),
            schedule_id: Set(job.payload.schedule_id),
            attempt: Set(job.attempt as i32),
            max_attempts: Set(job.max_attempts as i32),
            available_at: Set(job.available_at),
            lock_token: Set(job.lock_token),
            lock_expires_at: Set(job.lock_expires_at),
            last_error: Set(job.last_error.clone()),
            error_kind: Set(job.error_kind.map(|kind| kind.to_string())),
            result: Set(result),
            created_at: Set(job.created_at),
            started_at: Set(job.started_at),
            completed_at: Set(job.completed_at),
            failed_at: Set(job.failed_at),
            updated_at: Set(job.updated_at),
        })
    }
}

#[async_trait]
impl JobRepository for JobRepositoryImpl {
    async fn create(&self, job: &QueueJob) -> Result<QueueJob, RepositoryError> {
        let model: job_entity::ActiveModel = job.try_into()?;
        model.insert(self.db.as_ref()).await?.try_into()
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<QueueJob>, RepositoryError> {
        job_entity::Entity::find_by_id(id)
            .one(self.db.as_ref())
            .await?
            .map(QueueJob::try_from)
            .transpose()
    }

    async fn find_claimable(
        &self,
        now: DateTime<FixedOffset>,
        limit: u64,
    ) -> Result<Vec<QueueJob>, RepositoryError> {
        job_entity::Entity::find()
            .filter(job_entity::Column::Status.eq(JobStatus::Queued.to_string()))
            .filter(job_entity::Column::AvailableAt.lte(now))
            .order_by_desc(job_entity::Column::Priority)
            .order_by_asc(job_entity::Column::CreatedAt)
            .limit(limit)
            .all(self.db.as_ref())
            .await?
            .into_iter()
            .map(QueueJob::try_from)
            .collect()
    }

    async fn try_claim(
        &self,
        id: Uuid,
        token: Uuid,
        now: DateTime<FixedOffset>,
        lock_expires_at: DateTime<FixedOffset>,
    ) -> Result<bool, RepositoryError> {
        let result = job_entity::Entity::update_many()
            .col_expr(
                job_entity::Column::Status,
                Expr::value(JobStatus::Running.to_string()),
            )
            .col_expr(job_entity::Column::LockToken, Expr::value(Some(token)))
            .col_expr(
                job_entity::Column::LockExpiresAt,
                Expr::value(Some(lock_expires_at)),
            )
            .col_expr(job_entity::Column::StartedAt, Expr::value(Some(now)))
            .col_expr(job_entity::Column::UpdatedAt, Expr::value(now))
            .filter(job_entity::Column::Id.eq(id))
            .filter(job_entity::Column::Status.eq(JobStatus::Queued.to_string()))
            .exec(self.db.as_ref())
            .await?;

        Ok(result.rows_affected == 1)
    }

    async fn mark_completed(
        &self,
        id: Uuid,
        token: Uuid,
        result: &CrawlSummary,
        now: DateTime<FixedOffset>,
    ) -> Result<bool, RepositoryError> {
        let summary = serde_json::to_value(result)
            .map_err(|e| RepositoryError::InvalidData(e.to_string()))?;
        let result = Self::unlocked_update()
            .col_expr(
                job_entity::Column::Status,
                Expr::value(JobStatus::Completed.to_string()),
            )
            .col_expr(job_entity::Column::Result, Expr::value(Some(summary)))
            .col_expr(job_entity::Column::CompletedAt, Expr::value(Some(now)))
            .col_expr(job_entity::Column::UpdatedAt, Expr::value(now))
            .filter(job_entity::Column::Id.eq(id))
            .filter(job_entity::Column::Status.eq(JobStatus::Running.to_string()))
            .filter(job_entity::Column::LockToken.eq(token))
            .exec(self.db.as_ref())
            .await?;

        Ok(result.rows_affected == 1)
    }

    async fn requeue(
        &self,
        id: Uuid,
        token: Uuid,
        attempt: u32,
        available_at: DateTime<FixedOffset>,
        error: &str,
        kind: CrawlErrorKind,
        now: DateTime<FixedOffset>,
    ) -> Result<bool, RepositoryError> {
        let result = Self::unlocked_update()
            .col_expr(
                job_entity::Column::Status,
                Expr::value(JobStatus::Queued.to_string()),
            )
            .col_expr(job_entity::Column::Attempt, Expr::value(attempt as i32))
            .col_expr(job_entity::Column::AvailableAt, Expr::value(available_at))
            .col_expr(
                job_entity::Column::LastError,
                Expr::value(Some(error.to_string())),
            )
            .col_expr(
                job_entity::Column::ErrorKind,
                Expr::value(Some(kind.to_string())),
            )
            .col_expr(job_entity::Column::UpdatedAt, Expr::value(now))
            .filter(job_entity::Column::Id.eq(id))
            .filter(job_entity::Column::Status.eq(JobStatus::Running.to_string()))
            .filter(job_entity::Column::LockToken.eq(token))
            .exec(self.db.as_ref())
            .await?;

        Ok(result.rows_affected == 1)
    }

    async fn mark_failed(
        &self,
        id: Uuid,
        token: Uuid,
        attempt: u32,
        error: &str,
        kind: CrawlErrorKind,
        now: DateTime<FixedOffset>,
    ) -> Result<bool, RepositoryError> {
        let result = Self::unlocked_update()
            .col_expr(
                job_entity::Column::Status,
                Expr::value(JobStatus::Failed.to_string()),
            )
            .col_expr(job_entity::Column::Attempt, Expr::value(attempt as i32))
            .col_expr(
                job_entity::Column::LastError,
                Expr::value(Some(error.to_string())),
            )
            .col_expr(
                job_entity::Column::ErrorKind,
                Expr::value(Some(kind.to_string())),
            )
            .col_expr(job_entity::Column::FailedAt, Expr::value(Some(now)))
            .col_expr(job_entity::Column::UpdatedAt, Expr::value(now))
            .filter(job_entity::Column::Id.eq(id))
            .filter(job_entity::Column::Status.eq(JobStatus::Running.to_string()))
            .filter(job_entity::Column::LockToken.eq(token))
            .exec(self.db.as_ref())
            .await?;

        Ok(result.rows_affected == 1)
    }

    async fn release(
        &self,
        id: Uuid,
        token: Uuid,
        available_at: DateTime<FixedOffset>,
        now: DateTime<FixedOffset>,
    ) -> Result<bool, RepositoryError> {
        let result = Self::unlocked_update()
            .col_expr(
                job_entity::Column::Status,
                Expr::value(JobStatus::Queued.to_string()),
            )
            .col_expr(job_entity::Column::AvailableAt, Expr::value(available_at))
            .col_expr(job_entity::Column::UpdatedAt, Expr::value(now))
            .filter(job_entity::Column::Id.eq(id))
            .filter(job_entity::Column::Status.eq(JobStatus::Running.to_string()))
            .filter(job_entity::Column::LockToken.eq(token))
            .exec(self.db.as_ref())
            .await?;

        Ok(result.rows_affected == 1)
    }

    async fn has_active_for_schedule(&self, schedule_id: Uuid) -> Result<bool, RepositoryError> {
        let count = job_entity::Entity::find()
            .filter(job_entity::Column::ScheduleId.eq(schedule_id))
            .filter(job_entity::Column::Status.is_in(vec![
                JobStatus::Queued.to_string(),
                JobStatus::Running.to_string(),
            ]))
            .count(self.db.as_ref())
            .await?;
        Ok(count > 0)
    }

    async fn has_active_for_source(&self, source_id: Uuid) -> Result<bool, RepositoryError> {
        let count = job_entity::Entity::find()
            .filter(job_entity::Column::SourceId.eq(source_id))
            .filter(job_entity::Column::Status.is_in(vec![
                JobStatus::Queued.to_string(),
                JobStatus::Running.to_string(),
            ]))
            .count(self.db.as_ref())
            .await?;
        Ok(count > 0)
    }

    async fn reset_stale(&self, now: DateTime<FixedOffset>) -> Result<u64, RepositoryError> {
        let result = Self::unlocked_update()
            .col_expr(
                job_entity::Column::Status,
                Expr::value(JobStatus::Queued.to_string()),
            )
            .col_expr(job_entity::Column::AvailableAt, Expr::value(now))
            .col_expr(job_entity::Column::UpdatedAt, Expr::value(now))
            .filter(job_entity::Column::Status.eq(JobStatus::Running.to_string()))
            .filter(job_entity::Column::LockExpiresAt.lte(now))
            .exec(self.db.as_ref())
            .await?;

        Ok(result.rows_affected)
    }

    async fn list(&self, query: JobQuery) -> Result<Page<QueueJob>, RepositoryError> {
        let mut select = job_entity::Entity::find();
        if let Some(status) = query.status {
            select = select.filter(job_entity::Column::Status.eq(status.to_string()));
        }
        if let Some(source_id) = query.source_id {
            select = select.filter(job_entity::Column::SourceId.eq(source_id));
        }

        let total = select.clone().count(self.db.as_ref()).await?;
        let jobs = select
            .order_by_desc(job_entity::Column::CreatedAt)
            .offset(query.pagination.offset())
            .limit(query.pagination.per_page)
            .all(self.db.as_ref())
            .await?
            .into_iter()
            .map(QueueJob::try_from)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Page::new(jobs, total, query.pagination))
    }

    async fn count_by_status(&self, status: JobStatus) -> Result<u64, RepositoryError> {
        let count = job_entity::Entity::find()
            .filter(job_entity::Column::Status.eq(status.to_string()))
            .count(self.db.as_ref())
            .await?;
        Ok(count)
    }
}
