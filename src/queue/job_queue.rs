// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::crawl_outcome::CrawlSummary;
use crate::domain::models::queue_job::{
    on_failure, FailureTransition, JobFailure, JobPayload, JobPriority, JobStatus, QueueJob,
};
use crate::domain::repositories::job_repository::{JobQuery, JobRepository};
use crate::domain::repositories::{Page, RepositoryError};
use crate::utils::clock::Clock;
use crate::utils::retry_policy::RetryPolicy;
use async_trait::async_trait;
use chrono::{DateTime, FixedOffset};
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// 每次领取时检查的候选数量
const CLAIM_BATCH: u64 = 10;

/// 队列错误类型
#[derive(Error, Debug)]
pub enum QueueError {
    /// 仓库错误
    #[error("Repository error: {0}")]
    Repository(#[from] RepositoryError),

    /// 作业已不再由当前工作器持有（锁过期后被回收或已进入终态）
    #[error("Job {0} is no longer held by this worker")]
    LostClaim(Uuid),
}

/// 各状态的作业数量
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct QueueStats {
    pub queued: u64,
    pub running: u64,
    pub completed: u64,
    pub failed: u64,
}

/// 作业队列特质
#[async_trait]
pub trait JobQueue: Send + Sync {
    /// 入队作业
    async fn enqueue(&self, payload: JobPayload, priority: JobPriority)
        -> Result<QueueJob, QueueError>;

    /// 领取下一个作业：最高优先级中最早创建的、已到可执行时间的作业
    async fn take(&self, worker_id: Uuid) -> Result<Option<QueueJob>, QueueError>;

    /// 标记作业完成
    async fn complete(
        &self,
        job: &QueueJob,
        worker_id: Uuid,
        summary: &CrawlSummary,
    ) -> Result<(), QueueError>;

    /// 记录一次失败，按重试策略重新入队或永久失败
    async fn fail(
        &self,
        job: &QueueJob,
        worker_id: Uuid,
        failure: &JobFailure,
    ) -> Result<FailureTransition, QueueError>;

    /// 放回队列且不消耗尝试次数
    async fn release(&self, job: &QueueJob, worker_id: Uuid, delay: Duration)
        -> Result<(), QueueError>;

    /// 调度计划是否已有 queued/running 作业
    async fn has_active_for_schedule(&self, schedule_id: Uuid) -> Result<bool, QueueError>;

    /// 来源是否已有 queued/running 作业
    async fn has_active_for_source(&self, source_id: Uuid) -> Result<bool, QueueError>;

    /// 回收锁已过期的运行中作业
    async fn recover_stale(&self) -> Result<u64, QueueError>;

    async fn find(&self, id: Uuid) -> Result<Option<QueueJob>, QueueError>;

    async fn list(&self, query: JobQuery) -> Result<Page<QueueJob>, QueueError>;

    async fn stats(&self) -> Result<QueueStats, QueueError>;
}

/// 基于数据库的作业队列
///
/// 领取通过带前置条件的单条更新完成，是工作器之间唯一的同步点
pub struct DatabaseJobQueue {
    repository: Arc<dyn JobRepository>,
    policy: RetryPolicy,
    lock_grace: Duration,
    clock: Arc<dyn Clock>,
}

impl DatabaseJobQueue {
    /// 创建新的作业队列实例
    ///
    /// # 参数
    ///
    /// * `repository` - 作业仓库
    /// * `policy` - 失败重试策略
    /// * `lock_grace` - 作业锁在作业超时之外的额外保留时间
    /// * `clock` - 时钟
    pub fn new(
        repository: Arc<dyn JobRepository>,
        policy: RetryPolicy,
        lock_grace: Duration,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            repository,
            policy,
            lock_grace,
            clock,
        }
    }

    fn now(&self) -> DateTime<FixedOffset> {
        self.clock.now().into()
    }

    fn after(&self, delay: Duration) -> DateTime<FixedOffset> {
        let now = self.clock.now();
        let delay = chrono::Duration::from_std(delay).unwrap_or(chrono::Duration::days(36_500));
        now.checked_add_signed(delay).unwrap_or(now).into()
    }
}

#[async_trait]
impl JobQueue for DatabaseJobQueue {
    async fn enqueue(
        &self,
        payload: JobPayload,
        priority: JobPriority,
    ) -> Result<QueueJob, QueueError> {
        let job = QueueJob::new_crawl(payload, priority, self.policy.max_attempts, self.now());
        let created = self.repository.create(&job).await?;
        metrics::counter!("crawl_jobs_enqueued_total").increment(1);
        debug!(job_id = %created.id, source_id = %payload.source_id, ?priority, "Job enqueued");
        Ok(created)
    }

    async fn take(&self, worker_id: Uuid) -> Result<Option<QueueJob>, QueueError> {
        let now = self.now();
        let candidates = self.repository.find_claimable(now, CLAIM_BATCH).await?;

        for mut job in candidates {
            let job_timeout = Duration::from_millis(job.payload.params.timeout_ms);
            let lock_expires_at = self.after(job_timeout + self.lock_grace);

            if self
                .repository
                .try_claim(job.id, worker_id, now, lock_expires_at)
                .await?
            {
                job.status = JobStatus::Running;
                job.lock_token = Some(worker_id);
                job.lock_expires_at = Some(lock_expires_at);
                job.started_at = Some(now);
                job.updated_at = now;
                return Ok(Some(job));
            }
            // another worker won this one
        }

        Ok(None)
    }

    async fn complete(
        &self,
        job: &QueueJob,
        worker_id: Uuid,
        summary: &CrawlSummary,
    ) -> Result<(), QueueError> {
        if !self
            .repository
            .mark_completed(job.id, worker_id, summary, self.now())
            .await?
        {
            return Err(QueueError::LostClaim(job.id));
        }
        metrics::counter!("crawl_jobs_completed_total").increment(1);
        Ok(())
    }

    async fn fail(
        &self,
        job: &QueueJob,
        worker_id: Uuid,
        failure: &JobFailure,
    ) -> Result<FailureTransition, QueueError> {
        let transition = on_failure(job.attempt, job.max_attempts, failure.kind, &self.policy);
        let now = self.now();

        let applied = match transition {
            FailureTransition::Retry { attempt, delay } => {
                info!(
                    job_id = %job.id,
                    attempt,
                    delay_ms = delay.as_millis() as u64,
                    "Job failed, scheduling retry"
                );
                metrics::counter!("crawl_jobs_retried_total").increment(1);
                self.repository
                    .requeue(
                        job.id,
                        worker_id,
                        attempt,
                        self.after(delay),
                        &failure.message,
                        failure.kind,
                        now,
                    )
                    .await?
            }
            FailureTransition::GiveUp { attempt } => {
                warn!(job_id = %job.id, attempt, kind = %failure.kind, "Job failed permanently");
                metrics::counter!("crawl_jobs_failed_total").increment(1);
                self.repository
                    .mark_failed(job.id, worker_id, attempt, &failure.message, failure.kind, now)
                    .await?
            }
        };

        if !applied {
            return Err(QueueError::LostClaim(job.id));
        }
        Ok(transition)
    }

    async fn release(
        &self,
        job: &QueueJob,
        worker_id: Uuid,
        delay: Duration,
    ) -> Result<(), QueueError> {
        if !self
            .repository
            .release(job.id, worker_id, self.after(delay), self.now())
            .await?
        {
            return Err(QueueError::LostClaim(job.id));
        }
        Ok(())
    }

    async fn has_active_for_schedule(&self, schedule_id: Uuid) -> Result<bool, QueueError> {
        Ok(self.repository.has_active_for_schedule(schedule_id).await?)
    }

    async fn has_active_for_source(&self, source_id: Uuid) -> Result<bool, QueueError> {
        Ok(self.repository.has_active_for_source(source_id).await?)
    }

    async fn recover_stale(&self) -> Result<u64, QueueError> {
        let recovered = self.repository.reset_stale(self.now()).await?;
        if recovered > 0 {
            warn!("Recovered {} stale running jobs", recovered);
        }
        Ok(recovered)
    }

    async fn find(&self, id: Uuid) -> Result<Option<QueueJob>, QueueError> {
        Ok(self.repository.find_by_id(id).await?)
    }

    async fn list(&self, query: JobQuery) -> Result<Page<QueueJob>, QueueError> {
        Ok(self.repository.list(query).await?)
    }

    async fn stats(&self) -> Result<QueueStats, QueueError> {
        Ok(QueueStats {
            queued: self.repository.count_by_status(JobStatus::Queued).await?,
            running: self.repository.count_by_status(JobStatus::Running).await?,
            completed: self.repository.count_by_status(JobStatus::Completed).await?,
            failed: self.repository.count_by_status(JobStatus::Failed).await?,
        })
    }
}

#[async_trait]
impl<T: JobQueue + ?Sized> JobQueue for Arc<T> {
    async fn enqueue(
        &self,
        payload: JobPayload,
        priority: JobPriority,
    ) -> Result<QueueJob, QueueError> {
        (**self).enqueue(payload, priority).await
    }

    async fn take(&self, worker_id: Uuid) -> Result<Option<QueueJob>, QueueError> {
        (**self).take(worker_id).await
    }

    async fn complete(
        &self,
        job: &QueueJob,
        worker_id: Uuid,
        summary: &CrawlSummary,
    ) -> Result<(), QueueError> {
        (**self).complete(job, worker_id, summary).await
    }

    async fn fail(
        &self,
        job: &QueueJob,
        worker_id: Uuid,
        failure: &JobFailure,
    ) -> Result<FailureTransition, QueueError> {
        (**self).fail(job, worker_id, failure).await
    }

    async fn release(
        &self,
        job: &QueueJob,
        worker_id: Uuid,
        delay: Duration,
    ) -> Result<(), QueueError> {
        (**self).release(job, worker_id, delay).await
    }

    async fn has_active_for_schedule(&self, schedule_id: Uuid) -> Result<bool, QueueError> {
        (**self).has_active_for_schedule(schedule_id).await
    }

    async fn has_active_for_source(&self, source_id: Uuid) -> Result<bool, QueueError> {
        (**self).has_active_for_source(source_id).await
    }

    async fn recover_stale(&self) -> Result<u64, QueueError> {
        (**self).recover_stale().await
    }

    async fn find(&self, id: Uuid) -> Result<Option<QueueJob>, QueueError> {
        (**self).find(id).await
    }

    async fn list(&self, query: JobQuery) -> Result<Page<QueueJob>, QueueError> {
        (**self).list(query).await
    }

    async fn stats(&self) -> Result<QueueStats, QueueError> {
        (**self).stats().await
    }
}
