// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::crawl_error::CrawlErrorKind;
use crate::domain::models::crawl_outcome::CrawlSummary;
use crate::domain::models::queue_job::{JobStatus, QueueJob};
use crate::domain::repositories::{Page, Pagination, RepositoryError};
use async_trait::async_trait;
use chrono::{DateTime, FixedOffset};
use uuid::Uuid;

/// 作业查询条件
#[derive(Debug, Clone, Default)]
pub struct JobQuery {
    pub status: Option<JobStatus>,
    pub source_id: Option<Uuid>,
    pub pagination: Pagination,
}

/// 作业仓库特质
///
/// 所有状态迁移都是带前置条件的单条更新，返回值表示前置条件是否成立
#[async_trait]
pub trait JobRepository: Send + Sync {
    /// 写入新作业
    async fn create(&self, job: &QueueJob) -> Result<QueueJob, RepositoryError>;
    /// 根据ID查找作业
    async fn find_by_id(&self, id: Uuid) -> Result<Option<QueueJob>, RepositoryError>;
    /// 按领取顺序（优先级降序、创建时间升序）列出可领取的作业
    async fn find_claimable(
        &self,
        now: DateTime<FixedOffset>,
        limit: u64,
    ) -> Result<Vec<QueueJob>, RepositoryError>;
    /// 原子领取：仅当作业仍为 queued 时置为 running
    async fn try_claim(
        &self,
        id: Uuid,
        token: Uuid,
        now: DateTime<FixedOffset>,
        lock_expires_at: DateTime<FixedOffset>,
    ) -> Result<bool, RepositoryError>;
    /// running → completed
    async fn mark_completed(
        &self,
        id: Uuid,
        token: Uuid,
        result: &CrawlSummary,
        now: DateTime<FixedOffset>,
    ) -> Result<bool, RepositoryError>;
    /// running → queued（重试），记录失败信息并设置下次可领取时间
    async fn requeue(
        &self,
        id: Uuid,
        token: Uuid,
        attempt: u32,
        available_at: DateTime<FixedOffset>,
        error: &str,
        kind: CrawlErrorKind,
        now: DateTime<FixedOffset>,
    ) -> Result<bool, RepositoryError>;
    /// running → failed
    async fn mark_failed(
        &self,
        id: Uuid,
        token: Uuid,
        attempt: u32,
        error: &str,
        kind: CrawlErrorKind,
        now: DateTime<FixedOffset>,
    ) -> Result<bool, RepositoryError>;
    /// running → queued，不消耗尝试次数
    async fn release(
        &self,
        id: Uuid,
        token: Uuid,
        available_at: DateTime<FixedOffset>,
        now: DateTime<FixedOffset>,
    ) -> Result<bool, RepositoryError>;
    /// 指定调度计划是否存在 queued/running 作业
    async fn has_active_for_schedule(&self, schedule_id: Uuid) -> Result<bool, RepositoryError>;
    /// 指定来源是否存在 queued/running 作业
    async fn has_active_for_source(&self, source_id: Uuid) -> Result<bool, RepositoryError>;
    /// 将锁已过期的 running 作业放回队列
    async fn reset_stale(&self, now: DateTime<FixedOffset>) -> Result<u64, RepositoryError>;
    /// 分页查询作业，按创建时间倒序
    async fn list(&self, query: JobQuery) -> Result<Page<QueueJob>, RepositoryError>;
    /// 按状态统计作业数量
    async fn count_by_status(&self, status: JobStatus) -> Result<u64, RepositoryError>;
}
