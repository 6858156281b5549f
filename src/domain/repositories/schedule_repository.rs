// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::schedule::Schedule;
use crate::domain::repositories::RepositoryError;
use async_trait::async_trait;
use chrono::{DateTime, FixedOffset};
use uuid::Uuid;

/// 更新调度计划时对 `next_run` 列的处理
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NextRunWrite {
    /// 保留存储中的 `next_run`
    Keep,
    /// 写入新的 `next_run`，前提是存储中的值仍为读取时的 `expected`
    Replace {
        expected: Option<DateTime<FixedOffset>>,
    },
}

/// 调度仓库特质
#[async_trait]
pub trait ScheduleRepository: Send + Sync {
    /// 创建调度计划
    async fn create(&self, schedule: &Schedule) -> Result<Schedule, RepositoryError>;
    /// 根据ID查找调度计划
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Schedule>, RepositoryError>;
    /// 列出调度计划
    async fn list(&self, source_id: Option<Uuid>) -> Result<Vec<Schedule>, RepositoryError>;
    /// 更新调度计划的定义字段
    ///
    /// `last_run` 永不写入，由调度器独占；`next_run` 按 `next_run` 参数处理。
    /// `Replace` 的前提不成立时返回 `Conflict`
    async fn update(
        &self,
        schedule: &Schedule,
        next_run: NextRunWrite,
    ) -> Result<Schedule, RepositoryError>;
    /// 删除调度计划，返回是否存在
    async fn delete(&self, id: Uuid) -> Result<bool, RepositoryError>;
    /// 查找已到期的启用计划（`next_run <= now`）
    async fn find_due(&self, now: DateTime<FixedOffset>) -> Result<Vec<Schedule>, RepositoryError>;
    /// 推进计划的运行时间
    ///
    /// 仅当存储中的 `next_run` 仍为 `expected_next_run` 时更新，
    /// 返回是否由本次调用完成推进。`now` 写入 `updated_at`
    async fn advance(
        &self,
        id: Uuid,
        now: DateTime<FixedOffset>,
        expected_next_run: DateTime<FixedOffset>,
        last_run: Option<DateTime<FixedOffset>>,
        next_run: DateTime<FixedOffset>,
    ) -> Result<bool, RepositoryError>;
}
