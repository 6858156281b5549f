// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::crawl_history::{CrawlHistory, RunStatus};
use crate::domain::repositories::{Page, Pagination, RepositoryError};
use async_trait::async_trait;
use uuid::Uuid;

/// 执行记录查询条件
#[derive(Debug, Clone, Default)]
pub struct HistoryQuery {
    pub source_id: Option<Uuid>,
    pub job_id: Option<Uuid>,
    pub status: Option<RunStatus>,
    pub pagination: Pagination,
}

/// 执行记录仓库特质
#[async_trait]
pub trait CrawlHistoryRepository: Send + Sync {
    /// 追加一条执行记录
    async fn create(&self, record: &CrawlHistory) -> Result<CrawlHistory, RepositoryError>;
    /// 根据ID查找记录
    async fn find_by_id(&self, id: Uuid) -> Result<Option<CrawlHistory>, RepositoryError>;
    /// 分页查询记录，按开始时间倒序
    async fn list(&self, query: HistoryQuery) -> Result<Page<CrawlHistory>, RepositoryError>;
    /// 删除记录，返回是否存在
    async fn delete(&self, id: Uuid) -> Result<bool, RepositoryError>;
}
