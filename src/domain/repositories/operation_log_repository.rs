// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::crawl_history::OperationLog;
use crate::domain::repositories::{Page, Pagination, RepositoryError};
use async_trait::async_trait;

/// 操作日志仓库特质
#[async_trait]
pub trait OperationLogRepository: Send + Sync {
    /// 追加一条操作日志
    async fn create(&self, log: &OperationLog) -> Result<OperationLog, RepositoryError>;
    /// 分页查询，按时间倒序
    async fn list(&self, pagination: Pagination) -> Result<Page<OperationLog>, RepositoryError>;
}
