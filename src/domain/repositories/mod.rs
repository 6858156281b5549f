// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 仓库接口模块
///
/// 该模块定义了领域层的仓库接口，遵循依赖倒置原则。
/// 仓库接口定义了数据持久化的抽象契约，具体实现由基础设施层提供。
///
/// 包含的仓库接口：
/// - 来源仓库（source_repository）：管理新闻来源配置
/// - 文章仓库（article_repository）：文章查询与去重写入
/// - 调度仓库（schedule_repository）：管理cron调度计划及其推进
/// - 作业仓库（job_repository）：队列作业的持久化与原子领取
/// - 执行记录仓库（crawl_history_repository）：每次执行的统计记录
/// - 操作日志仓库（operation_log_repository）：操作审计日志
/// - 选择器配置仓库（selector_config_repository）：命名选择器集合
pub mod article_repository;
pub mod crawl_history_repository;
pub mod job_repository;
pub mod operation_log_repository;
pub mod schedule_repository;
pub mod selector_config_repository;
pub mod source_repository;

use sea_orm::DbErr;
use serde::Serialize;
use thiserror::Error;

/// 仓库错误类型
#[derive(Error, Debug)]
pub enum RepositoryError {
    /// 数据库错误
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
    /// 记录未找到
    #[error("Record not found")]
    NotFound,
    /// 唯一约束冲突
    #[error("Conflict: {0}")]
    Conflict(String),
    /// 存储中的数据无法还原为领域模型
    #[error("Invalid stored data: {0}")]
    InvalidData(String),
}

/// 分页参数
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    /// 页码，从1开始
    pub page: u64,
    /// 每页条数
    pub per_page: u64,
}

impl Pagination {
    pub const MAX_PER_PAGE: u64 = 200;

    pub fn new(page: Option<u64>, per_page: Option<u64>) -> Self {
        Self {
            page: page.unwrap_or(1).max(1),
            per_page: per_page.unwrap_or(20).clamp(1, Self::MAX_PER_PAGE),
        }
    }

    pub fn offset(&self) -> u64 {
        (self.page - 1) * self.per_page
    }
}

impl Default for Pagination {
    fn default() -> Self {
        Self::new(None, None)
    }
}

/// 分页结果
#[derive(Debug, Clone, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: u64,
    pub page: u64,
    pub per_page: u64,
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>, total: u64, pagination: Pagination) -> Self {
        Self {
            items,
            total,
            page: pagination.page,
            per_page: pagination.per_page,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pagination_clamps_inputs() {
        let p = Pagination::new(Some(0), Some(10_000));
        assert_eq!(p.page, 1);
        assert_eq!(p.per_page, Pagination::MAX_PER_PAGE);
        assert_eq!(Pagination::new(Some(3), Some(10)).offset(), 20);
    }
}
