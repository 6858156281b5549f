// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 仓库实现模块
///
/// 提供领域仓库接口基于SeaORM的具体实现
pub mod article_repo_impl;
pub mod crawl_history_repo_impl;
pub mod job_repo_impl;
pub mod operation_log_repo_impl;
pub mod schedule_repo_impl;
pub mod selector_config_repo_impl;
pub mod source_repo_impl;

use crate::domain::repositories::article_repository::{ArticleRepository, DedupStore};
use crate::domain::repositories::crawl_history_repository::CrawlHistoryRepository;
use crate::domain::repositories::job_repository::JobRepository;
use crate::domain::repositories::operation_log_repository::OperationLogRepository;
use crate::domain::repositories::schedule_repository::ScheduleRepository;
use crate::domain::repositories::selector_config_repository::SelectorConfigRepository;
use crate::domain::repositories::source_repository::SourceRepository;
use sea_orm::{DatabaseConnection, DbErr, SqlErr};
use std::sync::Arc;

/// 基于同一数据库连接的全部仓库实现
#[derive(Clone)]
pub struct Repositories {
    pub sources: Arc<dyn SourceRepository>,
    pub articles: Arc<dyn ArticleRepository>,
    /// 与 `articles` 为同一实例，供抓取流水线去重写入
    pub dedup: Arc<dyn DedupStore>,
    pub schedules: Arc<dyn ScheduleRepository>,
    pub jobs: Arc<dyn JobRepository>,
    pub history: Arc<dyn CrawlHistoryRepository>,
    pub operations: Arc<dyn OperationLogRepository>,
    pub selector_configs: Arc<dyn SelectorConfigRepository>,
}

impl Repositories {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        let articles = Arc::new(article_repo_impl::ArticleRepositoryImpl::new(db.clone()));
        Self {
            sources: Arc::new(source_repo_impl::SourceRepositoryImpl::new(db.clone())),
            articles: articles.clone(),
            dedup: articles,
            schedules: Arc::new(schedule_repo_impl::ScheduleRepositoryImpl::new(db.clone())),
            jobs: Arc::new(job_repo_impl::JobRepositoryImpl::new(db.clone())),
            history: Arc::new(crawl_history_repo_impl::CrawlHistoryRepositoryImpl::new(
                db.clone(),
            )),
            operations: Arc::new(operation_log_repo_impl::OperationLogRepositoryImpl::new(
                db.clone(),
            )),
            selector_configs: Arc::new(
                selector_config_repo_impl::SelectorConfigRepositoryImpl::new(db),
            ),
        }
    }
}

/// 是否为唯一约束冲突
pub(crate) fn is_unique_violation(err: &DbErr) -> bool {
    matches!(err.sql_err(), Some(SqlErr::UniqueConstraintViolation(_)))
}
