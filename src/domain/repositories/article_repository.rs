// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::article::{Article, NewArticle};
use crate::domain::repositories::{Page, Pagination, RepositoryError};
use async_trait::async_trait;
use uuid::Uuid;

/// 去重写入结果
#[derive(Debug, Clone, PartialEq)]
pub enum DedupOutcome {
    /// 新文章，已写入
    Inserted(Article),
    /// 链接或哈希已存在，未写入
    Duplicate,
}

impl DedupOutcome {
    pub fn is_new(&self) -> bool {
        matches!(self, DedupOutcome::Inserted(_))
    }
}

/// 去重存储
///
/// 写入必须是单条原子操作：并发作业写入重叠候选时由存储层唯一约束裁决
#[async_trait]
pub trait DedupStore: Send + Sync {
    /// 检查并写入文章
    async fn check_and_insert(&self, article: NewArticle) -> Result<DedupOutcome, RepositoryError>;
}

/// 文章查询条件
#[derive(Debug, Clone, Default)]
pub struct ArticleQuery {
    pub source_id: Option<Uuid>,
    pub read: Option<bool>,
    pub pagination: Pagination,
}

/// 文章仓库特质
#[async_trait]
pub trait ArticleRepository: DedupStore {
    /// 根据ID查找文章
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Article>, RepositoryError>;
    /// 根据归一化链接查找文章
    async fn find_by_link(&self, link: &str) -> Result<Option<Article>, RepositoryError>;
    /// 分页查询文章，按创建时间倒序
    async fn list(&self, query: ArticleQuery) -> Result<Page<Article>, RepositoryError>;
    /// 设置已读标记
    async fn set_read(&self, id: Uuid, read: bool) -> Result<Option<Article>, RepositoryError>;
}
