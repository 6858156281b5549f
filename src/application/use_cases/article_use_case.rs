// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::application::dto::query_request::ArticleQueryDto;
use crate::application::use_cases::UseCaseError;
use crate::domain::models::article::Article;
use crate::domain::repositories::article_repository::{ArticleQuery, ArticleRepository};
use crate::domain::repositories::{Page, Pagination};
use std::sync::Arc;
use uuid::Uuid;

/// 文章查询用例
pub struct ArticleUseCase {
    articles: Arc<dyn ArticleRepository>,
}

impl ArticleUseCase {
    pub fn new(articles: Arc<dyn ArticleRepository>) -> Self {
        Self { articles }
    }

    pub async fn list(&self, query: ArticleQueryDto) -> Result<Page<Article>, UseCaseError> {
        Ok(self
            .articles
            .list(ArticleQuery {
                source_id: query.source_id,
                read: query.read,
                pagination: Pagination::new(query.page, query.per_page),
            })
            .await?)
    }

    /// 设置文章已读标记
    pub async fn set_read(&self, id: Uuid, read: bool) -> Result<Article, UseCaseError> {
        self.articles
            .set_read(id, read)
            .await?
            .ok_or(UseCaseError::NotFound("Article"))
    }
}
