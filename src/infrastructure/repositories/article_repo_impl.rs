// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::article::{Article, NewArticle};
use crate::domain::repositories::article_repository::{
    ArticleQuery, ArticleRepository, DedupOutcome, DedupStore,
};
use crate::domain::repositories::{Page, RepositoryError};
use crate::infrastructure::database::entities::article as article_entity;
use crate::infrastructure::repositories::is_unique_violation;
use async_trait::async_trait;
use chrono::{DateTime, FixedOffset, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect, Set,
};
use std::sync::Arc;
use uuid::Uuid;

/// 文章仓库实现
///
/// 去重依赖 `articles.link` 与 `articles.hash` 上的唯一约束
#[derive(Clone)]
pub struct ArticleRepositoryImpl {
    db: Arc<DatabaseConnection>,
}

impl ArticleRepositoryImpl {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }
}

impl From<article_entity::Model> for Article {
    fn from(model: article_entity::Model) -> Self {
        Self {
            id: model.id,
            source_id: model.source_id,
            title: model.title,
            link: model.link,
            lead: model.lead,
            content: model.content,
            hash: model.hash,
            depth: model.depth.max(0) as u32,
            read: model.read,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}

impl From<&Article> for article_entity::ActiveModel {
    fn from(article: &Article) -> Self {
        Self {
            id: Set(article.id),
            source_id: Set(article.source_id),
            title: Set(article.title.clone()),
            link: Set(article.link.clone()),
            lead: Set(article.lead.clone()),
            content: Set(article.content.clone()),
            hash: Set(article.hash.clone()),
            depth: Set(article.depth as i32),
            read: Set(article.read),
            created_at: Set(article.created_at),
            updated_at: Set(article.updated_at),
        }
    }
}

#[async_trait]
impl DedupStore for ArticleRepositoryImpl {
    async fn check_and_insert(&self, article: NewArticle) -> Result<DedupOutcome, RepositoryError> {
        let article = article.into_article();
        let model: article_entity::ActiveModel = (&article).into();

        // a single insert; the unique constraints decide between concurrent writers
        match model.insert(self.db.as_ref()).await {
            Ok(inserted) => Ok(DedupOutcome::Inserted(inserted.into())),
            Err(e) if is_unique_violation(&e) => Ok(DedupOutcome::Duplicate),
            Err(e) => Err(e.into()),
        }
    }
}

#[async_trait]
impl ArticleRepository for ArticleRepositoryImpl {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Article>, RepositoryError> {
        let model = article_entity::Entity::find_by_id(id)
            .one(self.db.as_ref())
            .await?;
        Ok(model.map(Into::into))
    }

    async fn find_by_link(&self, link: &str) -> Result<Option<Article>, RepositoryError> {
        let model = article_entity::Entity::find()
            .filter(article_entity::Column::Link.eq(link))
            .one(self.db.as_ref())
            .await?;
        Ok(model.map(Into::into))
    }

    async fn list(&self, query: ArticleQuery) -> Result<Page<Article>, RepositoryError> {
        let mut select = article_entity::Entity::find();
        if let Some(source_id) = query.source_id {
            select = select.filter(article_entity::Column::SourceId.eq(source_id));
        }
        if let Some(read) = query.read {
            select = select.filter(article_entity::Column::Read.eq(read));
        }

        let total = select.clone().count(self.db.as_ref()).await?;
        let models = select
            .order_by_desc(article_entity::Column::CreatedAt)
            .offset(query.pagination.offset())
            .limit(query.pagination.per_page)
            .all(self.db.as_ref())
            .await?;

        Ok(Page::new(
            models.into_iter().map(Into::into).collect(),
            total,
            query.pagination,
        ))
    }

    async fn set_read(&self, id: Uuid, read: bool) -> Result<Option<Article>, RepositoryError> {
        let Some(model) = article_entity::Entity::find_by_id(id)
            .one(self.db.as_ref())
            .await?
        else {
            return Ok(None);
        };

        let now: DateTime<FixedOffset> = Utc::now().into();
        let mut active: article_entity::ActiveModel = model.into();
        active.read = Set(read);
        active.updated_at = Set(now);
        let updated = active.update(self.db.as_ref()).await?;
        Ok(Some(updated.into()))
    }
}
