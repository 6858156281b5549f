// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::crawl_history::CrawlHistory;
use crate::domain::repositories::crawl_history_repository::{
    CrawlHistoryRepository, HistoryQuery,
};
use crate::domain::repositories::{Page, RepositoryError};
use crate::infrastructure::database::entities::crawl_history as history_entity;
use async_trait::async_trait;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect, Set,
};
use std::sync::Arc;
use uuid::Uuid;

/// 执行记录仓库实现
#[derive(Clone)]
pub struct CrawlHistoryRepositoryImpl {
    db: Arc<DatabaseConnection>,
}

impl CrawlHistoryRepositoryImpl {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }
}

fn invalid(field: &str, err: impl std::fmt::Display) -> RepositoryError {
    RepositoryError::InvalidData(format!("crawl history {}: {}", field, err))
}

impl TryFrom<history_entity::Model> for CrawlHistory {
    type Error = RepositoryError;

    fn try_from(model: history_entity::Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: model.id,
            job_id: model.job_id,
            source_id: model.source_id,
            schedule_id: model.schedule_id,
            status: model
                .status
                .parse()
                .map_err(|_| invalid("status", &model.status))?,
            params: serde_json::from_value(model.params).map_err(|e| invalid("params", e))?,
            attempt: model.attempt.max(0) as u32,
            found: model.found.max(0) as u32,
            processed: model.processed.max(0) as u32,
            new_articles: model.new_articles.max(0) as u32,
            duplicates: model.duplicates.max(0) as u32,
            errors: model.errors.max(0) as u32,
            duration_ms: model.duration_ms.max(0) as u64,
            message: model.message,
            error_kind: model.error_kind.and_then(|kind| kind.parse().ok()),
            failures: serde_json::from_value(model.failures).map_err(|e| invalid("failures", e))?,
            started_at: model.started_at,
            finished_at: model.finished_at,
        })
    }
}

impl TryFrom<&CrawlHistory> for history_entity::ActiveModel {
    type Error = RepositoryError;

    fn try_from(record: &CrawlHistory) -> Result<Self, Self::Error> {
        Ok(Self {
            id: Set(record.id),
            job_id: Set(record.job_id),
            source_id: Set(record.source_id),
            schedule_id: Set(record.schedule_id),
            status: Set(record.status.to_string()),
            params: Set(serde_json::to_value(record.params).map_err(|e| invalid("params", e))?),
            attempt: Set(record.attempt as i32),
            found: Set(record.found as i32),
            processed: Set(record.processed as i32),
            new_articles: Set(record.new_articles as i32),
            duplicates: Set(record.duplicates as i32),
            errors: Set(record.errors as i32),
            duration_ms: Set(record.duration_ms as i64),
            message: Set(record.message.clone()),
            error_kind: Set(record.error_kind.map(|kind| kind.to_string())),
            failures: Set(
                serde_json::to_value(&record.failures).map_err(|e| invalid("failures", e))?
            ),
            started_at: Set(record.started_at),
            finished_at: Set(record.finished_at),
        })
    }
}

#[async_trait]
impl CrawlHistoryRepository for CrawlHistoryRepositoryImpl {
    async fn create(&self, record: &CrawlHistory) -> Result<CrawlHistory, RepositoryError> {
        let model: history_entity::ActiveModel = record.try_into()?;
        model.insert(self.db.as_ref()).await?.try_into()
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<CrawlHistory>, RepositoryError> {
        history_entity::Entity::find_by_id(id)
            .one(self.db.as_ref())
            .await?
            .map(CrawlHistory::try_from)
            .transpose()
    }

    async fn list(&self, query: HistoryQuery) -> Result<Page<CrawlHistory>, RepositoryError> {
        let mut select = history_entity::Entity::find();
        if let Some(source_id) = query.source_id {
            select = select.filter(history_entity::Column::SourceId.eq(source_id));
        }
        if let Some(job_id) = query.job_id {
            select = select.filter(history_entity::Column::JobId.eq(job_id));
        }
        if let Some(status) = query.status {
            select = select.filter(history_entity::Column::Status.eq(status.to_string()));
        }

        let total = select.clone().count(self.db.as_ref()).await?;
        let items = select
            .order_by_desc(history_entity::Column::StartedAt)
            .offset(query.pagination.offset())
            .limit(query.pagination.per_page)
            .all(self.db.as_ref())
            .await?
            .into_iter()
            .map(CrawlHistory::try_from)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Page::new(items, total, query.pagination))
    }

    async fn delete(&self, id: Uuid) -> Result<bool, RepositoryError> {
        let result = history_entity::Entity::delete_by_id(id)
            .exec(self.db.as_ref())
            .await?;
        Ok(result.rows_affected > 0)
    }
}
