// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::crawl_history::{OperationLog, RunStatus};
use crate::domain::repositories::operation_log_repository::OperationLogRepository;
use crate::domain::repositories::{Page, Pagination, RepositoryError};
use crate::infrastructure::database::entities::operation_log as log_entity;
use async_trait::async_trait;
use sea_orm::{
    ActiveModelTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryOrder, QuerySelect,
    Set,
};
use std::sync::Arc;

/// 操作日志仓库实现
#[derive(Clone)]
pub struct OperationLogRepositoryImpl {
    db: Arc<DatabaseConnection>,
}

impl OperationLogRepositoryImpl {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }
}

impl From<log_entity::Model> for OperationLog {
    fn from(model: log_entity::Model) -> Self {
        Self {
            id: model.id,
            operation: model.operation,
            entity_type: model.entity_type,
            entity_id: model.entity_id,
            status: model.status.parse().unwrap_or(RunStatus::Failed),
            message: model.message,
            details: model.details,
            created_at: model.created_at,
        }
    }
}

impl From<&OperationLog> for log_entity::ActiveModel {
    fn from(log: &OperationLog) -> Self {
        Self {
            id: Set(log.id),
            operation: Set(log.operation.clone()),
            entity_type: Set(log.entity_type.clone()),
            entity_id: Set(log.entity_id),
            status: Set(log.status.to_string()),
            message: Set(log.message.clone()),
            details: Set(log.details.clone()),
            created_at: Set(log.created_at),
        }
    }
}

#[async_trait]
impl OperationLogRepository for OperationLogRepositoryImpl {
    async fn create(&self, log: &OperationLog) -> Result<OperationLog, RepositoryError> {
        let model: log_entity::ActiveModel = log.into();
        Ok(model.insert(self.db.as_ref()).await?.into())
    }

    async fn list(&self, pagination: Pagination) -> Result<Page<OperationLog>, RepositoryError> {
        let select = log_entity::Entity::find();
        let total = select.clone().count(self.db.as_ref()).await?;
        let models = select
            .order_by_desc(log_entity::Column::CreatedAt)
            .offset(pagination.offset())
            .limit(pagination.per_page)
            .all(self.db.as_ref())
            .await?;
        Ok(Page::new(
            models.into_iter().map(Into::into).collect(),
            total,
            pagination,
        ))
    }
}
