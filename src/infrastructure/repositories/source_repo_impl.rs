// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::source::Source;
use crate::domain::repositories::source_repository::SourceRepository;
use crate::domain::repositories::RepositoryError;
use crate::infrastructure::database::entities::news_source as source_entity;
use async_trait::async_trait;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
};
use std::sync::Arc;
use uuid::Uuid;

/// 来源仓库实现
#[derive(Clone)]
pub struct SourceRepositoryImpl {
    db: Arc<DatabaseConnection>,
}

impl SourceRepositoryImpl {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }
}

impl TryFrom<source_entity::Model> for Source {
    type Error = RepositoryError;

    fn try_from(model: source_entity::Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: model.id,
            name: model.name,
            base_url: model.base_url,
            selectors: serde_json::from_value(model.selectors)
                .map_err(|e| RepositoryError::InvalidData(format!("source selectors: {}", e)))?,
            driver: model
                .driver
                .parse()
                .map_err(RepositoryError::InvalidData)?,
            active: model.active,
            created_at: model.created_at,
            updated_at: model.updated_at,
        })
    }
}

impl TryFrom<&Source> for source_entity::ActiveModel {
    type Error = RepositoryError;

    fn try_from(source: &Source) -> Result<Self, Self::Error> {
        Ok(Self {
            id: Set(source.id),
            name: Set(source.name.clone()),
            base_url: Set(source.base_url.clone()),
            driver: Set(source.driver.to_string()),
            selectors: Set(serde_json::to_value(&source.selectors)
                .map_err(|e| RepositoryError::InvalidData(e.to_string()))?),
            active: Set(source.active),
            created_at: Set(source.created_at),
            updated_at: Set(source.updated_at),
        })
    }
}

#[async_trait]
impl SourceRepository for SourceRepositoryImpl {
    async fn create(&self, source: &Source) -> Result<Source, RepositoryError> {
        let model: source_entity::ActiveModel = source.try_into()?;
        model.insert(self.db.as_ref()).await?.try_into()
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Source>, RepositoryError> {
        source_entity::Entity::find_by_id(id)
            .one(self.db.as_ref())
            .await?
            .map(Source::try_from)
            .transpose()
    }

    async fn list(&self, active: Option<bool>) -> Result<Vec<Source>, RepositoryError> {
        let mut query = source_entity::Entity::find();
        if let Some(active) = active {
            query = query.filter(source_entity::Column::Active.eq(active));
        }
        query
            .order_by_asc(source_entity::Column::Name)
            .all(self.db.as_ref())
            .await?
            .into_iter()
            .map(Source::try_from)
            .collect()
    }

    async fn update(&self, source: &Source) -> Result<Source, RepositoryError> {
        if source_entity::Entity::find_by_id(source.id)
            .one(self.db.as_ref())
            .await?
            .is_none()
        {
            return Err(RepositoryError::NotFound);
        }
        let model: source_entity::ActiveModel = source.try_into()?;
        model.update(self.db.as_ref()).await?.try_into()
    }

    async fn delete(&self, id: Uuid) -> Result<bool, RepositoryError> {
        let result = source_entity::Entity::delete_by_id(id)
            .exec(self.db.as_ref())
            .await?;
        Ok(result.rows_affected > 0)
    }
}
