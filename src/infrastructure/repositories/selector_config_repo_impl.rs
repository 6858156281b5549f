// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::selector_config::SelectorConfig;
use crate::domain::repositories::selector_config_repository::SelectorConfigRepository;
use crate::domain::repositories::RepositoryError;
use crate::infrastructure::database::entities::selector_config as config_entity;
use crate::infrastructure::repositories::is_unique_violation;
use async_trait::async_trait;
use sea_orm::{ActiveModelTrait, DatabaseConnection, DbErr, EntityTrait, QueryOrder, Set};
use std::sync::Arc;
use uuid::Uuid;

/// 选择器配置仓库实现
#[derive(Clone)]
pub struct SelectorConfigRepositoryImpl {
    db: Arc<DatabaseConnection>,
}

impl SelectorConfigRepositoryImpl {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }
}

fn name_conflict(err: DbErr, name: &str) -> RepositoryError {
    if is_unique_violation(&err) {
        RepositoryError::Conflict(format!("selector config '{}' already exists", name))
    } else {
        err.into()
    }
}

impl TryFrom<config_entity::Model> for SelectorConfig {
    type Error = RepositoryError;

    fn try_from(model: config_entity::Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: model.id,
            name: model.name,
            description: model.description,
            driver: model.driver.parse().map_err(RepositoryError::InvalidData)?,
            selectors: serde_json::from_value(model.selectors)
                .map_err(|e| RepositoryError::InvalidData(format!("selectors: {}", e)))?,
            sample_url: model.sample_url,
            created_at: model.created_at,
            updated_at: model.updated_at,
        })
    }
}

impl TryFrom<&SelectorConfig> for config_entity::ActiveModel {
    type Error = RepositoryError;

    fn try_from(config: &SelectorConfig) -> Result<Self, Self::Error> {
        Ok(Self {
            id: Set(config.id),
            name: Set(config.name.clone()),
            description: Set(config.description.clone()),
            driver: Set(config.driver.to_string()),
            selectors: Set(serde_json::to_value(&config.selectors)
                .map_err(|e| RepositoryError::InvalidData(e.to_string()))?),
            sample_url: Set(config.sample_url.clone()),
            created_at: Set(config.created_at),
            updated_at: Set(config.updated_at),
        })
    }
}

#[async_trait]
impl SelectorConfigRepository for SelectorConfigRepositoryImpl {
    async fn create(&self, config: &SelectorConfig) -> Result<SelectorConfig, RepositoryError> {
        let model: config_entity::ActiveModel = config.try_into()?;
        model
            .insert(self.db.as_ref())
            .await
            .map_err(|e| name_conflict(e, &config.name))?
            .try_into()
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<SelectorConfig>, RepositoryError> {
        config_entity::Entity::find_by_id(id)
            .one(self.db.as_ref())
            .await?
            .map(SelectorConfig::try_from)
            .transpose()
    }

    async fn list(&self) -> Result<Vec<SelectorConfig>, RepositoryError> {
        config_entity::Entity::find()
            .order_by_asc(config_entity::Column::Name)
            .all(self.db.as_ref())
            .await?
            .into_iter()
            .map(SelectorConfig::try_from)
            .collect()
    }

    async fn update(&self, config: &SelectorConfig) -> Result<SelectorConfig, RepositoryError> {
        if config_entity::Entity::find_by_id(config.id)
            .one(self.db.as_ref())
            .await?
            .is_none()
        {
            return Err(RepositoryError::NotFound);
        }
        let model: config_entity::ActiveModel = config.try_into()?;
        model
            .update(self.db.as_ref())
            .await
            .map_err(|e| name_conflict(e, &config.name))?
            .try_into()
    }

    async fn delete(&self, id: Uuid) -> Result<bool, RepositoryError> {
        let result = config_entity::Entity::delete_by_id(id)
            .exec(self.db.as_ref())
            .await?;
        Ok(result.rows_affected > 0)
    }
}
