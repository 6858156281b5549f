// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::application::dto::source_request::{CreateSelectorConfigDto, UpdateSelectorConfigDto};
use crate::application::use_cases::{check_selector_syntax, UseCaseError};
use crate::domain::models::selector_config::SelectorConfig;
use crate::domain::models::source::DriverKind;
use crate::domain::repositories::selector_config_repository::SelectorConfigRepository;
use crate::domain::services::log_recorder::LogRecorder;
use chrono::{DateTime, FixedOffset, Utc};
use std::sync::Arc;
use uuid::Uuid;
use validator::Validate;

/// 选择器配置管理用例
pub struct SelectorConfigUseCase {
    configs: Arc<dyn SelectorConfigRepository>,
    recorder: Arc<LogRecorder>,
}

impl SelectorConfigUseCase {
    pub fn new(configs: Arc<dyn SelectorConfigRepository>, recorder: Arc<LogRecorder>) -> Self {
        Self { configs, recorder }
    }

    pub async fn create(&self, dto: CreateSelectorConfigDto) -> Result<SelectorConfig, UseCaseError> {
        dto.validate()?;
        let driver = dto
            .driver
            .parse::<DriverKind>()
            .map_err(UseCaseError::Validation)?;
        check_selector_syntax(&dto.selectors)?;

        let now: DateTime<FixedOffset> = Utc::now().into();
        let config = SelectorConfig {
            id: Uuid::new_v4(),
            name: dto.name.trim().to_string(),
            description: dto.description,
            driver,
            selectors: dto.selectors,
            sample_url: dto.sample_url,
            created_at: now,
            updated_at: now,
        };
        let created = self.configs.create(&config).await?;
        self.recorder
            .audit(
                "selector_config.create",
                "selector_config",
                Some(created.id),
                format!("Created selector config '{}'", created.name),
                None,
            )
            .await;
        Ok(created)
    }

    pub async fn get(&self, id: Uuid) -> Result<SelectorConfig, UseCaseError> {
        self.configs
            .find_by_id(id)
            .await?
            .ok_or(UseCaseError::NotFound("Selector config"))
    }

    pub async fn list(&self) -> Result<Vec<SelectorConfig>, UseCaseError> {
        Ok(self.configs.list().await?)
    }

    pub async fn update(
        &self,
        id: Uuid,
        dto: UpdateSelectorConfigDto,
    ) -> Result<SelectorConfig, UseCaseError> {
        dto.validate()?;
        let mut config = self.get(id).await?;

        if let Some(name) = dto.name {
            config.name = name.trim().to_string();
        }
        if let Some(description) = dto.description {
            config.description = Some(description);
        }
        if let Some(driver) = dto.driver {
            config.driver = driver
                .parse::<DriverKind>()
                .map_err(UseCaseError::Validation)?;
        }
        if let Some(selectors) = dto.selectors {
            check_selector_syntax(&selectors)?;
            config.selectors = selectors;
        }
        if let Some(sample_url) = dto.sample_url {
            config.sample_url = Some(sample_url);
        }
        config.updated_at = Utc::now().into();

        let updated = self.configs.update(&config).await?;
        self.recorder
            .audit(
                "selector_config.update",
                "selector_config",
                Some(updated.id),
                format!("Updated selector config '{}'", updated.name),
                None,
            )
            .await;
        Ok(updated)
    }

    pub async fn delete(&self, id: Uuid) -> Result<(), UseCaseError> {
        if !self.configs.delete(id).await? {
            return Err(UseCaseError::NotFound("Selector config"));
        }
        self.recorder
            .audit(
                "selector_config.delete",
                "selector_config",
                Some(id),
                "Deleted selector config",
                None,
            )
            .await;
        Ok(())
    }
}
