// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::application::dto::source_request::{CreateSourceDto, UpdateSourceDto};
use crate::application::use_cases::{check_source_selectors, UseCaseError};
use crate::domain::models::source::{DriverKind, Source};
use crate::domain::repositories::schedule_repository::ScheduleRepository;
use crate::domain::repositories::source_repository::SourceRepository;
use crate::domain::services::log_recorder::LogRecorder;
use chrono::Utc;
use serde_json::json;
use std::sync::Arc;
use uuid::Uuid;
use validator::Validate;

fn parse_driver(raw: &str) -> Result<DriverKind, UseCaseError> {
    raw.parse::<DriverKind>().map_err(UseCaseError::Validation)
}

/// 新闻来源管理用例
pub struct SourceUseCase {
    sources: Arc<dyn SourceRepository>,
    schedules: Arc<dyn ScheduleRepository>,
    recorder: Arc<LogRecorder>,
}

impl SourceUseCase {
    pub fn new(
        sources: Arc<dyn SourceRepository>,
        schedules: Arc<dyn ScheduleRepository>,
        recorder: Arc<LogRecorder>,
    ) -> Self {
        Self {
            sources,
            schedules,
            recorder,
        }
    }

    pub async fn create(&self, dto: CreateSourceDto) -> Result<Source, UseCaseError> {
        dto.validate()?;
        let driver = parse_driver(&dto.driver)?;
        check_source_selectors(&dto.selectors)?;

        let mut source = Source::new(dto.name.trim().to_string(), dto.base_url, dto.selectors, driver);
        source.active = dto.active.unwrap_or(true);

        let created = self.sources.create(&source).await?;
        self.recorder
            .audit(
                "source.create",
                "source",
                Some(created.id),
                format!("Created source '{}'", created.name),
                Some(json!({ "base_url": created.base_url, "driver": created.driver })),
            )
            .await;
        Ok(created)
    }

    pub async fn get(&self, id: Uuid) -> Result<Source, UseCaseError> {
        self.sources
            .find_by_id(id)
            .await?
            .ok_or(UseCaseError::NotFound("Source"))
    }

    pub async fn list(&self, active: Option<bool>) -> Result<Vec<Source>, UseCaseError> {
        Ok(self.sources.list(active).await?)
    }

    /// 更新来源
    ///
    /// 正在执行的作业持有来源快照，不受本次修改影响
    pub async fn update(&self, id: Uuid, dto: UpdateSourceDto) -> Result<Source, UseCaseError> {
        dto.validate()?;
        let mut source = self.get(id).await?;

        if let Some(name) = dto.name {
            source.name = name.trim().to_string();
        }
        if let Some(base_url) = dto.base_url {
            source.base_url = base_url;
        }
        if let Some(driver) = dto.driver {
            source.driver = parse_driver(&driver)?;
        }
        if let Some(selectors) = dto.selectors {
            check_source_selectors(&selectors)?;
            source.selectors = selectors;
        }
        if let Some(active) = dto.active {
            source.active = active;
        }
        source.updated_at = Utc::now().into();

        let updated = self.sources.update(&source).await?;
        self.recorder
            .audit(
                "source.update",
                "source",
                Some(updated.id),
                format!("Updated source '{}'", updated.name),
                None,
            )
            .await;
        Ok(updated)
    }

    /// 删除来源，仍被调度计划引用时拒绝
    pub async fn delete(&self, id: Uuid) -> Result<(), UseCaseError> {
        let schedules = self.schedules.list(Some(id)).await?;
        if !schedules.is_empty() {
            return Err(UseCaseError::Conflict(format!(
                "source is referenced by {} schedule(s)",
                schedules.len()
            )));
        }
        if !self.sources.delete(id).await? {
            return Err(UseCaseError::NotFound("Source"));
        }
        self.recorder
            .audit("source.delete", "source", Some(id), "Deleted source", None)
            .await;
        Ok(())
    }
}
