// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::selector_config::SelectorConfig;
use crate::domain::repositories::RepositoryError;
use async_trait::async_trait;
use uuid::Uuid;

/// 选择器配置仓库特质
#[async_trait]
pub trait SelectorConfigRepository: Send + Sync {
    /// 创建配置，名称重复时返回 `Conflict`
    async fn create(&self, config: &SelectorConfig) -> Result<SelectorConfig, RepositoryError>;
    async fn find_by_id(&self, id: Uuid) -> Result<Option<SelectorConfig>, RepositoryError>;
    async fn list(&self) -> Result<Vec<SelectorConfig>, RepositoryError>;
    /// 更新配置，名称重复时返回 `Conflict`
    async fn update(&self, config: &SelectorConfig) -> Result<SelectorConfig, RepositoryError>;
    async fn delete(&self, id: Uuid) -> Result<bool, RepositoryError>;
}
