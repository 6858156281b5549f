// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::source::Source;
use crate::domain::repositories::RepositoryError;
use async_trait::async_trait;
use uuid::Uuid;

/// 来源仓库特质
#[async_trait]
pub trait SourceRepository: Send + Sync {
    /// 创建来源
    async fn create(&self, source: &Source) -> Result<Source, RepositoryError>;
    /// 根据ID查找来源
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Source>, RepositoryError>;
    /// 列出来源，`active` 为空时返回全部
    async fn list(&self, active: Option<bool>) -> Result<Vec<Source>, RepositoryError>;
    /// 更新来源
    async fn update(&self, source: &Source) -> Result<Source, RepositoryError>;
    /// 删除来源，返回是否存在
    async fn delete(&self, id: Uuid) -> Result<bool, RepositoryError>;
}
