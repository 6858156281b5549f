// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::source::SourceSelectors;
use serde::{Deserialize, Serialize};
use validator::Validate;

/// 创建来源请求DTO
#[derive(Debug, Clone, Deserialize, Serialize, Validate)]
pub struct CreateSourceDto {
    #[validate(length(min = 1, max = 200))]
    pub name: String,
    #[validate(url)]
    pub base_url: String,
    pub selectors: SourceSelectors,
    /// 驱动类型：puppeteer / playwright / selenium / cheerio
    pub driver: String,
    pub active: Option<bool>,
}

/// 更新来源请求DTO
#[derive(Debug, Clone, Default, Deserialize, Serialize, Validate)]
pub struct UpdateSourceDto {
    #[validate(length(min = 1, max = 200))]
    pub name: Option<String>,
    #[validate(url)]
    pub base_url: Option<String>,
    pub selectors: Option<SourceSelectors>,
    pub driver: Option<String>,
    pub active: Option<bool>,
}

/// 创建选择器配置请求DTO
#[derive(Debug, Clone, Deserialize, Serialize, Validate)]
pub struct CreateSelectorConfigDto {
    #[validate(length(min = 1, max = 120))]
    pub name: String,
    #[validate(length(max = 1000))]
    pub description: Option<String>,
    pub driver: String,
    pub selectors: SourceSelectors,
    #[validate(url)]
    pub sample_url: Option<String>,
}

/// 更新选择器配置请求DTO
#[derive(Debug, Clone, Default, Deserialize, Serialize, Validate)]
pub struct UpdateSelectorConfigDto {
    #[validate(length(min = 1, max = 120))]
    pub name: Option<String>,
    #[validate(length(max = 1000))]
    pub description: Option<String>,
    pub driver: Option<String>,
    pub selectors: Option<SourceSelectors>,
    #[validate(url)]
    pub sample_url: Option<String>,
}
