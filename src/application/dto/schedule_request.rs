// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::application::dto::crawl_request::CrawlParamsDto;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// 创建调度计划请求DTO
#[derive(Debug, Clone, Deserialize, Serialize, Validate)]
pub struct CreateScheduleDto {
    pub source_id: Uuid,
    #[validate(length(min = 1, max = 120))]
    pub cron_expression: String,
    pub active: Option<bool>,
    #[serde(default)]
    #[validate(nested)]
    pub params: CrawlParamsDto,
}

/// 更新调度计划请求DTO
#[derive(Debug, Clone, Default, Deserialize, Serialize, Validate)]
pub struct UpdateScheduleDto {
    #[validate(length(min = 1, max = 120))]
    pub cron_expression: Option<String>,
    pub active: Option<bool>,
    #[validate(nested)]
    pub params: Option<CrawlParamsDto>,
}
