// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::models::source::{DriverKind, SourceSelectors};

/// 可复用的命名选择器集合
///
/// 独立于来源存在，供选择器测试流程使用，不参与抓取执行
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SelectorConfig {
    pub id: Uuid,
    /// 唯一名称
    pub name: String,
    pub description: Option<String>,
    pub driver: DriverKind,
    pub selectors: SourceSelectors,
    /// 编写选择器时使用的样例页面
    pub sample_url: Option<String>,
    pub created_at: DateTime<FixedOffset>,
    pub updated_at: DateTime<FixedOffset>,
}
