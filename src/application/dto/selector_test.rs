// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::services::selector_resolver::ElementSummary;
use serde::{Deserialize, Serialize};
use validator::Validate;

/// 单个选择器或选择器回退链
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(untagged)]
pub enum SelectorInput {
    One(String),
    Many(Vec<String>),
}

impl SelectorInput {
    pub fn into_vec(self) -> Vec<String> {
        match self {
            SelectorInput::One(selector) => vec![selector],
            SelectorInput::Many(selectors) => selectors,
        }
    }
}

/// 选择器测试请求DTO
#[derive(Debug, Clone, Deserialize, Serialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct SelectorTestRequestDto {
    #[validate(url)]
    pub url: String,
    pub selector: SelectorInput,
    /// 选择器字段类型，默认 list
    #[serde(rename = "type")]
    pub selector_type: Option<String>,
    /// 驱动类型，默认 cheerio
    pub driver_type: Option<String>,
}

/// 选择器测试响应DTO
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SelectorTestResponseDto {
    pub success: bool,
    pub data: SelectorTestData,
    pub metadata: SelectorTestMetadata,
    pub performance: SelectorTestPerformance,
    pub suggestions: Vec<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SelectorTestData {
    pub count: usize,
    pub samples: Vec<SampleElement>,
}

/// 样例元素
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SampleElement {
    pub text: String,
    pub href: Option<String>,
    pub tag_name: String,
    pub class_name: String,
    pub id: String,
}

impl From<ElementSummary> for SampleElement {
    fn from(summary: ElementSummary) -> Self {
        Self {
            text: summary.text,
            href: summary.href,
            tag_name: summary.tag_name,
            class_name: summary.class_name,
            id: summary.id,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectorTestMetadata {
    pub url: String,
    pub final_url: String,
    pub http_status: u16,
    pub driver: String,
    pub selector_type: String,
    /// 胜出的选择器，无匹配时为空
    pub matched_selector: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectorTestPerformance {
    pub load_time_ms: u64,
    pub resolve_time_ms: u64,
    pub total_time_ms: u64,
}
