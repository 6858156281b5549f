// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::config::settings::CrawlSettings;
use crate::domain::models::crawl_outcome::CrawlSummary;
use crate::domain::models::schedule::CrawlParams;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// 同步抓取请求DTO
#[derive(Debug, Clone, Deserialize, Serialize, Validate)]
pub struct CrawlRequestDto {
    pub source_id: Uuid,
    /// 文章上限
    #[validate(range(min = 1))]
    pub limit: Option<u32>,
    /// 跟进深度
    pub depth: Option<u32>,
    pub full_content: Option<bool>,
    pub follow_links: Option<bool>,
    #[validate(range(min = 100, max = 3_600_000))]
    pub timeout_ms: Option<u64>,
}

impl CrawlRequestDto {
    /// 结合默认配置生成抓取参数
    pub fn params(&self, defaults: &CrawlSettings) -> CrawlParams {
        CrawlParamsDto {
            max_depth: self.depth,
            article_limit: self.limit,
            timeout_ms: self.timeout_ms,
            full_content: self.full_content,
            follow_links: self.follow_links,
        }
        .into_params(defaults)
    }
}

/// 抓取参数DTO，未提供的字段取默认值
#[derive(Debug, Clone, Default, Deserialize, Serialize, Validate)]
pub struct CrawlParamsDto {
    pub max_depth: Option<u32>,
    #[validate(range(min = 1))]
    pub article_limit: Option<u32>,
    #[validate(range(min = 100, max = 3_600_000))]
    pub timeout_ms: Option<u64>,
    pub full_content: Option<bool>,
    pub follow_links: Option<bool>,
}

impl CrawlParamsDto {
    pub fn into_params(self, defaults: &CrawlSettings) -> CrawlParams {
        let max_depth = self.max_depth.unwrap_or(0);
        CrawlParams {
            max_depth,
            article_limit: self.article_limit.unwrap_or(defaults.default_article_limit),
            timeout_ms: self.timeout_ms.unwrap_or(defaults.default_timeout_ms),
            full_content: self.full_content.unwrap_or(max_depth > 0),
            follow_links: self.follow_links.unwrap_or(max_depth > 0),
        }
    }

    /// 将提供的字段覆盖到已有参数上
    pub fn apply_to(self, mut params: CrawlParams) -> CrawlParams {
        if let Some(max_depth) = self.max_depth {
            params.max_depth = max_depth;
        }
        if let Some(article_limit) = self.article_limit {
            params.article_limit = article_limit;
        }
        if let Some(timeout_ms) = self.timeout_ms {
            params.timeout_ms = timeout_ms;
        }
        if let Some(full_content) = self.full_content {
            params.full_content = full_content;
        }
        if let Some(follow_links) = self.follow_links {
            params.follow_links = follow_links;
        }
        params
    }
}

/// 同步抓取响应DTO
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct CrawlResponseDto {
    pub processed: u32,
    pub new_articles: u32,
    pub duplicates: u32,
    pub errors: u32,
}

impl From<CrawlSummary> for CrawlResponseDto {
    fn from(summary: CrawlSummary) -> Self {
        Self {
            processed: summary.processed,
            new_articles: summary.new_articles,
            duplicates: summary.duplicates,
            errors: summary.errors,
        }
    }
}
