// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// 抓取参数
///
/// 由调度计划或手动触发提供，随作业负载一起序列化
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CrawlParams {
    /// 最大跟进深度
    pub max_depth: u32,
    /// 单个作业处理的候选文章上限
    pub article_limit: u32,
    /// 单个作业的硬超时（毫秒）
    pub timeout_ms: u64,
    /// 是否抓取详情页全文
    pub full_content: bool,
    /// 是否跟进详情链接
    pub follow_links: bool,
}

impl CrawlParams {
    /// 是否需要抓取详情页
    pub fn follows_detail_pages(&self) -> bool {
        self.follow_links && self.full_content && self.max_depth > 0
    }

    /// 检查参数是否在允许范围内
    ///
    /// # 参数
    ///
    /// * `max_depth_limit` - 允许的最大深度
    /// * `max_article_limit` - 允许的最大文章数
    ///
    /// # 返回值
    ///
    /// 参数越界时返回描述信息
    pub fn check_bounds(&self, max_depth_limit: u32, max_article_limit: u32) -> Result<(), String> {
        if self.max_depth > max_depth_limit {
            return Err(format!(
                "max_depth must be between 0 and {}, got {}",
                max_depth_limit, self.max_depth
            ));
        }
        if self.article_limit == 0 || self.article_limit > max_article_limit {
            return Err(format!(
                "article_limit must be between 1 and {}, got {}",
                max_article_limit, self.article_limit
            ));
        }
        if !(100..=3_600_000).contains(&self.timeout_ms) {
            return Err(format!(
                "timeout_ms must be between 100 and 3600000, got {}",
                self.timeout_ms
            ));
        }
        Ok(())
    }
}

/// 调度计划实体
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Schedule {
    pub id: Uuid,
    pub source_id: Uuid,
    /// cron表达式（5段标准格式或带秒的6/7段格式）
    pub cron_expression: String,
    pub active: bool,
    pub params: CrawlParams,
    /// 上一次派发时间
    pub last_run: Option<DateTime<FixedOffset>>,
    /// 下一次派发时间，停用时为空
    pub next_run: Option<DateTime<FixedOffset>>,
    pub created_at: DateTime<FixedOffset>,
    pub updated_at: DateTime<FixedOffset>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params() -> CrawlParams {
        CrawlParams {
            max_depth: 1,
            article_limit: 10,
            timeout_ms: 30_000,
            full_content: true,
            follow_links: true,
        }
    }

    #[test]
    fn test_follows_detail_pages_requires_all_flags() {
        assert!(params().follows_detail_pages());
        assert!(!CrawlParams { full_content: false, ..params() }.follows_detail_pages());
        assert!(!CrawlParams { follow_links: false, ..params() }.follows_detail_pages());
        assert!(!CrawlParams { max_depth: 0, ..params() }.follows_detail_pages());
    }

    #[test]
    fn test_check_bounds() {
        assert!(params().check_bounds(5, 500).is_ok());
        assert!(CrawlParams { max_depth: 6, ..params() }.check_bounds(5, 500).is_err());
        assert!(CrawlParams { article_limit: 0, ..params() }.check_bounds(5, 500).is_err());
        assert!(CrawlParams { timeout_ms: 10, ..params() }.check_bounds(5, 500).is_err());
    }
}
