// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// 抓取错误分类
///
/// `SelectorNotFound` 与 `DedupConflict` 在作业内部被计数消化，不会中止作业；
/// 其余类型出现在列表页时会使整个作业失败
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CrawlErrorKind {
    /// 导航或作业超时
    NavigationTimeout,
    /// DNS或连接失败
    NetworkError,
    /// 非2xx响应
    HttpError,
    /// 浏览器进程或协议通道失效
    DriverCrash,
    /// 没有任何选择器命中
    SelectorNotFound,
    /// 配置校验失败
    ValidationError,
    /// 重复文章
    DedupConflict,
}

impl CrawlErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            CrawlErrorKind::NavigationTimeout => "navigation_timeout",
            CrawlErrorKind::NetworkError => "network_error",
            CrawlErrorKind::HttpError => "http_error",
            CrawlErrorKind::DriverCrash => "driver_crash",
            CrawlErrorKind::SelectorNotFound => "selector_not_found",
            CrawlErrorKind::ValidationError => "validation_error",
            CrawlErrorKind::DedupConflict => "dedup_conflict",
        }
    }

    /// 该类错误是否值得自动重试
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            CrawlErrorKind::NavigationTimeout
                | CrawlErrorKind::NetworkError
                | CrawlErrorKind::HttpError
                | CrawlErrorKind::DriverCrash
        )
    }
}

impl fmt::Display for CrawlErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for CrawlErrorKind {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "navigation_timeout" => Ok(CrawlErrorKind::NavigationTimeout),
            "network_error" => Ok(CrawlErrorKind::NetworkError),
            "http_error" => Ok(CrawlErrorKind::HttpError),
            "driver_crash" => Ok(CrawlErrorKind::DriverCrash),
            "selector_not_found" => Ok(CrawlErrorKind::SelectorNotFound),
            "validation_error" => Ok(CrawlErrorKind::ValidationError),
            "dedup_conflict" => Ok(CrawlErrorKind::DedupConflict),
            _ => Err(()),
        }
    }
}
