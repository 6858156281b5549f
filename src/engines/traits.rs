// Copyright 2025 Kirky.X
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use async_trait::async_trait;
use std::fmt;
use std::time::Duration;
use thiserror::Error;

use crate::domain::models::crawl_error::CrawlErrorKind;

/// 抓取错误类型
///
/// 驱动的所有失败都以该类型返回，流水线不会看到底层库的原始错误
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FetchError {
    /// 导航超时
    #[error("Navigation timeout: {0}")]
    Timeout(String),
    /// DNS或连接失败
    #[error("Network error: {0}")]
    Network(String),
    /// 非2xx响应
    #[error("HTTP {status} returned by {url}")]
    Http { status: u16, url: String },
    /// 驱动自身故障（浏览器崩溃、协议通道断开等）
    #[error("Driver error: {0}")]
    Driver(String),
}

impl FetchError {
    /// 错误类别标签
    pub fn kind(&self) -> FetchErrorKind {
        match self {
            FetchError::Timeout(_) => FetchErrorKind::Timeout,
            FetchError::Network(_) => FetchErrorKind::Network,
            FetchError::Http { .. } => FetchErrorKind::Http,
            FetchError::Driver(_) => FetchErrorKind::Driver,
        }
    }

    /// 映射到抓取错误分类
    pub fn crawl_error_kind(&self) -> CrawlErrorKind {
        match self.kind() {
            FetchErrorKind::Timeout => CrawlErrorKind::NavigationTimeout,
            FetchErrorKind::Network => CrawlErrorKind::NetworkError,
            FetchErrorKind::Http => CrawlErrorKind::HttpError,
            FetchErrorKind::Driver => CrawlErrorKind::DriverCrash,
        }
    }
}

/// 抓取错误类别
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchErrorKind {
    Timeout,
    Network,
    Http,
    Driver,
}

impl fmt::Display for FetchErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let tag = match self {
            FetchErrorKind::Timeout => "timeout",
            FetchErrorKind::Network => "network",
            FetchErrorKind::Http => "http",
            FetchErrorKind::Driver => "driver",
        };
        write!(f, "{}", tag)
    }
}

/// 抓取请求
#[derive(Debug, Clone)]
pub struct FetchRequest {
    /// 目标URL
    pub url: String,
    /// 导航超时
    pub timeout: Duration,
}

impl FetchRequest {
    pub fn new(url: impl Into<String>, timeout: Duration) -> Self {
        Self {
            url: url.into(),
            timeout,
        }
    }
}

/// 抓取到的页面
///
/// 只携带HTML文本；解析后的文档不是 `Send`，由调用方在同步作用域内解析
#[derive(Debug, Clone)]
pub struct FetchedPage {
    /// 渲染后的HTML
    pub html: String,
    /// 重定向后的最终URL
    pub final_url: String,
    /// HTTP状态码
    pub http_status: u16,
    /// 加载耗时（毫秒）
    pub load_time_ms: u64,
    /// 实际使用的驱动名称
    pub driver: &'static str,
}

/// 渲染驱动特质
#[async_trait]
pub trait CrawlDriver: Send + Sync {
    /// 抓取页面
    async fn fetch(&self, request: &FetchRequest) -> Result<FetchedPage, FetchError>;

    /// 驱动名称
    fn name(&self) -> &'static str;
}
