// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::engines::browser_pool::BrowserPool;
use crate::engines::traits::{CrawlDriver, FetchError, FetchErrorKind, FetchRequest, FetchedPage};
use async_trait::async_trait;
use chromiumoxide::error::CdpError;
use chromiumoxide::Page;
use std::sync::Arc;
use std::time::{Duration, Instant};

// responseStatus is 0 when the browser does not expose it
const NAVIGATION_STATUS_JS: &str =
    "(performance.getEntriesByType('navigation')[0] || {}).responseStatus || 0";
const RESOURCE_COUNT_JS: &str = "performance.getEntriesByType('resource').length";

/// 无头浏览器驱动
///
/// 通过CDP渲染页面并执行脚本，在文档加载完成且资源请求数量在一个空闲窗口内不再变化后返回
pub struct BrowserDriver {
    pool: Arc<BrowserPool>,
    idle_wait: Duration,
}

impl BrowserDriver {
    /// 创建浏览器驱动
    ///
    /// # 参数
    ///
    /// * `pool` - 浏览器池
    /// * `idle_wait` - 判定网络空闲的静默窗口
    pub fn new(pool: Arc<BrowserPool>, idle_wait: Duration) -> Self {
        Self { pool, idle_wait }
    }

    async fn navigate(&self, page: &Page, url: &str) -> Result<(String, String, u16), FetchError> {
        page.goto(url).await.map_err(map_cdp_error)?;
        self.wait_for_network_idle(page).await?;

        let html = page.content().await.map_err(map_cdp_error)?;
        let final_url = page
            .url()
            .await
            .map_err(map_cdp_error)?
            .unwrap_or_else(|| url.to_string());
        let status = match page.evaluate(NAVIGATION_STATUS_JS).await {
            Ok(result) => result.into_value::<u16>().unwrap_or(0),
            Err(_) => 0,
        };

        Ok((html, final_url, if status == 0 { 200 } else { status }))
    }

    async fn wait_for_network_idle(&self, page: &Page) -> Result<(), FetchError> {
        let mut last_count: Option<u64> = None;
        loop {
            let ready: String = page
                .evaluate("document.readyState")
                .await
                .map_err(map_cdp_error)?
                .into_value()
                .unwrap_or_default();
            let count: u64 = page
                .evaluate(RESOURCE_COUNT_JS)
                .await
                .map_err(map_cdp_error)?
                .into_value()
                .unwrap_or_default();

            if ready == "complete" && last_count == Some(count) {
                return Ok(());
            }
            last_count = Some(count);
            tokio::time::sleep(self.idle_wait).await;
        }
    }
}

/// 将CDP错误映射为抓取错误
fn map_cdp_error(err: CdpError) -> FetchError {
    if matches!(err, CdpError::Timeout) {
        return FetchError::Timeout(err.to_string());
    }
    let message = err.to_string();
    if message.contains("net::ERR_") {
        FetchError::Network(message)
    } else {
        FetchError::Driver(message)
    }
}

#[async_trait]
impl CrawlDriver for BrowserDriver {
    /// 渲染页面
    ///
    /// 签出页面、导航与空闲等待都受请求超时约束；超时后页面租约被丢弃并关闭页面
    async fn fetch(&self, request: &FetchRequest) -> Result<FetchedPage, FetchError> {
        let start = Instant::now();

        let outcome = tokio::time::timeout(request.timeout, async {
            let lease = self.pool.checkout().await?;
            let result = self.navigate(lease.page(), &request.url).await;
            if let Err(e) = &result {
                if e.kind() == FetchErrorKind::Driver {
                    self.pool.invalidate(lease.generation()).await;
                }
            }
            result
        })
        .await
        .map_err(|_| {
            FetchError::Timeout(format!(
                "{} did not settle within {}ms",
                request.url,
                request.timeout.as_millis()
            ))
        })?;

        let (html, final_url, http_status) = outcome?;
        if !(200..300).contains(&http_status) {
            return Err(FetchError::Http {
                status: http_status,
                url: final_url,
            });
        }

        let elapsed = start.elapsed();
        metrics::histogram!("driver_fetch_duration_seconds", "driver" => self.name())
            .record(elapsed.as_secs_f64());

        Ok(FetchedPage {
            html,
            final_url,
            http_status,
            load_time_ms: elapsed.as_millis() as u64,
            driver: self.name(),
        })
    }

    fn name(&self) -> &'static str {
        self.pool.profile().name()
    }
}
