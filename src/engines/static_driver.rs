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

use crate::config::settings::StaticDriverSettings;
use crate::engines::traits::{CrawlDriver, FetchError, FetchRequest, FetchedPage};
use async_trait::async_trait;
use std::time::{Duration, Instant};

/// 静态解析驱动
///
/// 基于reqwest获取原始HTML，不执行脚本，适用于服务端渲染的站点
pub struct StaticDriver {
    client: reqwest::Client,
}

impl StaticDriver {
    /// 创建静态驱动
    ///
    /// # 参数
    ///
    /// * `settings` - 静态驱动配置
    ///
    /// # 返回值
    ///
    /// * `Ok(StaticDriver)` - 驱动实例
    /// * `Err(FetchError)` - HTTP客户端构建失败
    pub fn new(settings: &StaticDriverSettings) -> Result<Self, FetchError> {
        let client = reqwest::Client::builder()
            .user_agent(settings.user_agent.as_str())
            .cookie_store(true)
            .build()
            .map_err(|e| FetchError::Driver(format!("failed to build HTTP client: {}", e)))?;
        Ok(Self { client })
    }
}

/// 将reqwest错误映射为抓取错误
fn map_reqwest_error(err: reqwest::Error, url: &str, timeout: Duration) -> FetchError {
    if err.is_timeout() {
        FetchError::Timeout(format!(
            "{} did not respond within {}ms",
            url,
            timeout.as_millis()
        ))
    } else if let Some(status) = err.status() {
        FetchError::Http {
            status: status.as_u16(),
            url: url.to_string(),
        }
    } else {
        FetchError::Network(format!("{}: {}", url, err))
    }
}

#[async_trait]
impl CrawlDriver for StaticDriver {
    /// 执行HTTP抓取
    ///
    /// # 参数
    ///
    /// * `request` - 抓取请求
    ///
    /// # 返回值
    ///
    /// * `Ok(FetchedPage)` - 2xx响应的页面
    /// * `Err(FetchError)` - 超时、连接失败或非2xx状态
    async fn fetch(&self, request: &FetchRequest) -> Result<FetchedPage, FetchError> {
        let start = Instant::now();
        let response = self
            .client
            .get(&request.url)
            .timeout(request.timeout)
            .send()
            .await
            .map_err(|e| map_reqwest_error(e, &request.url, request.timeout))?;

        let status = response.status();
        let final_url = response.url().to_string();
        if !status.is_success() {
            return Err(FetchError::Http {
                status: status.as_u16(),
                url: final_url,
            });
        }

        let html = response
            .text()
            .await
            .map_err(|e| map_reqwest_error(e, &request.url, request.timeout))?;

        let elapsed = start.elapsed();
        metrics::histogram!("driver_fetch_duration_seconds", "driver" => self.name())
            .record(elapsed.as_secs_f64());

        Ok(FetchedPage {
            html,
            final_url,
            http_status: status.as_u16(),
            load_time_ms: elapsed.as_millis() as u64,
            driver: self.name(),
        })
    }

    fn name(&self) -> &'static str {
        "cheerio"
    }
}

#[cfg(test)]
#[path = "static_driver_test.rs"]
mod tests;
