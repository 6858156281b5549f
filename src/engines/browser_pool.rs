// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::config::settings::BrowserSettings;
use crate::engines::traits::FetchError;
use chromiumoxide::{Browser, BrowserConfig, Page};
use futures::StreamExt;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Mutex, OwnedSemaphorePermit, Semaphore};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// 浏览器接入方式
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BrowserProfile {
    /// 本地启动无头Chromium
    Launched,
    /// 连接配置的远程CDP端点，未配置时退回本地启动
    Remote,
}

impl BrowserProfile {
    pub fn name(&self) -> &'static str {
        match self {
            BrowserProfile::Launched => "puppeteer",
            BrowserProfile::Remote => "playwright",
        }
    }
}

/// 池中的浏览器实例
struct PooledBrowser {
    browser: Browser,
    handler: JoinHandle<()>,
    alive: Arc<AtomicBool>,
    generation: u64,
}

impl Drop for PooledBrowser {
    fn drop(&mut self) {
        self.handler.abort();
    }
}

/// 浏览器池
///
/// 每个池惰性地持有一个浏览器进程，页面按需签出并受信号量限制；
/// 浏览器失效后下一次签出会重新启动。
pub struct BrowserPool {
    profile: BrowserProfile,
    settings: BrowserSettings,
    browser: Mutex<Option<Arc<PooledBrowser>>>,
    pages: Arc<Semaphore>,
    generation: AtomicU64,
}

impl BrowserPool {
    /// 创建浏览器池，不会立即启动浏览器
    ///
    /// # 参数
    ///
    /// * `profile` - 浏览器接入方式
    /// * `settings` - 浏览器配置
    pub fn new(profile: BrowserProfile, settings: BrowserSettings) -> Self {
        let max_pages = settings.max_pages.max(1);
        Self {
            profile,
            settings,
            browser: Mutex::new(None),
            pages: Arc::new(Semaphore::new(max_pages)),
            generation: AtomicU64::new(0),
        }
    }

    pub fn profile(&self) -> BrowserProfile {
        self.profile
    }

    /// 当前可签出的页面数
    pub fn available_pages(&self) -> usize {
        self.pages.available_permits()
    }

    /// 签出一个空白页面
    ///
    /// 页面在租约释放时关闭；打开页面失败会使当前浏览器失效
    pub async fn checkout(&self) -> Result<PageLease, FetchError> {
        let permit = self
            .pages
            .clone()
            .acquire_owned()
            .await
            .map_err(|_| FetchError::Driver("browser pool is closed".to_string()))?;

        let browser = self.current_browser().await?;
        match browser.browser.new_page("about:blank").await {
            Ok(page) => Ok(PageLease {
                page,
                generation: browser.generation,
                _browser: browser,
                _permit: permit,
            }),
            Err(e) => {
                let generation = browser.generation;
                drop(browser);
                self.invalidate(generation).await;
                Err(FetchError::Driver(format!("failed to open page: {}", e)))
            }
        }
    }

    /// 丢弃指定代次的浏览器，下一次签出时重新启动
    pub async fn invalidate(&self, generation: u64) {
        let mut slot = self.browser.lock().await;
        if slot.as_ref().is_some_and(|b| b.generation == generation) {
            warn!(
                profile = self.profile.name(),
                generation, "Discarding crashed browser instance"
            );
            *slot = None;
        }
    }

    async fn current_browser(&self) -> Result<Arc<PooledBrowser>, FetchError> {
        let mut slot = self.browser.lock().await;
        if let Some(existing) = slot.as_ref() {
            if existing.alive.load(Ordering::SeqCst) {
                return Ok(existing.clone());
            }
            warn!(profile = self.profile.name(), "Browser connection lost, relaunching");
        }

        let launched = Arc::new(self.launch().await?);
        *slot = Some(launched.clone());
        Ok(launched)
    }

    async fn launch(&self) -> Result<PooledBrowser, FetchError> {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        let launch_timeout = Duration::from_millis(self.settings.launch_timeout_ms);

        let config = BrowserConfig::builder()
            .no_sandbox()
            .request_timeout(launch_timeout)
            .arg("--disable-gpu")
            .arg("--disable-dev-shm-usage")
            .build()
            .map_err(FetchError::Driver)?;

        let connect = async {
            match (self.profile, self.settings.remote_url.as_deref()) {
                (BrowserProfile::Remote, Some(url)) => {
                    info!("Connecting to remote browser at {}", url);
                    Browser::connect(url).await.map_err(|e| {
                        FetchError::Driver(format!("failed to connect to {}: {}", url, e))
                    })
                }
                _ => {
                    info!(profile = self.profile.name(), "Launching headless browser");
                    Browser::launch(config)
                        .await
                        .map_err(|e| FetchError::Driver(format!("failed to launch browser: {}", e)))
                }
            }
        };

        let (browser, mut handler) = tokio::time::timeout(launch_timeout, connect)
            .await
            .map_err(|_| FetchError::Driver("browser start-up timed out".to_string()))??;

        let alive = Arc::new(AtomicBool::new(true));
        let flag = alive.clone();
        let handler = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if let Err(e) = event {
                    debug!("Browser handler event error: {}", e);
                }
            }
            flag.store(false, Ordering::SeqCst);
        });

        Ok(PooledBrowser {
            browser,
            handler,
            alive,
            generation,
        })
    }
}

/// 页面租约
///
/// 释放时关闭页面并归还并发名额，作业被取消时同样生效
pub struct PageLease {
    page: Page,
    generation: u64,
    _browser: Arc<PooledBrowser>,
    _permit: OwnedSemaphorePermit,
}

impl PageLease {
    pub fn page(&self) -> &Page {
        &self.page
    }

    /// 页面所属浏览器的代次
    pub fn generation(&self) -> u64 {
        self.generation
    }
}

impl Drop for PageLease {
    fn drop(&mut self) {
        let page = self.page.clone();
        if let Ok(handle) = tokio::runtime::Handle::try_current() {
            handle.spawn(async move {
                if let Err(e) = page.close().await {
                    debug!("Failed to close page: {}", e);
                }
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings() -> BrowserSettings {
        BrowserSettings {
            remote_url: None,
            max_pages: 0,
            launch_timeout_ms: 1_000,
            navigation_timeout_ms: 65_000,
            idle_wait_ms: 100,
        }
    }

    #[test]
    fn test_pool_is_lazy_and_has_at_least_one_page() {
        let pool = BrowserPool::new(BrowserProfile::Remote, settings());
        assert_eq!(pool.available_pages(), 1);
        assert_eq!(pool.profile().name(), "playwright");
    }
}
