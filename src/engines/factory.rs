// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::config::settings::Settings;
use crate::domain::models::source::DriverKind;
use crate::engines::browser_driver::BrowserDriver;
use crate::engines::browser_pool::{BrowserPool, BrowserProfile};
use crate::engines::static_driver::StaticDriver;
use crate::engines::traits::{CrawlDriver, FetchError};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

/// 驱动工厂
///
/// 按来源声明的驱动类型选择具体实现：puppeteer使用本地启动的浏览器，
/// playwright与selenium共用远程（或本地）CDP浏览器，cheerio使用静态驱动
pub struct DriverFactory {
    drivers: HashMap<DriverKind, Arc<dyn CrawlDriver>>,
}

impl DriverFactory {
    /// 根据配置构建全部驱动
    ///
    /// 浏览器池是惰性的，构建阶段不会启动浏览器
    pub fn from_settings(settings: &Settings) -> Result<Self, FetchError> {
        let idle_wait = Duration::from_millis(settings.browser.idle_wait_ms);

        let launched: Arc<dyn CrawlDriver> = Arc::new(BrowserDriver::new(
            Arc::new(BrowserPool::new(
                BrowserProfile::Launched,
                settings.browser.clone(),
            )),
            idle_wait,
        ));
        let remote: Arc<dyn CrawlDriver> = Arc::new(BrowserDriver::new(
            Arc::new(BrowserPool::new(
                BrowserProfile::Remote,
                settings.browser.clone(),
            )),
            idle_wait,
        ));
        let static_driver: Arc<dyn CrawlDriver> =
            Arc::new(StaticDriver::new(&settings.static_driver)?);

        Ok(Self::empty()
            .with_driver(DriverKind::Puppeteer, launched)
            .with_driver(DriverKind::Playwright, remote.clone())
            .with_driver(DriverKind::Selenium, remote)
            .with_driver(DriverKind::Cheerio, static_driver))
    }

    /// 创建不含任何驱动的工厂
    pub fn empty() -> Self {
        Self {
            drivers: HashMap::new(),
        }
    }

    /// 注册（或替换）某一驱动类型的实现
    pub fn with_driver(mut self, kind: DriverKind, driver: Arc<dyn CrawlDriver>) -> Self {
        self.drivers.insert(kind, driver);
        self
    }

    /// 获取驱动
    ///
    /// # 返回值
    ///
    /// * `Ok(driver)` - 对应的驱动
    /// * `Err(FetchError::Driver)` - 该类型未注册
    pub fn driver_for(&self, kind: DriverKind) -> Result<Arc<dyn CrawlDriver>, FetchError> {
        self.drivers
            .get(&kind)
            .cloned()
            .ok_or_else(|| FetchError::Driver(format!("no driver registered for {}", kind)))
    }
}
