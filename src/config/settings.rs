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

use config::builder::DefaultState;
use config::{Config, ConfigBuilder, ConfigError, Environment, File};
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

use crate::utils::retry_policy::RetryPolicy;

/// 应用程序配置设置
///
/// 包含数据库、服务器、队列、调度器、工作器与驱动等所有配置项
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    /// 数据库配置
    pub database: DatabaseSettings,
    /// 服务器配置
    pub server: ServerSettings,
    /// 工作器配置
    pub workers: WorkerSettings,
    /// 队列配置
    pub queue: QueueSettings,
    /// 调度器配置
    pub scheduler: SchedulerSettings,
    /// 抓取参数默认值与上限
    pub crawl: CrawlSettings,
    /// 无头浏览器配置
    pub browser: BrowserSettings,
    /// 静态解析驱动配置
    pub static_driver: StaticDriverSettings,
    /// 指标配置
    pub metrics: MetricsSettings,
}

/// 数据库配置设置
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseSettings {
    /// 数据库连接URL
    pub url: String,
    /// 最大连接数
    pub max_connections: Option<u32>,
    /// 最小连接数
    pub min_connections: Option<u32>,
    /// 连接超时时间（秒）
    pub connect_timeout: Option<u64>,
    /// 空闲连接超时时间（秒）
    pub idle_timeout: Option<u64>,
    /// 连接最长存活时间（秒），未设置时不限制
    pub max_lifetime: Option<u64>,
    /// 是否由 sqlx 记录每条SQL语句
    #[serde(default)]
    pub sqlx_logging: bool,
}

/// 服务器配置设置
#[derive(Debug, Clone, Deserialize)]
pub struct ServerSettings {
    /// 服务器监听主机地址
    pub host: String,
    /// 服务器监听端口
    pub port: u16,
}

/// 工作器配置设置
#[derive(Debug, Clone, Deserialize)]
pub struct WorkerSettings {
    /// 并发工作器数量
    pub count: usize,
    /// 队列为空时的轮询间隔（毫秒）
    pub poll_interval_ms: u64,
    /// 同一来源允许同时运行的作业数
    pub per_source_limit: usize,
    /// 单个作业内详情页抓取的并发上限
    pub fetch_concurrency: usize,
}

/// 队列配置设置
#[derive(Debug, Clone, Deserialize)]
pub struct QueueSettings {
    /// 最大尝试次数（包含首次执行）
    pub max_attempts: u32,
    /// 首次重试的退避时间（毫秒）
    pub initial_backoff_ms: u64,
    /// 退避时间上限（毫秒）
    pub max_backoff_ms: u64,
    /// 退避乘数
    pub backoff_multiplier: f64,
    /// 退避抖动因子，默认0即不抖动
    pub jitter_factor: f64,
    /// 作业锁在超时之外额外保留的时间（秒）
    pub lock_grace_secs: u64,
}

impl QueueSettings {
    /// 转换为作业失败时使用的重试策略
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_attempts: self.max_attempts,
            initial_backoff: Duration::from_millis(self.initial_backoff_ms),
            max_backoff: Duration::from_millis(self.max_backoff_ms),
            backoff_multiplier: self.backoff_multiplier,
            jitter_factor: self.jitter_factor,
        }
    }
}

/// 调度器配置设置
#[derive(Debug, Clone, Deserialize)]
pub struct SchedulerSettings {
    /// 调度器tick间隔（秒）
    pub tick_interval_secs: u64,
}

/// 抓取参数配置
#[derive(Debug, Clone, Deserialize)]
pub struct CrawlSettings {
    /// 默认单作业超时（毫秒）
    pub default_timeout_ms: u64,
    /// 默认文章数量上限
    pub default_article_limit: u32,
    /// 允许配置的最大深度
    pub max_depth_limit: u32,
    /// 允许配置的最大文章数量
    pub max_article_limit: u32,
}

/// 无头浏览器配置
#[derive(Debug, Clone, Deserialize)]
pub struct BrowserSettings {
    /// 远程CDP端点（如 ws://chrome:9222），为空时本地启动Chromium
    pub remote_url: Option<String>,
    /// 每个浏览器同时打开的页面数上限
    pub max_pages: usize,
    /// 浏览器启动超时（毫秒）
    pub launch_timeout_ms: u64,
    /// 选择器测试路径的导航超时（毫秒）
    pub navigation_timeout_ms: u64,
    /// 判定网络空闲所需的静默窗口（毫秒）
    pub idle_wait_ms: u64,
}

/// 静态解析驱动配置
#[derive(Debug, Clone, Deserialize)]
pub struct StaticDriverSettings {
    /// 请求使用的User-Agent
    pub user_agent: String,
}

/// 指标配置
#[derive(Debug, Clone, Deserialize)]
pub struct MetricsSettings {
    /// 是否启用Prometheus导出
    pub enabled: bool,
    /// 导出监听地址
    pub listen: String,
}

impl Settings {
    /// 创建新的配置实例
    ///
    /// 依次加载内置默认值、`config/default`、`config/{APP_ENVIRONMENT}` 与 `NEWSCRAWL__*` 环境变量
    ///
    /// # Returns
    ///
    /// * `Ok(Settings)` - 成功加载的配置
    /// * `Err(ConfigError)` - 配置加载失败
    pub fn new() -> Result<Self, ConfigError> {
        Self::load_from(Path::new("config"))
    }

    /// 从指定目录加载配置
    ///
    /// # 参数
    ///
    /// * `dir` - 配置文件所在目录
    pub fn load_from(dir: &Path) -> Result<Self, ConfigError> {
        let env = std::env::var("APP_ENVIRONMENT").unwrap_or_else(|_| "default".to_string());
        let default_file = dir.join("default");
        let env_file = dir.join(&env);

        let builder = Self::default_builder()?
            .add_source(File::with_name(&default_file.to_string_lossy()).required(false))
            .add_source(File::with_name(&env_file.to_string_lossy()).required(false))
            .add_source(Environment::with_prefix("NEWSCRAWL").separator("__"));

        builder.build()?.try_deserialize()
    }

    /// 仅由内置默认值构成的配置，不读取文件与环境变量
    pub fn defaults() -> Result<Self, ConfigError> {
        Self::default_builder()?.build()?.try_deserialize()
    }

    fn default_builder() -> Result<ConfigBuilder<DefaultState>, ConfigError> {
        let builder = Config::builder()
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", 3000)?
            .set_default("database.url", "sqlite://newscrawl.db?mode=rwc")?
            .set_default("database.max_connections", 10)?
            .set_default("database.min_connections", 1)?
            .set_default("database.connect_timeout", 10)?
            .set_default("database.idle_timeout", 300)?
            .set_default("database.max_lifetime", 3600)?
            .set_default("database.sqlx_logging", false)?
            .set_default("workers.count", 4)?
            .set_default("workers.poll_interval_ms", 1000)?
            .set_default("workers.per_source_limit", 1)?
            .set_default("workers.fetch_concurrency", 4)?
            .set_default("queue.max_attempts", 3)?
            .set_default("queue.initial_backoff_ms", 30_000)?
            .set_default("queue.max_backoff_ms", 600_000)?
            .set_default("queue.backoff_multiplier", 2.0)?
            .set_default("queue.jitter_factor", 0.0)?
            .set_default("queue.lock_grace_secs", 60)?
            .set_default("scheduler.tick_interval_secs", 60)?
            .set_default("crawl.default_timeout_ms", 120_000)?
            .set_default("crawl.default_article_limit", 20)?
            .set_default("crawl.max_depth_limit", 5)?
            .set_default("crawl.max_article_limit", 500)?
            .set_default("browser.max_pages", 4)?
            .set_default("browser.launch_timeout_ms", 30_000)?
            .set_default("browser.navigation_timeout_ms", 65_000)?
            .set_default("browser.idle_wait_ms", 500)?
            .set_default(
                "static_driver.user_agent",
                "Mozilla/5.0 (compatible; newscrawl/1.0; +https://github.com/Kirky-X)",
            )?
            .set_default("metrics.enabled", false)?
            .set_default("metrics.listen", "0.0.0.0:9000")?;
        Ok(builder)
    }
}

#[cfg(test)]
#[path = "settings_test.rs"]
mod tests;
