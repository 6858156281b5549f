// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::application::use_cases::article_use_case::ArticleUseCase;
use crate::application::use_cases::crawl_use_case::CrawlUseCase;
use crate::application::use_cases::log_use_case::LogUseCase;
use crate::application::use_cases::queue_use_case::QueueUseCase;
use crate::application::use_cases::schedule_use_case::ScheduleUseCase;
use crate::application::use_cases::selector_config_use_case::SelectorConfigUseCase;
use crate::application::use_cases::selector_test_use_case::SelectorTestUseCase;
use crate::application::use_cases::source_use_case::SourceUseCase;
use crate::config::settings::Settings;
use crate::domain::services::extraction_service::ExtractionPipeline;
use crate::domain::services::log_recorder::LogRecorder;
use crate::infrastructure::repositories::Repositories;
use crate::queue::job_queue::JobQueue;
use crate::utils::clock::Clock;
use std::sync::Arc;
use std::time::Duration;

/// 处理器共享的用例集合，通过 `Extension` 注入
#[derive(Clone)]
pub struct AppState {
    pub crawl: Arc<CrawlUseCase>,
    pub selector_test: Arc<SelectorTestUseCase>,
    pub schedules: Arc<ScheduleUseCase>,
    pub logs: Arc<LogUseCase>,
    pub queue: Arc<QueueUseCase>,
    pub articles: Arc<ArticleUseCase>,
    pub sources: Arc<SourceUseCase>,
    pub selector_configs: Arc<SelectorConfigUseCase>,
}

impl AppState {
    /// 组装全部用例
    ///
    /// # 参数
    ///
    /// * `settings` - 应用配置
    /// * `repositories` - 仓库集合
    /// * `pipeline` - 抓取流水线
    /// * `queue` - 作业队列
    /// * `recorder` - 执行记录器
    /// * `clock` - 时钟
    pub fn new(
        settings: &Settings,
        repositories: &Repositories,
        pipeline: Arc<ExtractionPipeline>,
        queue: Arc<dyn JobQueue>,
        recorder: Arc<LogRecorder>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            crawl: Arc::new(CrawlUseCase::new(
                repositories.sources.clone(),
                pipeline.clone(),
                recorder.clone(),
                settings.crawl.clone(),
            )),
            selector_test: Arc::new(SelectorTestUseCase::new(
                pipeline.drivers().clone(),
                Duration::from_millis(settings.browser.navigation_timeout_ms),
            )),
            schedules: Arc::new(ScheduleUseCase::new(
                repositories.schedules.clone(),
                repositories.sources.clone(),
                queue.clone(),
                recorder.clone(),
                clock,
                settings.crawl.clone(),
            )),
            logs: Arc::new(LogUseCase::new(
                repositories.history.clone(),
                repositories.operations.clone(),
                queue.clone(),
                recorder.clone(),
            )),
            queue: Arc::new(QueueUseCase::new(queue)),
            articles: Arc::new(ArticleUseCase::new(repositories.articles.clone())),
            sources: Arc::new(SourceUseCase::new(
                repositories.sources.clone(),
                repositories.schedules.clone(),
                recorder.clone(),
            )),
            selector_configs: Arc::new(SelectorConfigUseCase::new(
                repositories.selector_configs.clone(),
                recorder,
            )),
        }
    }
}
