// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use chrono::{DateTime, TimeZone, Utc};
use migration::{Migrator, MigratorTrait};
use newscrawl::config::settings::Settings;
use newscrawl::domain::models::schedule::CrawlParams;
use newscrawl::domain::models::source::{DriverKind, Source, SourceSelectors};
use newscrawl::domain::services::extraction_service::ExtractionPipeline;
use newscrawl::domain::services::log_recorder::LogRecorder;
use newscrawl::engines::factory::DriverFactory;
use newscrawl::engines::static_driver::StaticDriver;
use newscrawl::infrastructure::database::connection;
use newscrawl::infrastructure::repositories::Repositories;
use newscrawl::presentation::state::AppState;
use newscrawl::queue::job_queue::{DatabaseJobQueue, JobQueue};
use newscrawl::utils::clock::{Clock, ManualClock};
use newscrawl::workers::source_limiter::SourceLimiter;
use newscrawl::workers::CrawlWorker;
use sea_orm::DatabaseConnection;
use std::sync::Arc;
use std::time::Duration;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const LIST_PATH: &str = "/latest";

#[allow(dead_code)]
pub struct TestContext {
    pub db: Arc<DatabaseConnection>,
    pub settings: Settings,
    pub repositories: Repositories,
    pub clock: Arc<ManualClock>,
    pub queue: Arc<dyn JobQueue>,
    pub recorder: Arc<LogRecorder>,
    pub pipeline: Arc<ExtractionPipeline>,
}

/// 测试使用的固定起始时间
pub fn start_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 1, 1, 10, 0, 0).unwrap()
}

pub async fn setup() -> TestContext {
    setup_with(|_| {}).await
}

/// 以内存SQLite启动完整的核心组件
///
/// 内存数据库只对单个连接可见，因此连接池固定为一个连接
pub async fn setup_with(configure: impl FnOnce(&mut Settings)) -> TestContext {
    newscrawl::utils::telemetry::init_test_telemetry();

    let mut settings = Settings::defaults().expect("default settings");
    settings.database.url = "sqlite::memory:".to_string();
    settings.database.max_connections = Some(1);
    settings.database.min_connections = Some(1);
    settings.database.idle_timeout = None;
    settings.queue.initial_backoff_ms = 10_000;
    settings.queue.max_backoff_ms = 60_000;
    configure(&mut settings);

    let db = Arc::new(
        connection::create_pool(&settings.database)
            .await
            .expect("connect sqlite"),
    );
    Migrator::up(db.as_ref(), None).await.expect("migrate");

    let repositories = Repositories::new(db.clone());
    let clock = Arc::new(ManualClock::new(Utc::now()));
    let recorder = Arc::new(LogRecorder::new(
        repositories.history.clone(),
        repositories.operations.clone(),
    ));

    let drivers = DriverFactory::empty().with_driver(
        DriverKind::Cheerio,
        Arc::new(StaticDriver::new(&settings.static_driver).expect("static driver")),
    );
    let pipeline = Arc::new(ExtractionPipeline::new(
        Arc::new(drivers),
        repositories.dedup.clone(),
        settings.workers.fetch_concurrency,
    ));

    let queue: Arc<dyn JobQueue> = Arc::new(DatabaseJobQueue::new(
        repositories.jobs.clone(),
        settings.queue.retry_policy(),
        Duration::from_secs(settings.queue.lock_grace_secs),
        clock.clone() as Arc<dyn Clock>,
    ));

    TestContext {
        db,
        settings,
        repositories,
        clock,
        queue,
        recorder,
        pipeline,
    }
}

impl TestContext {
    pub fn app_state(&self) -> AppState {
        AppState::new(
            &self.settings,
            &self.repositories,
            self.pipeline.clone(),
            self.queue.clone(),
            self.recorder.clone(),
            self.clock.clone() as Arc<dyn Clock>,
        )
    }

    /// 单个工作器，轮询间隔很短
    pub fn worker(&self) -> CrawlWorker {
        CrawlWorker::new(
            self.queue.clone(),
            self.repositories.sources.clone(),
            self.pipeline.clone(),
            self.recorder.clone(),
            Arc::new(SourceLimiter::new(1)),
            Duration::from_millis(10),
        )
    }

    /// 写入一个使用静态驱动的来源
    pub async fn create_source(&self, base_url: &str) -> Source {
        let source = Source::new(
            "Fixture News".to_string(),
            base_url.to_string(),
            fixture_selectors(),
            DriverKind::Cheerio,
        );
        self.repositories
            .sources
            .create(&source)
            .await
            .expect("create source")
    }
}

pub fn fixture_selectors() -> SourceSelectors {
    SourceSelectors {
        list: vec![".pb-3 a".to_string()],
        title: vec![".prosed".to_string()],
        content: vec![".pb-2".to_string()],
        ..SourceSelectors::default()
    }
}

pub fn params(article_limit: u32, timeout_ms: u64) -> CrawlParams {
    CrawlParams {
        max_depth: 0,
        article_limit,
        timeout_ms,
        full_content: false,
        follow_links: false,
    }
}

/// 列表页：12个匹配的链接，其中最后两个是前两篇文章带跟踪参数的重复链接
pub fn fixture_list_page() -> String {
    let mut body = String::from("<html><body><main>");
    for i in 1..=12 {
        let (n, suffix) = if i > 10 {
            (i - 10, "?utm_source=homepage")
        } else {
            (i, "")
        };
        body.push_str(&format!(
            r#"<div class="pb-3"><a href="/news/{n}{suffix}"><h3 class="prosed">Story number {n}</h3><p class="pb-2">Body text for story {n}.</p></a></div>"#
        ));
    }
    body.push_str("</main></body></html>");
    body
}

/// 启动提供列表页的模拟站点
pub async fn fixture_site() -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(LIST_PATH))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("content-type", "text/html; charset=utf-8")
                .set_body_string(fixture_list_page()),
        )
        .mount(&server)
        .await;
    server
}

/// 启动一个响应很慢的站点
pub async fn slow_site(delay: Duration) -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(LIST_PATH))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(fixture_list_page())
                .set_delay(delay),
        )
        .mount(&server)
        .await;
    server
}

/// 启动一个列表页始终返回503的站点
pub async fn failing_site() -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(LIST_PATH))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;
    server
}

pub fn list_url(server: &MockServer) -> String {
    format!("{}{}", server.uri(), LIST_PATH)
}
