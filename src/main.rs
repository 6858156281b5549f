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

use newscrawl::config::settings::Settings;
use newscrawl::domain::services::extraction_service::ExtractionPipeline;
use newscrawl::domain::services::log_recorder::LogRecorder;
use newscrawl::engines::factory::DriverFactory;
use newscrawl::infrastructure::database::connection;
use newscrawl::infrastructure::metrics;
use newscrawl::infrastructure::repositories::Repositories;
use newscrawl::presentation::routes;
use newscrawl::presentation::state::AppState;
use newscrawl::queue::job_queue::{DatabaseJobQueue, JobQueue};
use newscrawl::queue::scheduler::CrawlScheduler;
use newscrawl::utils::clock::{Clock, SystemClock};
use newscrawl::utils::telemetry;
use newscrawl::workers::WorkerManager;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tracing::{error, info};

use migration::{Migrator, MigratorTrait};

/// 主函数
///
/// 应用程序入口点，负责初始化所有组件并启动服务
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 1. Initialize logging
    telemetry::init_telemetry();
    info!("Starting newscrawl...");

    // 2. Load configuration
    let settings = Arc::new(Settings::new()?);
    info!("Configuration loaded");

    metrics::init_metrics(&settings.metrics);

    // 3. Connect to database
    let db = Arc::new(connection::create_pool(&settings.database).await?);
    info!("Database connection established");

    info!("Running database migrations...");
    Migrator::up(db.as_ref(), None).await?;
    info!("Database migrations applied");

    // 4. Initialize components
    let repositories = Repositories::new(db.clone());
    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    let recorder = Arc::new(LogRecorder::new(
        repositories.history.clone(),
        repositories.operations.clone(),
    ));

    let drivers = Arc::new(DriverFactory::from_settings(&settings)?);
    let pipeline = Arc::new(ExtractionPipeline::new(
        drivers,
        repositories.dedup.clone(),
        settings.workers.fetch_concurrency,
    ));

    let queue: Arc<dyn JobQueue> = Arc::new(DatabaseJobQueue::new(
        repositories.jobs.clone(),
        settings.queue.retry_policy(),
        Duration::from_secs(settings.queue.lock_grace_secs),
        clock.clone(),
    ));

    // Jobs left running by a previous process become claimable again
    let recovered = queue.recover_stale().await?;
    if recovered > 0 {
        info!("Recovered {} jobs from a previous run", recovered);
    }

    // 5. Start scheduler
    let scheduler = Arc::new(CrawlScheduler::new(
        repositories.schedules.clone(),
        queue.clone(),
        clock.clone(),
        Duration::from_secs(settings.scheduler.tick_interval_secs.max(1)),
    ));
    let scheduler_handle = scheduler.start();

    // 6. Start workers
    let mut worker_manager = WorkerManager::new(
        queue.clone(),
        repositories.sources.clone(),
        pipeline.clone(),
        recorder.clone(),
        settings.workers.per_source_limit,
        Duration::from_millis(settings.workers.poll_interval_ms),
    );
    worker_manager.start_workers(settings.workers.count);

    // 7. Start HTTP server
    let state = AppState::new(&settings, &repositories, pipeline, queue, recorder, clock);
    let app = routes::routes(state);

    let addr = format!("{}:{}", settings.server.host, settings.server.port);
    let listener = TcpListener::bind(&addr).await?;
    info!("Listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    scheduler_handle.abort();
    worker_manager.shutdown().await;
    info!("newscrawl stopped");
    Ok(())
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("Shutdown signal received"),
        Err(err) => error!("Unable to listen for shutdown signal: {}", err),
    }
}
