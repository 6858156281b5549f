// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::crawl_error::CrawlErrorKind;
use crate::domain::models::crawl_outcome::{CrawlOutcome, CrawlProgress};
use crate::domain::models::queue_job::{JobFailure, QueueJob};
use crate::domain::repositories::source_repository::SourceRepository;
use crate::domain::services::extraction_service::{ExtractionPipeline, PipelineError};
use crate::domain::services::log_recorder::{LogRecorder, RunRecord};
use crate::queue::job_queue::JobQueue;
use crate::workers::source_limiter::SourceLimiter;
use anyhow::Result;
use chrono::Utc;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::time::{sleep, timeout};
use tracing::{debug, error, info, instrument, warn};
use uuid::Uuid;

/// 抓取工作器
///
/// 循环领取作业并在作业超时内执行抓取流水线，每次执行写入一条执行记录
pub struct CrawlWorker {
    worker_id: Uuid,
    queue: Arc<dyn JobQueue>,
    sources: Arc<dyn SourceRepository>,
    pipeline: Arc<ExtractionPipeline>,
    recorder: Arc<LogRecorder>,
    limiter: Arc<SourceLimiter>,
    poll_interval: Duration,
}

impl CrawlWorker {
    /// 创建新的抓取工作器实例
    ///
    /// # 参数
    ///
    /// * `queue` - 作业队列
    /// * `sources` - 来源仓库
    /// * `pipeline` - 抓取流水线
    /// * `recorder` - 执行记录器
    /// * `limiter` - 按来源的并发限制
    /// * `poll_interval` - 队列为空时的轮询间隔
    pub fn new(
        queue: Arc<dyn JobQueue>,
        sources: Arc<dyn SourceRepository>,
        pipeline: Arc<ExtractionPipeline>,
        recorder: Arc<LogRecorder>,
        limiter: Arc<SourceLimiter>,
        poll_interval: Duration,
    ) -> Self {
        Self {
            worker_id: Uuid::new_v4(),
            queue,
            sources,
            pipeline,
            recorder,
            limiter,
            poll_interval,
        }
    }

    pub fn id(&self) -> Uuid {
        self.worker_id
    }

    /// 运行工作器主循环
    pub async fn run(&self) {
        info!("Crawl worker {} started", self.worker_id);

        loop {
            match self.run_once().await {
                Ok(true) => {}
                Ok(false) => sleep(self.poll_interval).await,
                Err(e) => {
                    error!("Error processing job: {}", e);
                    sleep(self.poll_interval).await;
                }
            }
        }
    }

    /// 领取并处理一个作业
    ///
    /// # 返回值
    ///
    /// 领取到作业时返回 `true`，队列为空时返回 `false`
    pub async fn run_once(&self) -> Result<bool> {
        let Some(job) = self.queue.take(self.worker_id).await? else {
            return Ok(false);
        };

        let Some(_permit) = self.limiter.try_acquire(job.source_id()) else {
            debug!(
                job_id = %job.id,
                source_id = %job.source_id(),
                "Source is busy, releasing job"
            );
            self.queue
                .release(&job, self.worker_id, self.poll_interval)
                .await?;
            return Ok(true);
        };

        self.process_job(job).await?;
        Ok(true)
    }

    #[instrument(
        skip(self, job),
        fields(job_id = %job.id, source_id = %job.source_id(), attempt = job.attempt + 1)
    )]
    async fn process_job(&self, job: QueueJob) -> Result<()> {
        info!("Processing crawl job");
        let started_at = Utc::now();
        let clock = Instant::now();

        let result = self.execute(&job).await;
        metrics::histogram!("crawl_job_duration_seconds").record(clock.elapsed().as_secs_f64());

        let (outcome, failure, attempt, settle) = match result {
            Ok(outcome) => {
                let settle = self
                    .queue
                    .complete(&job, self.worker_id, &outcome.summary())
                    .await;
                info!(
                    found = outcome.found,
                    new_articles = outcome.new_articles,
                    duplicates = outcome.duplicates,
                    errors = outcome.errors,
                    "Crawl job completed"
                );
                (outcome, None, job.attempt + 1, settle)
            }
            Err((outcome, failure)) => {
                warn!(kind = %failure.kind, "Crawl job failed: {}", failure.message);
                let (attempt, settle) = match self.queue.fail(&job, self.worker_id, &failure).await
                {
                    Ok(transition) => (transition.attempt(), Ok(())),
                    Err(e) => (job.attempt + 1, Err(e)),
                };
                (outcome, Some(failure), attempt, settle)
            }
        };

        let record = RunRecord {
            job_id: Some(job.id),
            source_id: job.source_id(),
            schedule_id: job.payload.schedule_id,
            params: job.payload.params,
            attempt,
            outcome,
            failure,
            started_at,
            finished_at: Utc::now(),
        };
        if let Err(e) = self.recorder.record_run(record).await {
            error!("Failed to record crawl history: {}", e);
        }

        settle?;
        Ok(())
    }

    /// 在作业超时内执行抓取
    ///
    /// 超时会丢弃流水线future，从而取消所有未完成的页面抓取并归还浏览器页面；
    /// 失败时仍返回取消前已完成部分的计数
    async fn execute(&self, job: &QueueJob) -> Result<CrawlOutcome, (CrawlOutcome, JobFailure)> {
        let params = job.payload.params;
        let source = match self.sources.find_by_id(job.source_id()).await {
            Ok(Some(source)) if source.active => source,
            Ok(Some(_)) => {
                return Err(failed(CrawlErrorKind::ValidationError, "source is inactive"));
            }
            Ok(None) => {
                return Err(failed(
                    CrawlErrorKind::ValidationError,
                    format!("source {} not found", job.source_id()),
                ));
            }
            Err(e) => {
                return Err(failed(
                    CrawlErrorKind::NetworkError,
                    format!("failed to load source: {}", e),
                ));
            }
        };

        let progress = CrawlProgress::new();
        let deadline = Duration::from_millis(params.timeout_ms);
        let error = match timeout(
            deadline,
            self.pipeline.run_with_progress(&source, &params, &progress),
        )
        .await
        {
            Ok(Ok(())) => return Ok(progress.snapshot()),
            Ok(Err(e)) => e,
            Err(_) => PipelineError::Timeout(params.timeout_ms),
        };
        Err((
            progress.snapshot(),
            JobFailure::new(error.crawl_error_kind(), error.to_string()),
        ))
    }
}

fn failed(kind: CrawlErrorKind, message: impl Into<String>) -> (CrawlOutcome, JobFailure) {
    (CrawlOutcome::default(), JobFailure::new(kind, message))
}
