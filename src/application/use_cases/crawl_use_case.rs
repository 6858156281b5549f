// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::application::dto::crawl_request::{CrawlRequestDto, CrawlResponseDto};
use crate::application::use_cases::UseCaseError;
use crate::config::settings::CrawlSettings;
use crate::domain::models::crawl_outcome::CrawlProgress;
use crate::domain::models::queue_job::JobFailure;
use crate::domain::repositories::source_repository::SourceRepository;
use crate::domain::services::extraction_service::{ExtractionPipeline, PipelineError};
use crate::domain::services::log_recorder::{LogRecorder, RunRecord};
use chrono::Utc;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::timeout;
use tracing::{error, info};
use validator::Validate;

/// 同步抓取用例
///
/// 绕过作业队列直接执行一次流水线，仍然写入一条执行记录
pub struct CrawlUseCase {
    sources: Arc<dyn SourceRepository>,
    pipeline: Arc<ExtractionPipeline>,
    recorder: Arc<LogRecorder>,
    limits: CrawlSettings,
}

impl CrawlUseCase {
    pub fn new(
        sources: Arc<dyn SourceRepository>,
        pipeline: Arc<ExtractionPipeline>,
        recorder: Arc<LogRecorder>,
        limits: CrawlSettings,
    ) -> Self {
        Self {
            sources,
            pipeline,
            recorder,
            limits,
        }
    }

    /// 立即抓取指定来源
    ///
    /// # 参数
    ///
    /// * `dto` - 抓取请求
    ///
    /// # 返回值
    ///
    /// 返回本次抓取的计数摘要
    pub async fn crawl_now(&self, dto: CrawlRequestDto) -> Result<CrawlResponseDto, UseCaseError> {
        dto.validate()?;
        let params = dto.params(&self.limits);
        params
            .check_bounds(self.limits.max_depth_limit, self.limits.max_article_limit)
            .map_err(UseCaseError::Validation)?;

        let source = self
            .sources
            .find_by_id(dto.source_id)
            .await?
            .ok_or(UseCaseError::NotFound("Source"))?;

        info!(source_id = %source.id, "Running synchronous crawl");
        let started_at = Utc::now();
        let progress = CrawlProgress::new();
        let result = match timeout(
            Duration::from_millis(params.timeout_ms),
            self.pipeline.run_with_progress(&source, &params, &progress),
        )
        .await
        {
            Ok(result) => result,
            Err(_) => Err(PipelineError::Timeout(params.timeout_ms)),
        };

        let outcome = progress.snapshot();
        let summary = outcome.summary();
        let failure = result
            .as_ref()
            .err()
            .map(|e| JobFailure::new(e.crawl_error_kind(), e.to_string()));
        let record = RunRecord {
            job_id: None,
            source_id: source.id,
            schedule_id: None,
            params,
            attempt: 1,
            outcome,
            failure,
            started_at,
            finished_at: Utc::now(),
        };
        if let Err(e) = self.recorder.record_run(record).await {
            error!("Failed to record crawl history: {}", e);
        }

        result?;
        Ok(summary.into())
    }
}
