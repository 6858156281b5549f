// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::application::dto::query_request::{LogQueryDto, PageQueryDto};
use crate::application::use_cases::UseCaseError;
use crate::domain::models::crawl_history::{CrawlHistory, OperationLog, RunStatus};
use crate::domain::models::queue_job::{
    JobPayload, JobPriority, JobStatus, JobTrigger, QueueJob,
};
use crate::domain::repositories::crawl_history_repository::{
    CrawlHistoryRepository, HistoryQuery,
};
use crate::domain::repositories::operation_log_repository::OperationLogRepository;
use crate::domain::repositories::{Page, Pagination};
use crate::domain::services::log_recorder::LogRecorder;
use crate::queue::job_queue::JobQueue;
use serde_json::json;
use std::sync::Arc;
use uuid::Uuid;

/// 执行记录与操作日志用例
pub struct LogUseCase {
    history: Arc<dyn CrawlHistoryRepository>,
    operations: Arc<dyn OperationLogRepository>,
    queue: Arc<dyn JobQueue>,
    recorder: Arc<LogRecorder>,
}

impl LogUseCase {
    pub fn new(
        history: Arc<dyn CrawlHistoryRepository>,
        operations: Arc<dyn OperationLogRepository>,
        queue: Arc<dyn JobQueue>,
        recorder: Arc<LogRecorder>,
    ) -> Self {
        Self {
            history,
            operations,
            queue,
            recorder,
        }
    }

    pub async fn list(&self, query: LogQueryDto) -> Result<Page<CrawlHistory>, UseCaseError> {
        let status = query
            .status
            .as_deref()
            .map(|raw| {
                raw.parse::<RunStatus>().map_err(|_| {
                    UseCaseError::Validation(format!(
                        "unknown status '{}', expected success or failed",
                        raw
                    ))
                })
            })
            .transpose()?;

        Ok(self
            .history
            .list(HistoryQuery {
                source_id: query.source_id,
                job_id: query.job_id,
                status,
                pagination: Pagination::new(query.page, query.per_page),
            })
            .await?)
    }

    pub async fn get(&self, id: Uuid) -> Result<CrawlHistory, UseCaseError> {
        self.history
            .find_by_id(id)
            .await?
            .ok_or(UseCaseError::NotFound("Log"))
    }

    /// 重试失败的执行
    ///
    /// 以相同的来源与参数创建一个新作业，原记录与原作业保持不变。
    /// 只有原作业已永久失败、且来源当前没有排队或运行中的作业时才允许重试
    pub async fn retry(&self, id: Uuid) -> Result<QueueJob, UseCaseError> {
        let record = self.get(id).await?;
        if record.status != RunStatus::Failed {
            return Err(UseCaseError::Conflict(
                "only failed runs can be retried".to_string(),
            ));
        }
        if let Some(job_id) = record.job_id {
            match self.queue.find(job_id).await? {
                Some(job) if job.status != JobStatus::Failed => {
                    return Err(UseCaseError::Conflict(format!(
                        "job {} is still {}; only permanently failed jobs can be retried",
                        job_id, job.status
                    )));
                }
                _ => {}
            }
        }
        if self.queue.has_active_for_source(record.source_id).await? {
            return Err(UseCaseError::Conflict(format!(
                "source {} already has a queued or running job",
                record.source_id
            )));
        }

        let payload = JobPayload {
            source_id: record.source_id,
            schedule_id: record.schedule_id,
            params: record.params,
            trigger: JobTrigger::Retry,
        };
        let job = self.queue.enqueue(payload, JobPriority::High).await?;
        self.recorder
            .audit(
                "log.retry",
                "crawl_history",
                Some(record.id),
                "Failed run re-enqueued",
                Some(json!({ "job_id": job.id, "previous_job_id": record.job_id })),
            )
            .await;
        Ok(job)
    }

    pub async fn delete(&self, id: Uuid) -> Result<(), UseCaseError> {
        if !self.history.delete(id).await? {
            return Err(UseCaseError::NotFound("Log"));
        }
        self.recorder
            .audit("log.delete", "crawl_history", Some(id), "Deleted run log", None)
            .await;
        Ok(())
    }

    pub async fn list_operations(
        &self,
        query: PageQueryDto,
    ) -> Result<Page<OperationLog>, UseCaseError> {
        Ok(self.operations.list(query.pagination()).await?)
    }
}
