// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use chrono::{DateTime, FixedOffset, Utc};
use serde_json::Value;
use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;

use crate::domain::models::crawl_history::{CrawlHistory, OperationLog, RunStatus};
use crate::domain::models::crawl_outcome::CrawlOutcome;
use crate::domain::models::queue_job::JobFailure;
use crate::domain::models::schedule::CrawlParams;
use crate::domain::repositories::crawl_history_repository::CrawlHistoryRepository;
use crate::domain::repositories::operation_log_repository::OperationLogRepository;
use crate::domain::repositories::RepositoryError;

/// 一次执行的结果，用于生成执行记录
#[derive(Debug, Clone)]
pub struct RunRecord {
    pub job_id: Option<Uuid>,
    pub source_id: Uuid,
    pub schedule_id: Option<Uuid>,
    pub params: CrawlParams,
    pub attempt: u32,
    pub outcome: CrawlOutcome,
    /// 执行失败时的原因
    pub failure: Option<JobFailure>,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

impl RunRecord {
    fn message(&self) -> String {
        match &self.failure {
            Some(failure) => failure.message.clone(),
            None => format!(
                "processed {} of {} candidates: {} new, {} duplicates, {} errors",
                self.outcome.processed,
                self.outcome.found,
                self.outcome.new_articles,
                self.outcome.duplicates,
                self.outcome.errors
            ),
        }
    }

    fn into_history(self) -> CrawlHistory {
        let message = self.message();
        let duration_ms = (self.finished_at - self.started_at)
            .num_milliseconds()
            .max(0) as u64;
        let (status, error_kind) = match &self.failure {
            Some(failure) => (RunStatus::Failed, Some(failure.kind)),
            None => (RunStatus::Success, None),
        };
        CrawlHistory {
            id: Uuid::new_v4(),
            job_id: self.job_id,
            source_id: self.source_id,
            schedule_id: self.schedule_id,
            status,
            params: self.params,
            attempt: self.attempt,
            found: self.outcome.found,
            processed: self.outcome.processed,
            new_articles: self.outcome.new_articles,
            duplicates: self.outcome.duplicates,
            errors: self.outcome.errors,
            duration_ms,
            message,
            error_kind,
            failures: self.outcome.failures,
            started_at: self.started_at.into(),
            finished_at: self.finished_at.into(),
        }
    }
}

/// 日志与执行记录服务
pub struct LogRecorder {
    history: Arc<dyn CrawlHistoryRepository>,
    operations: Arc<dyn OperationLogRepository>,
}

impl LogRecorder {
    pub fn new(
        history: Arc<dyn CrawlHistoryRepository>,
        operations: Arc<dyn OperationLogRepository>,
    ) -> Self {
        Self {
            history,
            operations,
        }
    }

    /// 写入一条执行记录
    pub async fn record_run(&self, record: RunRecord) -> Result<CrawlHistory, RepositoryError> {
        let history = record.into_history();
        match history.status {
            RunStatus::Success => info!(
                source_id = %history.source_id,
                job_id = ?history.job_id,
                duration_ms = history.duration_ms,
                "{}",
                history.message
            ),
            RunStatus::Failed => warn!(
                source_id = %history.source_id,
                job_id = ?history.job_id,
                error_kind = ?history.error_kind,
                "Crawl run failed: {}",
                history.message
            ),
        }
        self.history.create(&history).await
    }

    /// 写入一条操作审计日志
    ///
    /// # 参数
    ///
    /// * `operation` - 操作名，如 `schedule.create`
    /// * `entity_type` - 实体类型
    /// * `entity_id` - 实体ID
    /// * `status` - 操作结果
    /// * `message` - 描述
    /// * `details` - 附加信息
    pub async fn record_operation(
        &self,
        operation: &str,
        entity_type: &str,
        entity_id: Option<Uuid>,
        status: RunStatus,
        message: impl Into<String>,
        details: Option<Value>,
    ) -> Result<OperationLog, RepositoryError> {
        let now: DateTime<FixedOffset> = Utc::now().into();
        let log = OperationLog {
            id: Uuid::new_v4(),
            operation: operation.to_string(),
            entity_type: entity_type.to_string(),
            entity_id,
            status,
            message: message.into(),
            details,
            created_at: now,
        };
        self.operations.create(&log).await
    }

    /// 记录一次成功的管理操作，写入失败只记录警告
    pub async fn audit(
        &self,
        operation: &str,
        entity_type: &str,
        entity_id: Option<Uuid>,
        message: impl Into<String>,
        details: Option<Value>,
    ) {
        if let Err(e) = self
            .record_operation(
                operation,
                entity_type,
                entity_id,
                RunStatus::Success,
                message,
                details,
            )
            .await
        {
            warn!(operation, "Failed to write operation log: {}", e);
        }
    }
}
