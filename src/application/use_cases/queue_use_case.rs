// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::application::dto::query_request::JobQueryDto;
use crate::application::use_cases::UseCaseError;
use crate::domain::models::queue_job::{JobStatus, QueueJob};
use crate::domain::repositories::job_repository::JobQuery;
use crate::domain::repositories::{Page, Pagination};
use crate::queue::job_queue::{JobQueue, QueueStats};
use std::sync::Arc;
use uuid::Uuid;

/// 作业队列查询用例
pub struct QueueUseCase {
    queue: Arc<dyn JobQueue>,
}

impl QueueUseCase {
    pub fn new(queue: Arc<dyn JobQueue>) -> Self {
        Self { queue }
    }

    pub async fn list(&self, query: JobQueryDto) -> Result<Page<QueueJob>, UseCaseError> {
        let status = query
            .status
            .as_deref()
            .map(|raw| {
                raw.parse::<JobStatus>().map_err(|_| {
                    UseCaseError::Validation(format!("unknown job status '{}'", raw))
                })
            })
            .transpose()?;

        Ok(self
            .queue
            .list(JobQuery {
                status,
                source_id: query.source_id,
                pagination: Pagination::new(query.page, query.per_page),
            })
            .await?)
    }

    pub async fn get(&self, id: Uuid) -> Result<QueueJob, UseCaseError> {
        self.queue
            .find(id)
            .await?
            .ok_or(UseCaseError::NotFound("Job"))
    }

    pub async fn stats(&self) -> Result<QueueStats, UseCaseError> {
        Ok(self.queue.stats().await?)
    }
}
