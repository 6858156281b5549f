// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::application::dto::schedule_request::{CreateScheduleDto, UpdateScheduleDto};
use crate::application::use_cases::UseCaseError;
use crate::config::settings::CrawlSettings;
use crate::domain::models::queue_job::{JobPayload, JobPriority, JobTrigger, QueueJob};
use crate::domain::models::schedule::{CrawlParams, Schedule};
use crate::domain::repositories::schedule_repository::{NextRunWrite, ScheduleRepository};
use crate::domain::repositories::source_repository::SourceRepository;
use crate::domain::services::log_recorder::LogRecorder;
use crate::queue::cron::parse_cron;
use crate::queue::job_queue::JobQueue;
use crate::queue::scheduler::next_run_for;
use crate::utils::clock::Clock;
use serde_json::json;
use std::sync::Arc;
use uuid::Uuid;
use validator::Validate;

/// 调度计划管理用例
pub struct ScheduleUseCase {
    schedules: Arc<dyn ScheduleRepository>,
    sources: Arc<dyn SourceRepository>,
    queue: Arc<dyn JobQueue>,
    recorder: Arc<LogRecorder>,
    clock: Arc<dyn Clock>,
    limits: CrawlSettings,
}

impl ScheduleUseCase {
    pub fn new(
        schedules: Arc<dyn ScheduleRepository>,
        sources: Arc<dyn SourceRepository>,
        queue: Arc<dyn JobQueue>,
        recorder: Arc<LogRecorder>,
        clock: Arc<dyn Clock>,
        limits: CrawlSettings,
    ) -> Self {
        Self {
            schedules,
            sources,
            queue,
            recorder,
            clock,
            limits,
        }
    }

    fn check_params(&self, params: &CrawlParams) -> Result<(), UseCaseError> {
        params
            .check_bounds(self.limits.max_depth_limit, self.limits.max_article_limit)
            .map_err(UseCaseError::Validation)
    }

    /// 重新计算下一次运行时间
    fn refresh_next_run(&self, schedule: &mut Schedule) -> Result<(), UseCaseError> {
        schedule.next_run = next_run_for(schedule, self.clock.now())
            .map_err(|e| UseCaseError::Validation(e.to_string()))?;
        Ok(())
    }

    async fn require_schedule(&self, id: Uuid) -> Result<Schedule, UseCaseError> {
        self.schedules
            .find_by_id(id)
            .await?
            .ok_or(UseCaseError::NotFound("Schedule"))
    }

    /// 创建调度计划
    pub async fn create(&self, dto: CreateScheduleDto) -> Result<Schedule, UseCaseError> {
        dto.validate()?;
        let cron_expression = dto.cron_expression.trim().to_string();
        parse_cron(&cron_expression).map_err(|e| UseCaseError::Validation(e.to_string()))?;
        let params = dto.params.into_params(&self.limits);
        self.check_params(&params)?;

        if self.sources.find_by_id(dto.source_id).await?.is_none() {
            return Err(UseCaseError::NotFound("Source"));
        }

        let now = self.clock.now().into();
        let mut schedule = Schedule {
            id: Uuid::new_v4(),
            source_id: dto.source_id,
            cron_expression,
            active: dto.active.unwrap_or(true),
            params,
            last_run: None,
            next_run: None,
            created_at: now,
            updated_at: now,
        };
        self.refresh_next_run(&mut schedule)?;

        let created = self.schedules.create(&schedule).await?;
        self.recorder
            .audit(
                "schedule.create",
                "schedule",
                Some(created.id),
                format!("Created schedule '{}'", created.cron_expression),
                Some(json!({ "source_id": created.source_id, "next_run": created.next_run })),
            )
            .await;
        Ok(created)
    }

    pub async fn get(&self, id: Uuid) -> Result<Schedule, UseCaseError> {
        self.require_schedule(id).await
    }

    pub async fn list(&self, source_id: Option<Uuid>) -> Result<Vec<Schedule>, UseCaseError> {
        Ok(self.schedules.list(source_id).await?)
    }

    /// 更新调度计划
    ///
    /// 修改cron表达式或启停状态都会立即重新计算 `next_run`，停用会清空它
    pub async fn update(&self, id: Uuid, dto: UpdateScheduleDto) -> Result<Schedule, UseCaseError> {
        dto.validate()?;
        let mut schedule = self.require_schedule(id).await?;
        let observed_next_run = schedule.next_run;
        let mut reschedule = false;

        if let Some(expr) = dto.cron_expression {
            let expr = expr.trim().to_string();
            parse_cron(&expr).map_err(|e| UseCaseError::Validation(e.to_string()))?;
            reschedule |= expr != schedule.cron_expression;
            schedule.cron_expression = expr;
        }
        if let Some(active) = dto.active {
            reschedule |= active != schedule.active;
            schedule.active = active;
        }
        if let Some(params) = dto.params {
            schedule.params = params.apply_to(schedule.params);
            self.check_params(&schedule.params)?;
        }
        let next_run = if reschedule || (schedule.active && schedule.next_run.is_none()) {
            self.refresh_next_run(&mut schedule)?;
            NextRunWrite::Replace {
                expected: observed_next_run,
            }
        } else {
            NextRunWrite::Keep
        };
        schedule.updated_at = self.clock.now().into();

        let updated = self.schedules.update(&schedule, next_run).await?;
        self.recorder
            .audit(
                "schedule.update",
                "schedule",
                Some(updated.id),
                "Updated schedule",
                Some(json!({
                    "cron_expression": updated.cron_expression,
                    "active": updated.active,
                    "next_run": updated.next_run,
                })),
            )
            .await;
        Ok(updated)
    }

    pub async fn delete(&self, id: Uuid) -> Result<(), UseCaseError> {
        if !self.schedules.delete(id).await? {
            return Err(UseCaseError::NotFound("Schedule"));
        }
        self.recorder
            .audit("schedule.delete", "schedule", Some(id), "Deleted schedule", None)
            .await;
        Ok(())
    }

    /// 立即运行：以高优先级入队一个作业，不影响计划的 `next_run`
    pub async fn run_now(&self, id: Uuid) -> Result<QueueJob, UseCaseError> {
        let schedule = self.require_schedule(id).await?;
        let payload = JobPayload {
            source_id: schedule.source_id,
            schedule_id: Some(schedule.id),
            params: schedule.params,
            trigger: JobTrigger::Manual,
        };
        let job = self.queue.enqueue(payload, JobPriority::High).await?;
        self.recorder
            .audit(
                "schedule.run",
                "schedule",
                Some(schedule.id),
                "Manual run enqueued",
                Some(json!({ "job_id": job.id })),
            )
            .await;
        Ok(job)
    }
}
