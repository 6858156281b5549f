// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::queue_job::{JobPayload, JobPriority, JobTrigger};
use crate::domain::models::schedule::Schedule;
use crate::domain::repositories::schedule_repository::ScheduleRepository;
use crate::domain::repositories::RepositoryError;
use crate::queue::cron::{compute_next_run, CronError};
use crate::queue::job_queue::{JobQueue, QueueError};
use crate::utils::clock::Clock;
use chrono::{DateTime, FixedOffset, Utc};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::task::JoinHandle;
use tokio::time::interval;
use tracing::{debug, error, info};

/// 调度器错误类型
#[derive(Error, Debug)]
pub enum SchedulerError {
    #[error("Repository error: {0}")]
    Repository(#[from] RepositoryError),
    #[error("Queue error: {0}")]
    Queue(#[from] QueueError),
}

/// 一次tick的结果
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickReport {
    /// 新入队的作业数
    pub enqueued: u32,
    /// 因已有排队/运行中作业而跳过的计划数
    pub skipped: u32,
    /// 回收的过期作业数
    pub recovered: u64,
}

/// 计算调度计划的下一次运行时间
///
/// 停用的计划没有下一次运行时间；起点取上一次运行时间与当前时间中较晚者，
/// 保证结果不早于本次计算的时间
pub fn next_run_for(
    schedule: &Schedule,
    now: DateTime<Utc>,
) -> Result<Option<DateTime<FixedOffset>>, CronError> {
    if !schedule.active {
        return Ok(None);
    }
    let from = schedule
        .last_run
        .map(|last| last.with_timezone(&Utc))
        .filter(|last| *last > now)
        .unwrap_or(now);
    Ok(Some(compute_next_run(&schedule.cron_expression, from)?.into()))
}

/// cron调度器
///
/// 每次tick找出到期的计划，为每个计划入队一个作业并推进 `last_run`/`next_run`。
/// 计划已有排队或运行中的作业时只推进 `next_run`，避免作业堆积。
pub struct CrawlScheduler {
    schedules: Arc<dyn ScheduleRepository>,
    queue: Arc<dyn JobQueue>,
    clock: Arc<dyn Clock>,
    tick_interval: Duration,
}

impl CrawlScheduler {
    /// 创建调度器
    ///
    /// # 参数
    ///
    /// * `schedules` - 调度计划仓库
    /// * `queue` - 作业队列
    /// * `clock` - 时钟
    /// * `tick_interval` - tick间隔
    pub fn new(
        schedules: Arc<dyn ScheduleRepository>,
        queue: Arc<dyn JobQueue>,
        clock: Arc<dyn Clock>,
        tick_interval: Duration,
    ) -> Self {
        Self {
            schedules,
            queue,
            clock,
            tick_interval,
        }
    }

    /// 执行一次调度
    pub async fn tick(&self) -> Result<TickReport, SchedulerError> {
        let now = self.clock.now();
        let mut report = TickReport {
            recovered: self.queue.recover_stale().await?,
            ..TickReport::default()
        };

        for schedule in self.schedules.find_due(now.into()).await? {
            let Some(expected) = schedule.next_run else {
                continue;
            };
            let next_run: DateTime<FixedOffset> =
                match compute_next_run(&schedule.cron_expression, now) {
                    Ok(next) => next.into(),
                    Err(e) => {
                        error!(schedule_id = %schedule.id, "Cannot compute next run: {}", e);
                        continue;
                    }
                };

            if self.queue.has_active_for_schedule(schedule.id).await? {
                if self
                    .schedules
                    .advance(schedule.id, now.into(), expected, None, next_run)
                    .await?
                {
                    info!(
                        schedule_id = %schedule.id,
                        next_run = %next_run,
                        "Previous job still pending, skipping this run"
                    );
                    report.skipped += 1;
                }
                continue;
            }

            // whoever advances next_run owns this dispatch
            if !self
                .schedules
                .advance(schedule.id, now.into(), expected, Some(now.into()), next_run)
                .await?
            {
                debug!(schedule_id = %schedule.id, "Schedule already dispatched by another tick");
                continue;
            }

            let payload = JobPayload {
                source_id: schedule.source_id,
                schedule_id: Some(schedule.id),
                params: schedule.params,
                trigger: JobTrigger::Schedule,
            };
            let job = self.queue.enqueue(payload, JobPriority::Normal).await?;
            info!(
                schedule_id = %schedule.id,
                job_id = %job.id,
                next_run = %next_run,
                "Scheduled crawl enqueued"
            );
            report.enqueued += 1;
        }

        Ok(report)
    }

    /// 启动调度器后台任务
    ///
    /// # 返回值
    ///
    /// 返回后台任务的句柄
    pub fn start(self: Arc<Self>) -> JoinHandle<()> {
        tokio::spawn(async move {
            let mut ticker = interval(self.tick_interval);
            info!(
                "Scheduler started, ticking every {}s",
                self.tick_interval.as_secs()
            );

            loop {
                ticker.tick().await;
                match self.tick().await {
                    Ok(report) if report.enqueued > 0 || report.skipped > 0 => {
                        info!(
                            enqueued = report.enqueued,
                            skipped = report.skipped,
                            "Scheduler tick"
                        );
                    }
                    Ok(_) => debug!("Scheduler tick, nothing due"),
                    Err(e) => error!("Scheduler tick failed: {}", e),
                }
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::schedule::CrawlParams;
    use chrono::TimeZone;
    use uuid::Uuid;

    fn schedule(active: bool, last_run: Option<DateTime<Utc>>) -> Schedule {
        let created = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap();
        Schedule {
            id: Uuid::new_v4(),
            source_id: Uuid::new_v4(),
            cron_expression: "*/5 * * * *".to_string(),
            active,
            params: CrawlParams {
                max_depth: 0,
                article_limit: 10,
                timeout_ms: 1_000,
                full_content: false,
                follow_links: false,
            },
            last_run: last_run.map(Into::into),
            next_run: None,
            created_at: created.into(),
            updated_at: created.into(),
        }
    }

    #[test]
    fn test_inactive_schedule_has_no_next_run() {
        let now = Utc.with_ymd_and_hms(2025, 1, 1, 10, 0, 0).unwrap();
        assert_eq!(next_run_for(&schedule(false, None), now).unwrap(), None);
    }

    #[test]
    fn test_next_run_is_never_in_the_past() {
        let now = Utc.with_ymd_and_hms(2025, 1, 1, 10, 1, 0).unwrap();
        let stale = Utc.with_ymd_and_hms(2025, 1, 1, 8, 0, 0).unwrap();
        let next = next_run_for(&schedule(true, Some(stale)), now).unwrap().unwrap();
        assert_eq!(next, Utc.with_ymd_and_hms(2025, 1, 1, 10, 5, 0).unwrap());
    }
}
