// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use super::helpers::{fixture_site, list_url, setup, start_time, TestContext};
use chrono::{Duration as ChronoDuration, TimeZone, Utc};
use newscrawl::application::dto::crawl_request::CrawlParamsDto;
use newscrawl::application::dto::schedule_request::{CreateScheduleDto, UpdateScheduleDto};
use newscrawl::domain::models::queue_job::{JobStatus, JobTrigger};
use newscrawl::domain::models::schedule::Schedule;
use newscrawl::domain::repositories::job_repository::JobQuery;
use newscrawl::domain::repositories::schedule_repository::NextRunWrite;
use newscrawl::domain::repositories::RepositoryError;
use newscrawl::queue::scheduler::CrawlScheduler;
use newscrawl::utils::clock::Clock;
use std::sync::Arc;
use std::time::Duration;

fn scheduler(ctx: &TestContext) -> Arc<CrawlScheduler> {
    Arc::new(CrawlScheduler::new(
        ctx.repositories.schedules.clone(),
        ctx.queue.clone(),
        ctx.clock.clone() as Arc<dyn Clock>,
        Duration::from_secs(1),
    ))
}

async fn every_five_minutes(ctx: &TestContext) -> Schedule {
    let site = fixture_site().await;
    let source = ctx.create_source(&list_url(&site)).await;
    ctx.app_state()
        .schedules
        .create(CreateScheduleDto {
            source_id: source.id,
            cron_expression: "*/5 * * * *".to_string(),
            active: None,
            params: CrawlParamsDto::default(),
        })
        .await
        .unwrap()
}

#[tokio::test]
async fn test_new_schedule_gets_next_cron_slot() {
    let ctx = setup().await;
    ctx.clock.set(start_time());

    let schedule = every_five_minutes(&ctx).await;

    assert!(schedule.active);
    assert_eq!(schedule.last_run, None);
    assert_eq!(
        schedule.next_run.map(|t| t.with_timezone(&Utc)),
        Some(start_time() + ChronoDuration::minutes(5))
    );
}

#[tokio::test]
async fn test_due_schedule_is_enqueued_once_and_skipped_while_pending() {
    let ctx = setup().await;
    ctx.clock.set(start_time());
    let schedule = every_five_minutes(&ctx).await;
    let scheduler = scheduler(&ctx);

    // not due yet
    let report = scheduler.tick().await.unwrap();
    assert_eq!(report.enqueued, 0);

    ctx.clock.set(Utc.with_ymd_and_hms(2025, 1, 1, 10, 5, 0).unwrap());
    let report = scheduler.tick().await.unwrap();
    assert_eq!(report.enqueued, 1);

    let stored = ctx
        .repositories
        .schedules
        .find_by_id(schedule.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(
        stored.last_run.map(|t| t.with_timezone(&Utc)),
        Some(Utc.with_ymd_and_hms(2025, 1, 1, 10, 5, 0).unwrap())
    );
    assert_eq!(
        stored.next_run.map(|t| t.with_timezone(&Utc)),
        Some(Utc.with_ymd_and_hms(2025, 1, 1, 10, 10, 0).unwrap())
    );

    let jobs = ctx.queue.list(JobQuery::default()).await.unwrap();
    assert_eq!(jobs.total, 1);
    let job = &jobs.items[0];
    assert_eq!(job.status, JobStatus::Queued);
    assert_eq!(job.payload.schedule_id, Some(schedule.id));
    assert_eq!(job.payload.trigger, JobTrigger::Schedule);

    // the first job has not run yet, so the next slot is skipped
    ctx.clock.set(Utc.with_ymd_and_hms(2025, 1, 1, 10, 10, 0).unwrap());
    let report = scheduler.tick().await.unwrap();
    assert_eq!(report.enqueued, 0);
    assert_eq!(report.skipped, 1);
    assert_eq!(ctx.queue.list(JobQuery::default()).await.unwrap().total, 1);

    let stored = ctx
        .repositories
        .schedules
        .find_by_id(schedule.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(
        stored.next_run.map(|t| t.with_timezone(&Utc)),
        Some(Utc.with_ymd_and_hms(2025, 1, 1, 10, 15, 0).unwrap())
    );
}

#[tokio::test]
async fn test_missed_slots_do_not_pile_up() {
    let ctx = setup().await;
    ctx.clock.set(start_time());
    every_five_minutes(&ctx).await;
    let scheduler = scheduler(&ctx);

    // downtime across many slots
    ctx.clock.set(Utc.with_ymd_and_hms(2025, 1, 1, 12, 2, 0).unwrap());
    let report = scheduler.tick().await.unwrap();
    assert_eq!(report.enqueued, 1);
    assert_eq!(ctx.queue.list(JobQuery::default()).await.unwrap().total, 1);

    let schedules = ctx.app_state().schedules.list(None).await.unwrap();
    assert_eq!(
        schedules[0].next_run.map(|t| t.with_timezone(&Utc)),
        Some(Utc.with_ymd_and_hms(2025, 1, 1, 12, 5, 0).unwrap())
    );
}

#[tokio::test]
async fn test_concurrent_ticks_dispatch_exactly_once() {
    let ctx = setup().await;
    ctx.clock.set(start_time());
    every_five_minutes(&ctx).await;
    let first = scheduler(&ctx);
    let second = scheduler(&ctx);

    ctx.clock.set(Utc.with_ymd_and_hms(2025, 1, 1, 10, 5, 0).unwrap());
    let (a, b) = tokio::join!(first.tick(), second.tick());
    let enqueued = a.unwrap().enqueued + b.unwrap().enqueued;

    assert_eq!(enqueued, 1);
    assert_eq!(ctx.queue.list(JobQuery::default()).await.unwrap().total, 1);
}

#[tokio::test]
async fn test_inactive_schedule_is_never_dispatched() {
    let ctx = setup().await;
    ctx.clock.set(start_time());
    let schedule = every_five_minutes(&ctx).await;
    let updated = ctx
        .app_state()
        .schedules
        .update(
            schedule.id,
            UpdateScheduleDto {
                active: Some(false),
                ..UpdateScheduleDto::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.next_run, None);

    ctx.clock.set(Utc.with_ymd_and_hms(2025, 1, 1, 11, 0, 0).unwrap());
    let report = scheduler(&ctx).tick().await.unwrap();

    assert_eq!(report.enqueued, 0);
    assert_eq!(ctx.queue.list(JobQuery::default()).await.unwrap().total, 0);
}

#[tokio::test]
async fn test_run_now_enqueues_manual_job_without_moving_schedule() {
    let ctx = setup().await;
    ctx.clock.set(start_time());
    let schedule = every_five_minutes(&ctx).await;

    let job = ctx.app_state().schedules.run_now(schedule.id).await.unwrap();

    assert_eq!(job.payload.trigger, JobTrigger::Manual);
    assert_eq!(job.payload.schedule_id, Some(schedule.id));
    let stored = ctx
        .repositories
        .schedules
        .find_by_id(schedule.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stored.next_run, schedule.next_run);
    assert_eq!(stored.last_run, None);
}

#[tokio::test]
async fn test_tick_stamps_updated_at_from_scheduler_clock() {
    let ctx = setup().await;
    ctx.clock.set(start_time());
    let schedule = every_five_minutes(&ctx).await;

    let tick_time = Utc.with_ymd_and_hms(2025, 1, 1, 10, 5, 0).unwrap();
    ctx.clock.set(tick_time);
    scheduler(&ctx).tick().await.unwrap();

    let stored = ctx
        .repositories
        .schedules
        .find_by_id(schedule.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stored.updated_at.with_timezone(&Utc), tick_time);
}

#[tokio::test]
async fn test_params_edit_keeps_run_times_advanced_by_concurrent_tick() {
    let ctx = setup().await;
    ctx.clock.set(start_time());
    let schedule = every_five_minutes(&ctx).await;

    // copy read by an editor before the tick lands
    let mut edited = ctx
        .repositories
        .schedules
        .find_by_id(schedule.id)
        .await
        .unwrap()
        .unwrap();

    let tick_time = Utc.with_ymd_and_hms(2025, 1, 1, 10, 5, 0).unwrap();
    ctx.clock.set(tick_time);
    assert_eq!(scheduler(&ctx).tick().await.unwrap().enqueued, 1);

    edited.params.article_limit = 3;
    let updated = ctx
        .repositories
        .schedules
        .update(&edited, NextRunWrite::Keep)
        .await
        .unwrap();

    assert_eq!(updated.params.article_limit, 3);
    assert_eq!(
        updated.last_run.map(|t| t.with_timezone(&Utc)),
        Some(tick_time)
    );
    assert_eq!(
        updated.next_run.map(|t| t.with_timezone(&Utc)),
        Some(tick_time + ChronoDuration::minutes(5))
    );

    // a second tick in the same slot must not dispatch again
    assert_eq!(scheduler(&ctx).tick().await.unwrap().enqueued, 0);
}

#[tokio::test]
async fn test_reschedule_from_stale_read_is_a_conflict() {
    let ctx = setup().await;
    ctx.clock.set(start_time());
    let schedule = every_five_minutes(&ctx).await;
    let mut edited = ctx
        .repositories
        .schedules
        .find_by_id(schedule.id)
        .await
        .unwrap()
        .unwrap();
    let observed = edited.next_run;

    ctx.clock.set(Utc.with_ymd_and_hms(2025, 1, 1, 10, 5, 0).unwrap());
    scheduler(&ctx).tick().await.unwrap();

    edited.cron_expression = "0 * * * *".to_string();
    edited.next_run = Some(Utc.with_ymd_and_hms(2025, 1, 1, 11, 0, 0).unwrap().into());
    let result = ctx
        .repositories
        .schedules
        .update(&edited, NextRunWrite::Replace { expected: observed })
        .await;

    assert!(matches!(result, Err(RepositoryError::Conflict(_))));
    let stored = ctx
        .repositories
        .schedules
        .find_by_id(schedule.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stored.cron_expression, "*/5 * * * *");
}

#[tokio::test]
async fn test_cron_edit_after_tick_reschedules_from_fresh_read() {
    let ctx = setup().await;
    ctx.clock.set(start_time());
    let schedule = every_five_minutes(&ctx).await;

    let tick_time = Utc.with_ymd_and_hms(2025, 1, 1, 10, 5, 0).unwrap();
    ctx.clock.set(tick_time);
    scheduler(&ctx).tick().await.unwrap();

    let updated = ctx
        .app_state()
        .schedules
        .update(
            schedule.id,
            UpdateScheduleDto {
                cron_expression: Some("0 * * * *".to_string()),
                ..UpdateScheduleDto::default()
            },
        )
        .await
        .unwrap();

    assert_eq!(
        updated.last_run.map(|t| t.with_timezone(&Utc)),
        Some(tick_time)
    );
    assert_eq!(
        updated.next_run.map(|t| t.with_timezone(&Utc)),
        Some(Utc.with_ymd_and_hms(2025, 1, 1, 11, 0, 0).unwrap())
    );
}
