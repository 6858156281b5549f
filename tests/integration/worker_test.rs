// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use super::helpers::{fixture_site, list_url, params, setup, setup_with, slow_site, TestContext};
use newscrawl::domain::models::crawl_error::CrawlErrorKind;
use newscrawl::domain::models::crawl_history::{CrawlHistory, RunStatus};
use newscrawl::domain::models::queue_job::{JobPayload, JobPriority, JobStatus, JobTrigger};
use newscrawl::domain::models::schedule::CrawlParams;
use newscrawl::domain::repositories::crawl_history_repository::HistoryQuery;
use newscrawl::workers::source_limiter::SourceLimiter;
use newscrawl::workers::CrawlWorker;
use std::sync::Arc;
use std::time::{Duration, Instant};
use uuid::Uuid;

fn payload(source_id: Uuid, params: CrawlParams) -> JobPayload {
    JobPayload {
        source_id,
        schedule_id: None,
        params,
        trigger: JobTrigger::Manual,
    }
}

async fn history_for(ctx: &TestContext, job_id: Uuid) -> Vec<CrawlHistory> {
    ctx.repositories
        .history
        .list(HistoryQuery {
            job_id: Some(job_id),
            ..HistoryQuery::default()
        })
        .await
        .unwrap()
        .items
}

#[tokio::test]
async fn test_worker_completes_job_and_records_history() {
    let ctx = setup().await;
    let site = fixture_site().await;
    let source = ctx.create_source(&list_url(&site)).await;
    let job = ctx
        .queue
        .enqueue(payload(source.id, params(10, 10_000)), JobPriority::Normal)
        .await
        .unwrap();

    let worker = ctx.worker();
    assert!(worker.run_once().await.unwrap());
    assert!(!worker.run_once().await.unwrap());

    let stored = ctx.queue.find(job.id).await.unwrap().unwrap();
    assert_eq!(stored.status, JobStatus::Completed);
    let summary = stored.result.unwrap();
    assert_eq!(summary.new_articles, 10);
    assert_eq!(summary.duplicates, 0);

    let history = history_for(&ctx, job.id).await;
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].status, RunStatus::Success);
    assert_eq!(history[0].attempt, 1);
    assert_eq!(history[0].found, 10);
    assert_eq!(history[0].new_articles, 10);
}

#[tokio::test]
async fn test_job_timeout_fails_job_with_navigation_timeout() {
    let ctx = setup_with(|settings| settings.queue.max_attempts = 1).await;
    let site = slow_site(Duration::from_secs(5)).await;
    let source = ctx.create_source(&list_url(&site)).await;
    let job = ctx
        .queue
        .enqueue(payload(source.id, params(10, 100)), JobPriority::Normal)
        .await
        .unwrap();

    let started = Instant::now();
    assert!(ctx.worker().run_once().await.unwrap());
    assert!(started.elapsed() < Duration::from_secs(4));

    let stored = ctx.queue.find(job.id).await.unwrap().unwrap();
    assert_eq!(stored.status, JobStatus::Failed);
    assert_eq!(stored.error_kind, Some(CrawlErrorKind::NavigationTimeout));
    assert_eq!(stored.attempt, 1);

    let history = history_for(&ctx, job.id).await;
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].status, RunStatus::Failed);
    assert_eq!(history[0].error_kind, Some(CrawlErrorKind::NavigationTimeout));
    assert_eq!(history[0].new_articles, 0);
}

#[tokio::test]
async fn test_missing_source_fails_without_retry() {
    let ctx = setup().await;
    let job = ctx
        .queue
        .enqueue(payload(Uuid::new_v4(), params(10, 1_000)), JobPriority::Normal)
        .await
        .unwrap();

    assert!(ctx.worker().run_once().await.unwrap());

    let stored = ctx.queue.find(job.id).await.unwrap().unwrap();
    assert_eq!(stored.status, JobStatus::Failed);
    assert_eq!(stored.error_kind, Some(CrawlErrorKind::ValidationError));
    assert_eq!(history_for(&ctx, job.id).await.len(), 1);
}

#[tokio::test]
async fn test_busy_source_releases_job() {
    let ctx = setup().await;
    let site = fixture_site().await;
    let source = ctx.create_source(&list_url(&site)).await;
    let job = ctx
        .queue
        .enqueue(payload(source.id, params(10, 10_000)), JobPriority::Normal)
        .await
        .unwrap();

    let limiter = Arc::new(SourceLimiter::new(1));
    let _held = limiter.try_acquire(source.id).unwrap();
    let worker = CrawlWorker::new(
        ctx.queue.clone(),
        ctx.repositories.sources.clone(),
        ctx.pipeline.clone(),
        ctx.recorder.clone(),
        limiter.clone(),
        Duration::from_millis(10),
    );

    assert!(worker.run_once().await.unwrap());

    let stored = ctx.queue.find(job.id).await.unwrap().unwrap();
    assert_eq!(stored.status, JobStatus::Queued);
    assert_eq!(stored.attempt, 0);
    assert!(history_for(&ctx, job.id).await.is_empty());
}
