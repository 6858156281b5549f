// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use super::helpers::{params, setup};
use chrono::Duration as ChronoDuration;
use newscrawl::domain::models::crawl_error::CrawlErrorKind;
use newscrawl::domain::models::crawl_outcome::CrawlSummary;
use newscrawl::domain::models::queue_job::{
    FailureTransition, JobFailure, JobPayload, JobPriority, JobStatus, JobTrigger,
};
use newscrawl::queue::job_queue::QueueError;
use std::time::Duration;
use uuid::Uuid;

fn payload(source_id: Uuid) -> JobPayload {
    JobPayload {
        source_id,
        schedule_id: None,
        params: params(10, 1_000),
        trigger: JobTrigger::Manual,
    }
}

#[tokio::test]
async fn test_take_orders_by_priority_then_fifo() {
    let ctx = setup().await;
    let low = ctx
        .queue
        .enqueue(payload(Uuid::new_v4()), JobPriority::Low)
        .await
        .unwrap();
    ctx.clock.advance(ChronoDuration::seconds(1));
    let normal_first = ctx
        .queue
        .enqueue(payload(Uuid::new_v4()), JobPriority::Normal)
        .await
        .unwrap();
    ctx.clock.advance(ChronoDuration::seconds(1));
    let high = ctx
        .queue
        .enqueue(payload(Uuid::new_v4()), JobPriority::High)
        .await
        .unwrap();
    ctx.clock.advance(ChronoDuration::seconds(1));
    let normal_second = ctx
        .queue
        .enqueue(payload(Uuid::new_v4()), JobPriority::Normal)
        .await
        .unwrap();

    let worker = Uuid::new_v4();
    let mut order = Vec::new();
    while let Some(job) = ctx.queue.take(worker).await.unwrap() {
        order.push(job.id);
    }

    assert_eq!(order, vec![high.id, normal_first.id, normal_second.id, low.id]);
}

#[tokio::test]
async fn test_only_one_worker_claims_a_job() {
    let ctx = setup().await;
    ctx.queue
        .enqueue(payload(Uuid::new_v4()), JobPriority::Normal)
        .await
        .unwrap();

    let takes = (0..8).map(|_| {
        let queue = ctx.queue.clone();
        tokio::spawn(async move { queue.take(Uuid::new_v4()).await.unwrap() })
    });
    let results = futures::future::join_all(takes).await;
    let winners = results
        .into_iter()
        .filter(|r| matches!(r, Ok(Some(_))))
        .count();

    assert_eq!(winners, 1);
    let stats = ctx.queue.stats().await.unwrap();
    assert_eq!(stats.running, 1);
    assert_eq!(stats.queued, 0);
}

#[tokio::test]
async fn test_transient_failure_retries_with_backoff_until_cap() {
    let ctx = setup().await;
    let job = ctx
        .queue
        .enqueue(payload(Uuid::new_v4()), JobPriority::Normal)
        .await
        .unwrap();
    let worker = Uuid::new_v4();
    let failure = JobFailure::new(CrawlErrorKind::NetworkError, "connection refused");

    let claimed = ctx.queue.take(worker).await.unwrap().unwrap();
    let transition = ctx.queue.fail(&claimed, worker, &failure).await.unwrap();
    assert_eq!(
        transition,
        FailureTransition::Retry {
            attempt: 1,
            delay: Duration::from_secs(10)
        }
    );

    // not eligible until the backoff has elapsed
    assert!(ctx.queue.take(worker).await.unwrap().is_none());
    ctx.clock.advance(ChronoDuration::seconds(10));
    let claimed = ctx.queue.take(worker).await.unwrap().unwrap();
    assert_eq!(claimed.id, job.id);
    assert_eq!(claimed.attempt, 1);

    let transition = ctx.queue.fail(&claimed, worker, &failure).await.unwrap();
    assert_eq!(
        transition,
        FailureTransition::Retry {
            attempt: 2,
            delay: Duration::from_secs(20)
        }
    );

    ctx.clock.advance(ChronoDuration::seconds(20));
    let claimed = ctx.queue.take(worker).await.unwrap().unwrap();
    let transition = ctx.queue.fail(&claimed, worker, &failure).await.unwrap();
    assert_eq!(transition, FailureTransition::GiveUp { attempt: 3 });

    let stored = ctx.queue.find(job.id).await.unwrap().unwrap();
    assert_eq!(stored.status, JobStatus::Failed);
    assert_eq!(stored.attempt, 3);
    assert_eq!(stored.error_kind, Some(CrawlErrorKind::NetworkError));
    assert!(stored.failed_at.is_some());

    ctx.clock.advance(ChronoDuration::minutes(30));
    assert!(ctx.queue.take(worker).await.unwrap().is_none());
}

#[tokio::test]
async fn test_validation_failure_is_not_retried() {
    let ctx = setup().await;
    ctx.queue
        .enqueue(payload(Uuid::new_v4()), JobPriority::Normal)
        .await
        .unwrap();
    let worker = Uuid::new_v4();

    let claimed = ctx.queue.take(worker).await.unwrap().unwrap();
    let transition = ctx
        .queue
        .fail(
            &claimed,
            worker,
            &JobFailure::new(CrawlErrorKind::ValidationError, "source not found"),
        )
        .await
        .unwrap();

    assert_eq!(transition, FailureTransition::GiveUp { attempt: 1 });
    assert_eq!(ctx.queue.stats().await.unwrap().failed, 1);
}

#[tokio::test]
async fn test_completed_job_is_terminal() {
    let ctx = setup().await;
    ctx.queue
        .enqueue(payload(Uuid::new_v4()), JobPriority::Normal)
        .await
        .unwrap();
    let worker = Uuid::new_v4();
    let claimed = ctx.queue.take(worker).await.unwrap().unwrap();
    let summary = CrawlSummary {
        processed: 3,
        new_articles: 2,
        duplicates: 1,
        errors: 0,
    };

    ctx.queue.complete(&claimed, worker, &summary).await.unwrap();

    let again = ctx
        .queue
        .fail(
            &claimed,
            worker,
            &JobFailure::new(CrawlErrorKind::NetworkError, "late failure"),
        )
        .await;
    assert!(matches!(again, Err(QueueError::LostClaim(id)) if id == claimed.id));

    let stored = ctx.queue.find(claimed.id).await.unwrap().unwrap();
    assert_eq!(stored.status, JobStatus::Completed);
    assert_eq!(stored.result, Some(summary));
}

#[tokio::test]
async fn test_stale_running_job_is_recovered() {
    let ctx = setup().await;
    let job = ctx
        .queue
        .enqueue(payload(Uuid::new_v4()), JobPriority::Normal)
        .await
        .unwrap();
    let crashed_worker = Uuid::new_v4();
    let claimed = ctx.queue.take(crashed_worker).await.unwrap().unwrap();

    assert_eq!(ctx.queue.recover_stale().await.unwrap(), 0);

    // lock = job timeout (1s) + grace
    let grace = ctx.settings.queue.lock_grace_secs as i64;
    ctx.clock.advance(ChronoDuration::seconds(grace + 2));
    assert_eq!(ctx.queue.recover_stale().await.unwrap(), 1);

    let summary = CrawlSummary::default();
    let late = ctx.queue.complete(&claimed, crashed_worker, &summary).await;
    assert!(matches!(late, Err(QueueError::LostClaim(_))));

    let reclaimed = ctx.queue.take(Uuid::new_v4()).await.unwrap().unwrap();
    assert_eq!(reclaimed.id, job.id);
    assert_eq!(reclaimed.attempt, 0);
}

#[tokio::test]
async fn test_release_does_not_consume_attempt() {
    let ctx = setup().await;
    ctx.queue
        .enqueue(payload(Uuid::new_v4()), JobPriority::Normal)
        .await
        .unwrap();
    let worker = Uuid::new_v4();
    let claimed = ctx.queue.take(worker).await.unwrap().unwrap();

    ctx.queue
        .release(&claimed, worker, Duration::from_secs(5))
        .await
        .unwrap();
    assert!(ctx.queue.take(worker).await.unwrap().is_none());

    ctx.clock.advance(ChronoDuration::seconds(5));
    let again = ctx.queue.take(worker).await.unwrap().unwrap();
    assert_eq!(again.attempt, 0);
}
