// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use super::helpers::{
    failing_site, fixture_site, list_url, params, setup, setup_with, TestContext,
};
use axum::http::StatusCode;
use axum_test::TestServer;
use newscrawl::domain::models::queue_job::{JobPayload, JobPriority, JobStatus, JobTrigger};
use newscrawl::domain::repositories::job_repository::JobQuery;
use newscrawl::presentation::routes::routes;
use serde_json::{json, Value};
use uuid::Uuid;

fn server(ctx: &TestContext) -> TestServer {
    TestServer::new(routes(ctx.app_state())).unwrap()
}

fn source_body(base_url: &str) -> Value {
    json!({
        "name": "Fixture News",
        "base_url": base_url,
        "driver": "cheerio",
        "selectors": {
            "list": [".pb-3 a"],
            "title": [".prosed"],
            "content": [".pb-2"]
        }
    })
}

#[tokio::test]
async fn test_health_check() {
    let ctx = setup().await;
    let response = server(&ctx).get("/health").await;

    assert_eq!(response.status_code(), StatusCode::OK);
    assert_eq!(response.text(), "OK");
}

#[tokio::test]
async fn test_create_source_validates_selectors() {
    let ctx = setup().await;
    let server = server(&ctx);

    let mut body = source_body("https://news.example.com/latest");
    body["selectors"]["list"] = json!([]);
    let response = server.post("/api/sources").json(&body).await;
    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);

    let mut body = source_body("https://news.example.com/latest");
    body["selectors"]["title"] = json!(["div[["]);
    let response = server.post("/api/sources").json(&body).await;
    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);

    let mut body = source_body("https://news.example.com/latest");
    body["driver"] = json!("lynx");
    let response = server.post("/api/sources").json(&body).await;
    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);

    let response = server
        .post("/api/sources")
        .json(&source_body("https://news.example.com/latest"))
        .await;
    assert_eq!(response.status_code(), StatusCode::CREATED);
    let created: Value = response.json();
    assert_eq!(created["driver"], "cheerio");
    assert_eq!(created["active"], true);
}

#[tokio::test]
async fn test_unknown_source_returns_not_found() {
    let ctx = setup().await;
    let response = server(&ctx)
        .get(&format!("/api/sources/{}", Uuid::new_v4()))
        .await;

    assert_eq!(response.status_code(), StatusCode::NOT_FOUND);
    let body: Value = response.json();
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn test_schedule_lifecycle_over_http() {
    let ctx = setup().await;
    let server = server(&ctx);
    let source: Value = server
        .post("/api/sources")
        .json(&source_body("https://news.example.com/latest"))
        .await
        .json();
    let source_id = source["id"].as_str().unwrap().to_string();

    let response = server
        .post("/api/schedules")
        .json(&json!({ "source_id": source_id, "cron_expression": "not a cron" }))
        .await;
    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);

    let response = server
        .post("/api/schedules")
        .json(&json!({
            "source_id": source_id,
            "cron_expression": "0 * * * *",
            "params": { "article_limit": 5 }
        }))
        .await;
    assert_eq!(response.status_code(), StatusCode::CREATED);
    let schedule: Value = response.json();
    assert!(schedule["next_run"].is_string());
    assert_eq!(schedule["params"]["article_limit"], 5);
    let schedule_id = schedule["id"].as_str().unwrap().to_string();

    let response = server
        .post(&format!("/api/schedules/{}/run", schedule_id))
        .await;
    assert_eq!(response.status_code(), StatusCode::ACCEPTED);
    let job: Value = response.json();
    assert_eq!(job["priority"], "high");
    assert_eq!(job["status"], "queued");

    let stats: Value = server.get("/api/queue/stats").await.json();
    assert_eq!(stats["queued"], 1);
    assert_eq!(stats["running"], 0);

    // referenced by a schedule
    let response = server.delete(&format!("/api/sources/{}", source_id)).await;
    assert_eq!(response.status_code(), StatusCode::CONFLICT);

    let response = server
        .delete(&format!("/api/schedules/{}", schedule_id))
        .await;
    assert_eq!(response.status_code(), StatusCode::NO_CONTENT);
    let response = server.get(&format!("/api/schedules/{}", schedule_id)).await;
    assert_eq!(response.status_code(), StatusCode::NOT_FOUND);

    let operations: Value = server.get("/api/operation-logs").await.json();
    assert!(operations["total"].as_u64().unwrap() >= 3);
}

#[tokio::test]
async fn test_retry_unknown_log_returns_not_found() {
    let ctx = setup().await;
    let response = server(&ctx)
        .post(&format!("/api/logs/{}/retry", Uuid::new_v4()))
        .await;

    assert_eq!(response.status_code(), StatusCode::NOT_FOUND);
}

/// 为来源入队一个作业并由工作器执行一次，返回作业ID与其执行记录ID
async fn run_failing_job(ctx: &TestContext, source_id: Uuid) -> (Uuid, String) {
    let job = ctx
        .queue
        .enqueue(
            JobPayload {
                source_id,
                schedule_id: None,
                params: params(10, 5_000),
                trigger: JobTrigger::Manual,
            },
            JobPriority::Normal,
        )
        .await
        .unwrap();
    assert!(ctx.worker().run_once().await.unwrap());

    let logs: Value = server(ctx)
        .get("/api/logs")
        .add_query_param("job_id", job.id)
        .await
        .json();
    assert_eq!(logs["total"], 1);
    assert_eq!(logs["items"][0]["status"], "failed");
    (job.id, logs["items"][0]["id"].as_str().unwrap().to_string())
}

#[tokio::test]
async fn test_retry_is_rejected_while_job_is_still_retrying() {
    let ctx = setup().await;
    let site = failing_site().await;
    let source = ctx.create_source(&list_url(&site)).await;
    let (job_id, log_id) = run_failing_job(&ctx, source.id).await;

    // first failure of three allowed attempts: the job is waiting for its automatic retry
    let job = ctx.queue.find(job_id).await.unwrap().unwrap();
    assert_eq!(job.status, JobStatus::Queued);

    let response = server(&ctx)
        .post(&format!("/api/logs/{}/retry", log_id))
        .await;
    assert_eq!(response.status_code(), StatusCode::CONFLICT);

    let jobs = ctx
        .queue
        .list(JobQuery {
            source_id: Some(source.id),
            ..JobQuery::default()
        })
        .await
        .unwrap();
    assert_eq!(jobs.total, 1);
}

#[tokio::test]
async fn test_retry_of_permanently_failed_run_creates_fresh_job() {
    let ctx = setup_with(|settings| settings.queue.max_attempts = 1).await;
    let site = failing_site().await;
    let source = ctx.create_source(&list_url(&site)).await;
    let (job_id, log_id) = run_failing_job(&ctx, source.id).await;
    let server = server(&ctx);
    let before: Value = server.get(&format!("/api/logs/{}", log_id)).await.json();

    let response = server
        .post(&format!("/api/logs/{}/retry", log_id))
        .await;
    assert_eq!(response.status_code(), StatusCode::ACCEPTED);
    let retried: Value = response.json();
    assert_ne!(retried["id"], json!(job_id));
    assert_eq!(retried["status"], "queued");
    assert_eq!(retried["priority"], "high");
    assert_eq!(retried["attempt"], 0);
    assert_eq!(retried["payload"]["trigger"], "retry");
    assert_eq!(retried["payload"]["source_id"], json!(source.id));

    // the old job and its run record are left as they were
    let original = ctx.queue.find(job_id).await.unwrap().unwrap();
    assert_eq!(original.status, JobStatus::Failed);
    let after: Value = server.get(&format!("/api/logs/{}", log_id)).await.json();
    assert_eq!(after, before);

    // the fresh job is still pending, so a second retry is refused
    let response = server
        .post(&format!("/api/logs/{}/retry", log_id))
        .await;
    assert_eq!(response.status_code(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_retry_of_successful_run_is_rejected() {
    let ctx = setup().await;
    let site = fixture_site().await;
    let source = ctx.create_source(&list_url(&site)).await;
    let server = server(&ctx);
    server
        .post("/api/crawler/crawl")
        .json(&json!({ "source_id": source.id, "limit": 3 }))
        .await;

    let logs: Value = server.get("/api/logs").await.json();
    assert_eq!(logs["items"][0]["status"], "success");
    let log_id = logs["items"][0]["id"].as_str().unwrap().to_string();

    let response = server
        .post(&format!("/api/logs/{}/retry", log_id))
        .await;
    assert_eq!(response.status_code(), StatusCode::CONFLICT);
    assert_eq!(ctx.queue.stats().await.unwrap().queued, 0);
}

#[tokio::test]
async fn test_crawl_now_and_list_articles() {
    let ctx = setup().await;
    let site = fixture_site().await;
    let source = ctx.create_source(&list_url(&site)).await;
    let server = server(&ctx);

    let response = server
        .post("/api/crawler/crawl")
        .json(&json!({ "source_id": source.id, "limit": 10 }))
        .await;
    assert_eq!(response.status_code(), StatusCode::OK);
    let summary: Value = response.json();
    assert_eq!(summary["processed"], 10);
    assert_eq!(summary["new_articles"], 10);
    assert_eq!(summary["duplicates"], 0);

    let articles: Value = server
        .get("/api/articles")
        .add_query_param("source_id", source.id)
        .await
        .json();
    assert_eq!(articles["total"], 10);

    let article_id = articles["items"][0]["id"].as_str().unwrap().to_string();
    let response = server
        .patch(&format!("/api/articles/{}/read", article_id))
        .json(&json!({ "read": true }))
        .await;
    assert_eq!(response.status_code(), StatusCode::OK);
    let updated: Value = response.json();
    assert_eq!(updated["read"], true);

    let logs: Value = server.get("/api/logs").await.json();
    assert_eq!(logs["total"], 1);
    assert_eq!(logs["items"][0]["status"], "success");
}

#[tokio::test]
async fn test_selector_test_endpoint() {
    let ctx = setup().await;
    let site = fixture_site().await;
    let server = server(&ctx);

    let response = server
        .post("/api/test-selector")
        .json(&json!({
            "url": list_url(&site),
            "selector": [".missing", ".pb-3 a"],
            "type": "list",
            "driverType": "cheerio"
        }))
        .await;
    assert_eq!(response.status_code(), StatusCode::OK);
    let body: Value = response.json();
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["count"], 12);
    assert_eq!(body["metadata"]["matchedSelector"], ".pb-3 a");
    assert_eq!(body["metadata"]["httpStatus"], 200);
    assert_eq!(body["data"]["samples"][0]["tagName"], "a");

    let response = server
        .post("/api/test-selector")
        .json(&json!({
            "url": list_url(&site),
            "selector": ".nothing-here",
            "driverType": "cheerio"
        }))
        .await;
    let body: Value = response.json();
    assert_eq!(body["success"], false);
    assert_eq!(body["data"]["count"], 0);
    assert!(!body["suggestions"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_duplicate_selector_config_name_conflicts() {
    let ctx = setup().await;
    let server = server(&ctx);
    let body = json!({
        "name": "wordpress-default",
        "driver": "cheerio",
        "selectors": { "list": ["article h2 a"], "title": ["h1.entry-title"] }
    });

    let response = server.post("/api/selector-configs").json(&body).await;
    assert_eq!(response.status_code(), StatusCode::CREATED);

    let response = server.post("/api/selector-configs").json(&body).await;
    assert_eq!(response.status_code(), StatusCode::CONFLICT);
}
