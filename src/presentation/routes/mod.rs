// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::presentation::handlers::{
    article_handler, crawl_handler, log_handler, queue_handler, schedule_handler, source_handler,
};
use crate::presentation::state::AppState;
use axum::{
    extract::Extension,
    routing::{get, patch, post},
    Router,
};
use tower_http::trace::TraceLayer;

/// 创建应用路由
///
/// # 参数
///
/// * `state` - 处理器共享的用例集合
///
/// # 返回值
///
/// 返回配置好的路由
pub fn routes(state: AppState) -> Router {
    let public_routes = Router::new()
        .route("/health", get(health_check))
        .route("/api/version", get(version));

    let api_routes = Router::new()
        .route("/api/crawler/crawl", post(crawl_handler::crawl_now))
        .route("/api/test-selector", post(crawl_handler::test_selector))
        .route(
            "/api/schedules",
            get(schedule_handler::list_schedules).post(schedule_handler::create_schedule),
        )
        .route(
            "/api/schedules/{id}",
            get(schedule_handler::get_schedule)
                .put(schedule_handler::update_schedule)
                .delete(schedule_handler::delete_schedule),
        )
        .route("/api/schedules/{id}/run", post(schedule_handler::run_schedule))
        .route("/api/logs", get(log_handler::list_logs))
        .route(
            "/api/logs/{id}",
            get(log_handler::get_log).delete(log_handler::delete_log),
        )
        .route("/api/logs/{id}/retry", post(log_handler::retry_log))
        .route("/api/operation-logs", get(log_handler::list_operation_logs))
        .route("/api/queue/jobs", get(queue_handler::list_jobs))
        .route("/api/queue/jobs/{id}", get(queue_handler::get_job))
        .route("/api/queue/stats", get(queue_handler::queue_stats))
        .route("/api/articles", get(article_handler::list_articles))
        .route("/api/articles/{id}/read", patch(article_handler::mark_read))
        .route(
            "/api/sources",
            get(source_handler::list_sources).post(source_handler::create_source),
        )
        .route(
            "/api/sources/{id}",
            get(source_handler::get_source)
                .put(source_handler::update_source)
                .delete(source_handler::delete_source),
        )
        .route(
            "/api/selector-configs",
            get(source_handler::list_selector_configs)
                .post(source_handler::create_selector_config),
        )
        .route(
            "/api/selector-configs/{id}",
            get(source_handler::get_selector_config)
                .put(source_handler::update_selector_config)
                .delete(source_handler::delete_selector_config),
        );

    Router::new()
        .merge(public_routes)
        .merge(api_routes)
        .layer(Extension(state))
        .layer(TraceLayer::new_for_http())
}

/// 健康检查端点
///
/// # 返回值
///
/// 返回"OK"字符串
pub async fn health_check() -> &'static str {
    "OK"
}

/// 版本信息端点
///
/// # 返回值
///
/// 返回应用版本号
pub async fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::http::{Request, StatusCode};
    use tower::ServiceExt;

    #[tokio::test]
    async fn test_public_endpoints() {
        let app = Router::new()
            .route("/health", get(health_check))
            .route("/api/version", get(version));

        let response = app
            .clone()
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert_eq!(&body[..], b"OK");

        let response = app
            .oneshot(Request::get("/api/version").body(Body::empty()).unwrap())
            .await
            .unwrap();
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert_eq!(&body[..], env!("CARGO_PKG_VERSION").as_bytes());
    }
}
