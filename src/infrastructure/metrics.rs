// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use metrics::{describe_counter, describe_gauge, describe_histogram};
use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::SocketAddr;
use tracing::{info, warn};

use crate::config::settings::MetricsSettings;

/// 初始化指标系统
///
/// 仅在配置启用时安装Prometheus导出器；未安装时各处的指标宏是空操作
pub fn init_metrics(settings: &MetricsSettings) {
    if !settings.enabled {
        info!("Metrics exporter disabled");
        return;
    }

    let addr: SocketAddr = match settings.listen.parse() {
        Ok(addr) => addr,
        Err(e) => {
            warn!("Invalid metrics listen address '{}': {}", settings.listen, e);
            return;
        }
    };

    // Ignore error if address is already in use (for development/testing)
    if let Err(e) = PrometheusBuilder::new().with_http_listener(addr).install() {
        warn!(
            "Failed to install Prometheus recorder: {}. This might happen if the port is already in use.",
            e
        );
        return;
    }

    describe_metrics();
    info!("Metrics exporter listening on {}", addr);
}

fn describe_metrics() {
    describe_counter!("crawl_jobs_enqueued_total", "Total number of crawl jobs enqueued");
    describe_counter!("crawl_jobs_completed_total", "Total number of crawl jobs completed");
    describe_counter!(
        "crawl_jobs_failed_total",
        "Total number of crawl jobs that failed permanently"
    );
    describe_counter!(
        "crawl_jobs_retried_total",
        "Total number of failed executions scheduled for retry"
    );
    describe_counter!("crawl_articles_new_total", "Total number of new articles stored");
    describe_counter!(
        "crawl_articles_duplicate_total",
        "Total number of candidates rejected as duplicates"
    );
    describe_histogram!("crawl_job_duration_seconds", "Duration of crawl jobs in seconds");
    describe_histogram!(
        "driver_fetch_duration_seconds",
        "Duration of a single driver fetch in seconds"
    );
    describe_gauge!("crawl_workers_active", "Number of worker loops currently running");
}
