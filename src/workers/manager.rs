// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::repositories::source_repository::SourceRepository;
use crate::domain::services::extraction_service::ExtractionPipeline;
use crate::domain::services::log_recorder::LogRecorder;
use crate::queue::job_queue::JobQueue;
use crate::workers::crawl_worker::CrawlWorker;
use crate::workers::source_limiter::SourceLimiter;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::info;

/// 工作管理器
pub struct WorkerManager {
    queue: Arc<dyn JobQueue>,
    sources: Arc<dyn SourceRepository>,
    pipeline: Arc<ExtractionPipeline>,
    recorder: Arc<LogRecorder>,
    limiter: Arc<SourceLimiter>,
    poll_interval: Duration,
    handles: Vec<JoinHandle<()>>,
}

impl WorkerManager {
    /// 创建工作管理器
    ///
    /// # 参数
    ///
    /// * `per_source_limit` - 同一来源允许同时运行的作业数
    pub fn new(
        queue: Arc<dyn JobQueue>,
        sources: Arc<dyn SourceRepository>,
        pipeline: Arc<ExtractionPipeline>,
        recorder: Arc<LogRecorder>,
        per_source_limit: usize,
        poll_interval: Duration,
    ) -> Self {
        Self {
            queue,
            sources,
            pipeline,
            recorder,
            limiter: Arc::new(SourceLimiter::new(per_source_limit)),
            poll_interval,
            handles: Vec::new(),
        }
    }

    /// 启动工作进程
    ///
    /// 创建并启动指定数量的工作进程
    ///
    /// # 参数
    ///
    /// * `count` - 要启动的工作进程数量
    pub fn start_workers(&mut self, count: usize) {
        for _ in 0..count {
            let worker = CrawlWorker::new(
                self.queue.clone(),
                self.sources.clone(),
                self.pipeline.clone(),
                self.recorder.clone(),
                self.limiter.clone(),
                self.poll_interval,
            );

            let handle = tokio::spawn(async move {
                worker.run().await;
            });
            self.handles.push(handle);
        }
        metrics::gauge!("crawl_workers_active").set(self.handles.len() as f64);
        info!("Started {} crawl workers", count);
    }

    /// 运行中的工作进程数
    pub fn active(&self) -> usize {
        self.handles.iter().filter(|h| !h.is_finished()).count()
    }

    /// 关闭所有工作进程
    ///
    /// 被中断的作业保持running状态，锁过期后由调度器回收
    pub async fn shutdown(&mut self) {
        info!("Shutting down workers...");
        for handle in self.handles.drain(..) {
            handle.abort();
            let _ = handle.await;
        }
        metrics::gauge!("crawl_workers_active").set(0.0);
        info!("Workers shut down successfully");
    }
}
