// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 工作器模块
///
/// 提供抓取作业的执行、按来源并发控制和工作器生命周期管理
pub mod crawl_worker;
pub mod manager;
pub mod source_limiter;

pub use crawl_worker::CrawlWorker;
pub use manager::WorkerManager;
