// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 队列模块
///
/// 提供持久化作业队列、cron计算与调度器
pub mod cron;
pub mod job_queue;
pub mod scheduler;
