// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 领域模型模块
///
/// 该模块定义了系统的核心业务实体，包括：
/// - 来源（source）：被抓取的新闻站点及其选择器与驱动
/// - 文章（article）：去重后写入的抓取结果
/// - 调度计划（schedule）：cron表达式与抓取参数
/// - 队列作业（queue_job）：持久化的抓取作业及其状态迁移
/// - 执行记录（crawl_history）：每次执行的统计与操作审计
/// - 选择器配置（selector_config）：供选择器测试使用的命名选择器集合
pub mod article;
pub mod crawl_error;
pub mod crawl_history;
pub mod crawl_outcome;
pub mod queue_job;
pub mod schedule;
pub mod selector_config;
pub mod source;
