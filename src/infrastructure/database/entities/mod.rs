// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 数据库实体模块
///
/// 定义数据库表对应的实体结构
/// 使用SeaORM框架进行对象关系映射
pub mod article;
pub mod crawl_history;
pub mod news_source;
pub mod operation_log;
pub mod queue_job;
pub mod schedule;
pub mod selector_config;
