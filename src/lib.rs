// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 应用程序模块
///
/// 包含应用程序的核心业务逻辑和用例
pub mod application;

/// 配置模块
///
/// 处理应用程序的配置设置和环境变量
pub mod config;

/// 领域模块
///
/// 包含核心业务实体、服务和仓库接口
pub mod domain;

/// 引擎模块
///
/// 页面驱动：无头浏览器与静态HTTP抓取
pub mod engines;

/// 基础设施模块
///
/// 数据库连接、实体映射、仓库实现与指标导出
pub mod infrastructure;

/// 表示层模块
///
/// REST接口：路由、处理器与错误映射
pub mod presentation;

/// 队列模块
///
/// 持久化优先级作业队列与cron调度器
pub mod queue;

/// 工具模块
///
/// 提供通用的工具函数和辅助功能
pub mod utils;

/// 工作器模块
///
/// 从队列领取抓取作业并执行的工作器池
pub mod workers;
