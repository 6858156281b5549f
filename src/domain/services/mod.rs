// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 领域服务模块
///
/// 包含抓取核心的业务逻辑：
/// - 选择器解析（selector_resolver）：按回退链在文档中解析字段
/// - 抓取流水线（extraction_service）：驱动 + 选择器 + 去重，产出文章
/// - 日志记录（log_recorder）：执行记录与操作审计
pub mod extraction_service;
pub mod log_recorder;
pub mod selector_resolver;
