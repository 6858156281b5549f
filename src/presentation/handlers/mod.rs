// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// HTTP处理器模块
pub mod article_handler;
pub mod crawl_handler;
pub mod log_handler;
pub mod queue_handler;
pub mod schedule_handler;
pub mod source_handler;
