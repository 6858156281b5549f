// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 测试主模块
///
/// 集成测试运行在迁移后的内存SQLite数据库上，HTTP页面由wiremock提供
mod integration;
