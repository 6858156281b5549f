// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::repositories::Pagination;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// 分页查询参数
#[derive(Debug, Clone, Copy, Default, Deserialize, Serialize)]
pub struct PageQueryDto {
    pub page: Option<u64>,
    pub per_page: Option<u64>,
}

impl PageQueryDto {
    pub fn pagination(&self) -> Pagination {
        Pagination::new(self.page, self.per_page)
    }
}

/// 执行记录查询参数
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct LogQueryDto {
    pub source_id: Option<Uuid>,
    pub job_id: Option<Uuid>,
    /// success / failed
    pub status: Option<String>,
    pub page: Option<u64>,
    pub per_page: Option<u64>,
}

/// 作业查询参数
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct JobQueryDto {
    /// queued / running / completed / failed
    pub status: Option<String>,
    pub source_id: Option<Uuid>,
    pub page: Option<u64>,
    pub per_page: Option<u64>,
}

/// 文章查询参数
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ArticleQueryDto {
    pub source_id: Option<Uuid>,
    pub read: Option<bool>,
    pub page: Option<u64>,
    pub per_page: Option<u64>,
}

/// 调度计划查询参数
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ScheduleQueryDto {
    pub source_id: Option<Uuid>,
}

/// 来源查询参数
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct SourceQueryDto {
    pub active: Option<bool>,
}

/// 已读标记请求体
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ReadFlagDto {
    pub read: bool,
}
