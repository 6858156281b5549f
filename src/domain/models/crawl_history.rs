// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use crate::domain::models::crawl_error::CrawlErrorKind;
use crate::domain::models::crawl_outcome::CandidateFailure;
use crate::domain::models::schedule::CrawlParams;

/// 抓取执行记录
///
/// 每次执行（无论成功失败）追加且仅追加一条
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CrawlHistory {
    pub id: Uuid,
    /// 所属作业，同步抓取接口产生的记录为空
    pub job_id: Option<Uuid>,
    pub source_id: Uuid,
    pub schedule_id: Option<Uuid>,
    pub status: RunStatus,
    pub params: CrawlParams,
    /// 本次执行时作业已失败的次数
    pub attempt: u32,
    pub found: u32,
    pub processed: u32,
    pub new_articles: u32,
    pub duplicates: u32,
    pub errors: u32,
    pub duration_ms: u64,
    pub message: String,
    pub error_kind: Option<CrawlErrorKind>,
    pub failures: Vec<CandidateFailure>,
    pub started_at: DateTime<FixedOffset>,
    pub finished_at: DateTime<FixedOffset>,
}

/// 执行状态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    #[default]
    Success,
    Failed,
}

impl fmt::Display for RunStatus {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            RunStatus::Success => write!(f, "success"),
            RunStatus::Failed => write!(f, "failed"),
        }
    }
}

impl FromStr for RunStatus {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "success" => Ok(RunStatus::Success),
            "failed" => Ok(RunStatus::Failed),
            _ => Err(()),
        }
    }
}

/// 操作审计日志
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OperationLog {
    pub id: Uuid,
    /// 操作名，如 `schedule.create`、`job.retry`
    pub operation: String,
    pub entity_type: String,
    pub entity_id: Option<Uuid>,
    pub status: RunStatus,
    pub message: String,
    pub details: Option<serde_json::Value>,
    pub created_at: DateTime<FixedOffset>,
}
