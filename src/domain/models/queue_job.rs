// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;
use uuid::Uuid;

use crate::domain::models::crawl_error::CrawlErrorKind;
use crate::domain::models::crawl_outcome::CrawlSummary;
use crate::domain::models::schedule::CrawlParams;
use crate::utils::retry_policy::RetryPolicy;

/// 队列作业实体
///
/// 由调度器或手动触发创建，只由工作器修改；终态（completed/failed）不可再迁移。
/// 作业记录不会被核心删除，保留用于审计。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueueJob {
    pub id: Uuid,
    pub job_type: JobType,
    pub priority: JobPriority,
    pub status: JobStatus,
    pub payload: JobPayload,
    /// 已失败的次数
    pub attempt: u32,
    /// 最大尝试次数
    pub max_attempts: u32,
    /// 最早可被领取的时间（重试退避）
    pub available_at: DateTime<FixedOffset>,
    /// 领取者令牌
    pub lock_token: Option<Uuid>,
    /// 锁过期时间，过期的运行中作业会被回收
    pub lock_expires_at: Option<DateTime<FixedOffset>>,
    pub last_error: Option<String>,
    pub error_kind: Option<CrawlErrorKind>,
    pub result: Option<CrawlSummary>,
    pub created_at: DateTime<FixedOffset>,
    pub started_at: Option<DateTime<FixedOffset>>,
    pub completed_at: Option<DateTime<FixedOffset>>,
    pub failed_at: Option<DateTime<FixedOffset>>,
    pub updated_at: DateTime<FixedOffset>,
}

impl QueueJob {
    /// 创建新的抓取作业
    ///
    /// # 参数
    ///
    /// * `payload` - 作业负载
    /// * `priority` - 优先级
    /// * `max_attempts` - 最大尝试次数
    /// * `now` - 创建时间
    pub fn new_crawl(
        payload: JobPayload,
        priority: JobPriority,
        max_attempts: u32,
        now: DateTime<FixedOffset>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            job_type: JobType::Crawl,
            priority,
            status: JobStatus::Queued,
            payload,
            attempt: 0,
            max_attempts: max_attempts.max(1),
            available_at: now,
            lock_token: None,
            lock_expires_at: None,
            last_error: None,
            error_kind: None,
            result: None,
            created_at: now,
            started_at: None,
            completed_at: None,
            failed_at: None,
            updated_at: now,
        }
    }

    /// 当前状态的标签化视图
    pub fn state(&self) -> JobState {
        match self.status {
            JobStatus::Queued => JobState::Queued {
                attempt: self.attempt,
            },
            JobStatus::Running => JobState::Running {
                attempt: self.attempt,
            },
            JobStatus::Completed => JobState::Completed(self.result.clone().unwrap_or_default()),
            JobStatus::Failed => JobState::Failed {
                error: self.last_error.clone().unwrap_or_default(),
                attempt: self.attempt,
            },
        }
    }

    pub fn source_id(&self) -> Uuid {
        self.payload.source_id
    }
}

/// 作业负载
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobPayload {
    pub source_id: Uuid,
    pub schedule_id: Option<Uuid>,
    pub params: CrawlParams,
    pub trigger: JobTrigger,
}

/// 作业触发方式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobTrigger {
    /// 调度器按cron触发
    Schedule,
    /// 手动"立即运行"
    Manual,
    /// 从失败记录手动重试
    Retry,
}

/// 作业类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum JobType {
    #[default]
    Crawl,
}

impl fmt::Display for JobType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            JobType::Crawl => write!(f, "crawl"),
        }
    }
}

impl FromStr for JobType {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "crawl" => Ok(JobType::Crawl),
            _ => Err(()),
        }
    }
}

/// 作业优先级，数值越大越先执行
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum JobPriority {
    Low,
    #[default]
    Normal,
    High,
}

impl JobPriority {
    /// 存储用的整数值
    pub fn as_i32(&self) -> i32 {
        match self {
            JobPriority::Low => 0,
            JobPriority::Normal => 1,
            JobPriority::High => 2,
        }
    }

    pub fn from_i32(value: i32) -> Self {
        match value {
            i32::MIN..=0 => JobPriority::Low,
            1 => JobPriority::Normal,
            _ => JobPriority::High,
        }
    }
}

/// 作业状态
///
/// queued → running → completed | failed；失败且仍有重试余量时 running → queued
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    #[default]
    Queued,
    Running,
    Completed,
    Failed,
}

impl JobStatus {
    /// 是否为终态
    pub fn is_terminal(&self) -> bool {
        matches!(self, JobStatus::Completed | JobStatus::Failed)
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            JobStatus::Queued => write!(f, "queued"),
            JobStatus::Running => write!(f, "running"),
            JobStatus::Completed => write!(f, "completed"),
            JobStatus::Failed => write!(f, "failed"),
        }
    }
}

impl FromStr for JobStatus {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "queued" => Ok(JobStatus::Queued),
            "running" => Ok(JobStatus::Running),
            "completed" => Ok(JobStatus::Completed),
            "failed" => Ok(JobStatus::Failed),
            _ => Err(()),
        }
    }
}

/// 作业状态的标签化表示
#[derive(Debug, Clone, PartialEq)]
pub enum JobState {
    Queued { attempt: u32 },
    Running { attempt: u32 },
    Completed(CrawlSummary),
    Failed { error: String, attempt: u32 },
}

/// 一次失败的执行
#[derive(Debug, Clone, PartialEq)]
pub struct JobFailure {
    pub kind: CrawlErrorKind,
    pub message: String,
}

impl JobFailure {
    pub fn new(kind: CrawlErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

/// 失败后的状态迁移结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureTransition {
    /// 以新的尝试次数重新入队，并在 `delay` 之后可被领取
    Retry { attempt: u32, delay: Duration },
    /// 永久失败
    GiveUp { attempt: u32 },
}

impl FailureTransition {
    pub fn attempt(&self) -> u32 {
        match self {
            FailureTransition::Retry { attempt, .. } | FailureTransition::GiveUp { attempt } => {
                *attempt
            }
        }
    }
}

/// 计算作业失败后的下一个状态
///
/// 纯函数：`attempt` 为本次失败前已失败的次数。
/// 非瞬时错误（如配置校验失败）直接判定为永久失败。
pub fn on_failure(
    attempt: u32,
    max_attempts: u32,
    kind: CrawlErrorKind,
    policy: &RetryPolicy,
) -> FailureTransition {
    let attempt = attempt.saturating_add(1);
    if kind.is_transient() && attempt < max_attempts {
        FailureTransition::Retry {
            attempt,
            delay: policy.calculate_backoff(attempt),
        }
    } else {
        FailureTransition::GiveUp { attempt }
    }
}
