// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

use crate::domain::models::crawl_error::CrawlErrorKind;

/// 抓取流水线的聚合结果
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CrawlOutcome {
    /// 列表页上发现的候选数量（去重后、截断前）
    pub found: u32,
    /// 实际处理的候选数量
    pub processed: u32,
    /// 新写入的文章数
    pub new_articles: u32,
    /// 重复文章数
    pub duplicates: u32,
    /// 候选级错误数
    pub errors: u32,
    /// 候选级失败明细
    pub failures: Vec<CandidateFailure>,
}

impl CrawlOutcome {
    /// 记录一次候选失败
    pub fn record_failure(&mut self, failure: CandidateFailure) {
        self.errors += 1;
        self.failures.push(failure);
    }

    pub fn summary(&self) -> CrawlSummary {
        CrawlSummary {
            processed: self.processed,
            new_articles: self.new_articles,
            duplicates: self.duplicates,
            errors: self.errors,
        }
    }
}

/// 作业范围内的进行中计数
///
/// 流水线边抓取边写入；调用方在超时取消流水线后仍可读取已完成部分的计数
#[derive(Debug, Default)]
pub struct CrawlProgress {
    outcome: Mutex<CrawlOutcome>,
}

impl CrawlProgress {
    pub fn new() -> Self {
        Self::default()
    }

    /// 修改计数，锁不会跨越await持有
    pub fn update(&self, f: impl FnOnce(&mut CrawlOutcome)) {
        f(&mut self.outcome.lock());
    }

    pub fn record_failure(&self, failure: CandidateFailure) {
        self.outcome.lock().record_failure(failure);
    }

    /// 当前计数的副本
    pub fn snapshot(&self) -> CrawlOutcome {
        self.outcome.lock().clone()
    }
}

/// 对外暴露的计数摘要
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CrawlSummary {
    pub processed: u32,
    pub new_articles: u32,
    pub duplicates: u32,
    pub errors: u32,
}

/// 单个候选的失败记录
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandidateFailure {
    pub link: String,
    pub depth: u32,
    pub kind: CrawlErrorKind,
    pub message: String,
}
