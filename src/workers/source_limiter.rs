// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use dashmap::DashMap;
use std::sync::Arc;
use tokio::sync::{OwnedSemaphorePermit, Semaphore};
use uuid::Uuid;

/// 按来源限制并发抓取数
///
/// 每个来源一个信号量，许可在作业结束时随 `OwnedSemaphorePermit` 一起释放
#[derive(Debug)]
pub struct SourceLimiter {
    per_source: usize,
    semaphores: DashMap<Uuid, Arc<Semaphore>>,
}

impl SourceLimiter {
    pub fn new(per_source: usize) -> Self {
        Self {
            per_source: per_source.max(1),
            semaphores: DashMap::new(),
        }
    }

    /// 尝试为来源获取一个许可，来源已满时返回 `None`
    pub fn try_acquire(&self, source_id: Uuid) -> Option<OwnedSemaphorePermit> {
        let semaphore = self
            .semaphores
            .entry(source_id)
            .or_insert_with(|| Arc::new(Semaphore::new(self.per_source)))
            .clone();
        semaphore.try_acquire_owned().ok()
    }

    /// 来源当前可用的许可数
    pub fn available(&self, source_id: Uuid) -> usize {
        self.semaphores
            .get(&source_id)
            .map(|s| s.available_permits())
            .unwrap_or(self.per_source)
    }
}
