// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use std::time::Duration;

/// 作业失败重试策略
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// 最大尝试次数（包含首次执行）
    pub max_attempts: u32,
    /// 第一次失败后的退避时间
    pub initial_backoff: Duration,
    /// 退避时间上限
    pub max_backoff: Duration,
    /// 退避乘数
    pub backoff_multiplier: f64,
    /// 抖动因子 (0.0-1.0)，为0时退避完全确定
    pub jitter_factor: f64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_backoff: Duration::from_secs(30),
            max_backoff: Duration::from_secs(600),
            backoff_multiplier: 2.0,
            jitter_factor: 0.0,
        }
    }
}

impl RetryPolicy {
    /// 计算第 `attempt` 次失败后的退避时间
    ///
    /// `attempt` 从1开始；退避为 `initial * multiplier^(attempt-1)`，并以 `max_backoff` 为上限
    pub fn calculate_backoff(&self, attempt: u32) -> Duration {
        let exponent = attempt.saturating_sub(1).min(63) as i32;
        let backoff_secs =
            self.initial_backoff.as_secs_f64() * self.backoff_multiplier.powi(exponent);
        let capped = backoff_secs.min(self.max_backoff.as_secs_f64());

        if self.jitter_factor <= 0.0 {
            return Duration::from_secs_f64(capped);
        }

        let range = capped * self.jitter_factor.min(1.0);
        let jitter = rand::random_range(-range..=range);
        Duration::from_secs_f64((capped + jitter).clamp(0.0, self.max_backoff.as_secs_f64()))
    }
}
