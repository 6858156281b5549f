// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use chrono::{DateTime, Utc};
use cron::Schedule as CronSchedule;
use std::str::FromStr;
use thiserror::Error;

/// cron表达式错误
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CronError {
    #[error("Invalid cron expression '{expr}': {reason}")]
    Invalid { expr: String, reason: String },
    #[error("Cron expression '{0}' never fires again")]
    Exhausted(String),
}

/// 将标准5段表达式转换为带秒的6段表达式
///
/// 标准cron的星期字段以0（或7）表示周日，而解析库使用1表示周日，需要整体偏移
fn normalize(expr: &str) -> Result<String, CronError> {
    let fields: Vec<&str> = expr.split_whitespace().collect();
    match fields.len() {
        5 => {
            let day_of_week = shift_day_of_week(fields[4]).map_err(|reason| CronError::Invalid {
                expr: expr.to_string(),
                reason,
            })?;
            Ok(format!("0 {} {} {} {} {}", fields[0], fields[1], fields[2], fields[3], day_of_week))
        }
        6 | 7 => Ok(fields.join(" ")),
        n => Err(CronError::Invalid {
            expr: expr.to_string(),
            reason: format!("expected 5, 6 or 7 fields, got {}", n),
        }),
    }
}

fn shift_day_of_week(field: &str) -> Result<String, String> {
    let shift = |value: &str| -> Result<String, String> {
        if value == "*" || value == "?" || value.chars().any(|c| c.is_ascii_alphabetic()) {
            return Ok(value.to_string());
        }
        let day: u8 = value
            .parse()
            .map_err(|_| format!("invalid day of week '{}'", value))?;
        match day {
            0 | 7 => Ok("1".to_string()),
            1..=6 => Ok((day + 1).to_string()),
            _ => Err(format!("day of week out of range: {}", day)),
        }
    };

    field
        .split(',')
        .map(|part| {
            let (range, step) = match part.split_once('/') {
                Some((range, step)) => (range, Some(step)),
                None => (part, None),
            };
            let range = range
                .split('-')
                .map(shift)
                .collect::<Result<Vec<_>, _>>()?
                .join("-");
            Ok(match step {
                Some(step) => format!("{}/{}", range, step),
                None => range,
            })
        })
        .collect::<Result<Vec<_>, String>>()
        .map(|parts| parts.join(","))
}

/// 解析并校验cron表达式
pub fn parse_cron(expr: &str) -> Result<CronSchedule, CronError> {
    let normalized = normalize(expr.trim())?;
    CronSchedule::from_str(&normalized).map_err(|e| CronError::Invalid {
        expr: expr.to_string(),
        reason: e.to_string(),
    })
}

/// 计算下一次运行时间
///
/// 纯函数：结果严格晚于 `from`
///
/// # 参数
///
/// * `expr` - 5段标准表达式，或带秒的6/7段表达式
/// * `from` - 计算起点（上一次运行时间或创建时间）
pub fn compute_next_run(expr: &str, from: DateTime<Utc>) -> Result<DateTime<Utc>, CronError> {
    parse_cron(expr)?
        .after(&from)
        .next()
        .ok_or_else(|| CronError::Exhausted(expr.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(h: u32, m: u32, s: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 2, h, m, s).unwrap()
    }

    #[test]
    fn test_every_five_minutes_from_last_run() {
        assert_eq!(compute_next_run("*/5 * * * *", at(10, 0, 0)).unwrap(), at(10, 5, 0));
    }

    #[test]
    fn test_rounds_to_next_matching_minute() {
        assert_eq!(compute_next_run("*/5 * * * *", at(10, 2, 30)).unwrap(), at(10, 5, 0));
    }

    #[test]
    fn test_six_field_expression_with_seconds() {
        assert_eq!(
            compute_next_run("30 * * * * *", at(10, 0, 0)).unwrap(),
            at(10, 0, 30)
        );
    }

    #[test]
    fn test_standard_day_of_week_numbering() {
        // 2025-03-02 is a Sunday
        let next = compute_next_run("0 9 * * 1", at(10, 0, 0)).unwrap();
        assert_eq!(next, Utc.with_ymd_and_hms(2025, 3, 3, 9, 0, 0).unwrap());

        let next = compute_next_run("0 9 * * 0", at(8, 0, 0)).unwrap();
        assert_eq!(next, at(9, 0, 0));

        let next = compute_next_run("0 9 * * 1-5", at(10, 0, 0)).unwrap();
        assert_eq!(next, Utc.with_ymd_and_hms(2025, 3, 3, 9, 0, 0).unwrap());
    }

    #[test]
    fn test_invalid_expressions() {
        assert!(matches!(
            compute_next_run("every minute", at(0, 0, 0)),
            Err(CronError::Invalid { .. })
        ));
        assert!(compute_next_run("61 * * * *", at(0, 0, 0)).is_err());
        assert!(compute_next_run("* * * * 9", at(0, 0, 0)).is_err());
    }
}
