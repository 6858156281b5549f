// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::source::SourceSelectors;
use crate::domain::repositories::RepositoryError;
use crate::domain::services::extraction_service::PipelineError;
use crate::domain::services::selector_resolver::validate_selectors;
use crate::engines::traits::FetchError;
use crate::queue::job_queue::QueueError;
use thiserror::Error;
use validator::ValidationErrors;

pub mod article_use_case;
pub mod crawl_use_case;
pub mod log_use_case;
pub mod queue_use_case;
pub mod schedule_use_case;
pub mod selector_config_use_case;
pub mod selector_test_use_case;
pub mod source_use_case;

/// 用例错误类型
#[derive(Error, Debug)]
pub enum UseCaseError {
    #[error("Validation failed: {0}")]
    Validation(String),
    #[error("{0} not found")]
    NotFound(&'static str),
    #[error("Conflict: {0}")]
    Conflict(String),
    #[error("Repository error: {0}")]
    Repository(RepositoryError),
    #[error("Queue error: {0}")]
    Queue(#[from] QueueError),
    #[error("Crawl failed: {0}")]
    Crawl(#[from] PipelineError),
    #[error("Fetch failed: {0}")]
    Fetch(#[from] FetchError),
}

impl From<RepositoryError> for UseCaseError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::NotFound => UseCaseError::NotFound("Record"),
            RepositoryError::Conflict(message) => UseCaseError::Conflict(message),
            other => UseCaseError::Repository(other),
        }
    }
}

impl From<ValidationErrors> for UseCaseError {
    fn from(err: ValidationErrors) -> Self {
        UseCaseError::Validation(err.to_string())
    }
}

/// 校验来源选择器：语法必须可解析，且列表选择器不能为空
pub(crate) fn check_source_selectors(selectors: &SourceSelectors) -> Result<(), UseCaseError> {
    if selectors.list.is_empty() {
        return Err(UseCaseError::Validation(
            "selectors.list must contain at least one selector".to_string(),
        ));
    }
    check_selector_syntax(selectors)
}

/// 校验各字段选择器语法
pub(crate) fn check_selector_syntax(selectors: &SourceSelectors) -> Result<(), UseCaseError> {
    for (field, list) in selectors.iter() {
        validate_selectors(list)
            .map_err(|e| UseCaseError::Validation(format!("selectors.{}: {}", field, e)))?;
    }
    Ok(())
}
