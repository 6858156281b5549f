// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use tracing::error;

use crate::application::use_cases::UseCaseError;
use crate::domain::services::extraction_service::PipelineError;
use crate::engines::traits::{FetchError, FetchErrorKind};

/// 应用错误类型
///
/// 封装所有可能的应用层错误，提供统一的错误处理接口
#[derive(Debug)]
pub struct AppError(anyhow::Error);

fn fetch_status(err: &FetchError) -> StatusCode {
    match err.kind() {
        FetchErrorKind::Timeout => StatusCode::GATEWAY_TIMEOUT,
        _ => StatusCode::BAD_GATEWAY,
    }
}

impl AppError {
    /// 根据底层错误类型选择状态码
    pub fn status(&self) -> StatusCode {
        match self.0.downcast_ref::<UseCaseError>() {
            Some(UseCaseError::Validation(_)) => StatusCode::BAD_REQUEST,
            Some(UseCaseError::NotFound(_)) => StatusCode::NOT_FOUND,
            Some(UseCaseError::Conflict(_)) => StatusCode::CONFLICT,
            Some(UseCaseError::Fetch(e)) => fetch_status(e),
            Some(UseCaseError::Crawl(e)) => match e {
                PipelineError::ListPage(fetch) => fetch_status(fetch),
                PipelineError::Timeout(_) => StatusCode::GATEWAY_TIMEOUT,
                PipelineError::InvalidSource(_) => StatusCode::BAD_REQUEST,
                PipelineError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
            Some(UseCaseError::Repository(_)) | Some(UseCaseError::Queue(_)) | None => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let error_message = self.0.to_string();
        if status.is_server_error() {
            error!(status = status.as_u16(), "Request failed: {}", error_message);
        }

        let body = Json(json!({ "error": error_message }));
        (status, body).into_response()
    }
}

impl<E> From<E> for AppError
where
    E: Into<anyhow::Error>,
{
    fn from(err: E) -> Self {
        Self(err.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        let cases = [
            (
                UseCaseError::Validation("bad cron".into()),
                StatusCode::BAD_REQUEST,
            ),
            (UseCaseError::NotFound("Source"), StatusCode::NOT_FOUND),
            (UseCaseError::Conflict("name".into()), StatusCode::CONFLICT),
            (
                UseCaseError::Crawl(PipelineError::Timeout(100)),
                StatusCode::GATEWAY_TIMEOUT,
            ),
            (
                UseCaseError::Fetch(FetchError::Http {
                    status: 404,
                    url: "https://news.test".into(),
                }),
                StatusCode::BAD_GATEWAY,
            ),
        ];
        for (err, expected) in cases {
            assert_eq!(AppError::from(err).status(), expected);
        }
    }
}
