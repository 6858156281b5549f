// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use axum::{extract::Extension, response::IntoResponse, Json};

use crate::application::dto::crawl_request::CrawlRequestDto;
use crate::application::dto::selector_test::SelectorTestRequestDto;
use crate::presentation::errors::AppError;
use crate::presentation::state::AppState;

/// 同步抓取指定来源
pub async fn crawl_now(
    Extension(state): Extension<AppState>,
    Json(payload): Json<CrawlRequestDto>,
) -> Result<impl IntoResponse, AppError> {
    let summary = state.crawl.crawl_now(payload).await?;
    Ok(Json(summary))
}

/// 对任意URL试运行选择器
pub async fn test_selector(
    Extension(state): Extension<AppState>,
    Json(payload): Json<SelectorTestRequestDto>,
) -> Result<impl IntoResponse, AppError> {
    let result = state.selector_test.test_selector(payload).await?;
    Ok(Json(result))
}
