// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use axum::{
    extract::{Extension, Path, Query},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use uuid::Uuid;

use crate::application::dto::query_request::{LogQueryDto, PageQueryDto};
use crate::presentation::errors::AppError;
use crate::presentation::state::AppState;

/// 分页查询执行记录
pub async fn list_logs(
    Extension(state): Extension<AppState>,
    Query(query): Query<LogQueryDto>,
) -> Result<impl IntoResponse, AppError> {
    Ok(Json(state.logs.list(query).await?))
}

pub async fn get_log(
    Extension(state): Extension<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    Ok(Json(state.logs.get(id).await?))
}

/// 重试失败的执行，返回新作业
pub async fn retry_log(
    Extension(state): Extension<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let job = state.logs.retry(id).await?;
    Ok((StatusCode::ACCEPTED, Json(job)))
}

pub async fn delete_log(
    Extension(state): Extension<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    state.logs.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// 分页查询操作日志
pub async fn list_operation_logs(
    Extension(state): Extension<AppState>,
    Query(query): Query<PageQueryDto>,
) -> Result<impl IntoResponse, AppError> {
    Ok(Json(state.logs.list_operations(query).await?))
}
