// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use axum::{
    extract::{Extension, Path, Query},
    response::IntoResponse,
    Json,
};
use uuid::Uuid;

use crate::application::dto::query_request::JobQueryDto;
use crate::presentation::errors::AppError;
use crate::presentation::state::AppState;

pub async fn list_jobs(
    Extension(state): Extension<AppState>,
    Query(query): Query<JobQueryDto>,
) -> Result<impl IntoResponse, AppError> {
    Ok(Json(state.queue.list(query).await?))
}

pub async fn get_job(
    Extension(state): Extension<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    Ok(Json(state.queue.get(id).await?))
}

/// 各状态的作业数量
pub async fn queue_stats(
    Extension(state): Extension<AppState>,
) -> Result<impl IntoResponse, AppError> {
    Ok(Json(state.queue.stats().await?))
}
