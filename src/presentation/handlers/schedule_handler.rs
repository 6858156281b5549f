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

use crate::application::dto::query_request::ScheduleQueryDto;
use crate::application::dto::schedule_request::{CreateScheduleDto, UpdateScheduleDto};
use crate::presentation::errors::AppError;
use crate::presentation::state::AppState;

/// 列出调度计划
pub async fn list_schedules(
    Extension(state): Extension<AppState>,
    Query(query): Query<ScheduleQueryDto>,
) -> Result<impl IntoResponse, AppError> {
    Ok(Json(state.schedules.list(query.source_id).await?))
}

/// 创建调度计划
pub async fn create_schedule(
    Extension(state): Extension<AppState>,
    Json(payload): Json<CreateScheduleDto>,
) -> Result<impl IntoResponse, AppError> {
    let schedule = state.schedules.create(payload).await?;
    Ok((StatusCode::CREATED, Json(schedule)))
}

pub async fn get_schedule(
    Extension(state): Extension<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    Ok(Json(state.schedules.get(id).await?))
}

/// 更新调度计划
pub async fn update_schedule(
    Extension(state): Extension<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateScheduleDto>,
) -> Result<impl IntoResponse, AppError> {
    Ok(Json(state.schedules.update(id, payload).await?))
}

pub async fn delete_schedule(
    Extension(state): Extension<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    state.schedules.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// 立即运行调度计划
pub async fn run_schedule(
    Extension(state): Extension<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let job = state.schedules.run_now(id).await?;
    Ok((StatusCode::ACCEPTED, Json(job)))
}
