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

use crate::application::dto::query_request::SourceQueryDto;
use crate::application::dto::source_request::{
    CreateSelectorConfigDto, CreateSourceDto, UpdateSelectorConfigDto, UpdateSourceDto,
};
use crate::presentation::errors::AppError;
use crate::presentation::state::AppState;

pub async fn list_sources(
    Extension(state): Extension<AppState>,
    Query(query): Query<SourceQueryDto>,
) -> Result<impl IntoResponse, AppError> {
    Ok(Json(state.sources.list(query.active).await?))
}

/// 创建新闻来源
pub async fn create_source(
    Extension(state): Extension<AppState>,
    Json(payload): Json<CreateSourceDto>,
) -> Result<impl IntoResponse, AppError> {
    let source = state.sources.create(payload).await?;
    Ok((StatusCode::CREATED, Json(source)))
}

pub async fn get_source(
    Extension(state): Extension<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    Ok(Json(state.sources.get(id).await?))
}

pub async fn update_source(
    Extension(state): Extension<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateSourceDto>,
) -> Result<impl IntoResponse, AppError> {
    Ok(Json(state.sources.update(id, payload).await?))
}

pub async fn delete_source(
    Extension(state): Extension<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    state.sources.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn list_selector_configs(
    Extension(state): Extension<AppState>,
) -> Result<impl IntoResponse, AppError> {
    Ok(Json(state.selector_configs.list().await?))
}

/// 创建选择器配置
pub async fn create_selector_config(
    Extension(state): Extension<AppState>,
    Json(payload): Json<CreateSelectorConfigDto>,
) -> Result<impl IntoResponse, AppError> {
    let config = state.selector_configs.create(payload).await?;
    Ok((StatusCode::CREATED, Json(config)))
}

pub async fn get_selector_config(
    Extension(state): Extension<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    Ok(Json(state.selector_configs.get(id).await?))
}

pub async fn update_selector_config(
    Extension(state): Extension<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateSelectorConfigDto>,
) -> Result<impl IntoResponse, AppError> {
    Ok(Json(state.selector_configs.update(id, payload).await?))
}

pub async fn delete_selector_config(
    Extension(state): Extension<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    state.selector_configs.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
