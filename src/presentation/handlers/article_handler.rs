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

use crate::application::dto::query_request::{ArticleQueryDto, ReadFlagDto};
use crate::presentation::errors::AppError;
use crate::presentation::state::AppState;

/// 分页查询文章
pub async fn list_articles(
    Extension(state): Extension<AppState>,
    Query(query): Query<ArticleQueryDto>,
) -> Result<impl IntoResponse, AppError> {
    Ok(Json(state.articles.list(query).await?))
}

/// 设置已读标记
pub async fn mark_read(
    Extension(state): Extension<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<ReadFlagDto>,
) -> Result<impl IntoResponse, AppError> {
    Ok(Json(state.articles.set_read(id, payload.read).await?))
}
