// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::schedule::{CrawlParams, Schedule};
use crate::domain::repositories::schedule_repository::{NextRunWrite, ScheduleRepository};
use crate::domain::repositories::RepositoryError;
use crate::infrastructure::database::entities::schedule as schedule_entity;
use async_trait::async_trait;
use chrono::{DateTime, FixedOffset};
use sea_orm::{
    sea_query::Expr, ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter,
    QueryOrder, Set,
};
use std::sync::Arc;
use uuid::Uuid;

/// 调度计划仓库实现
#[derive(Clone)]
pub struct ScheduleRepositoryImpl {
    db: Arc<DatabaseConnection>,
}

impl ScheduleRepositoryImpl {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }
}

impl From<schedule_entity::Model> for Schedule {
    fn from(model: schedule_entity::Model) -> Self {
        Self {
            id: model.id,
            source_id: model.source_id,
            cron_expression: model.cron_expression,
            active: model.active,
            params: CrawlParams {
                max_depth: model.max_depth.max(0) as u32,
                article_limit: model.article_limit.max(0) as u32,
                timeout_ms: model.timeout_ms.max(0) as u64,
                full_content: model.full_content,
                follow_links: model.follow_links,
            },
            last_run: model.last_run,
            next_run: model.next_run,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}

impl From<&Schedule> for schedule_entity::ActiveModel {
    fn from(schedule: &Schedule) -> Self {
        Self {
            id: Set(schedule.id),
            source_id: Set(schedule.source_id),
            cron_expression: Set(schedule.cron_expression.clone()),
            active: Set(schedule.active),
            max_depth: Set(schedule.params.max_depth as i32),
            article_limit: Set(schedule.params.article_limit as i32),
            timeout_ms: Set(schedule.params.timeout_ms as i64),
            full_content: Set(schedule.params.full_content),
            follow_links: Set(schedule.params.follow_links),
            last_run: Set(schedule.last_run),
            next_run: Set(schedule.next_run),
            created_at: Set(schedule.created_at),
            updated_at: Set(schedule.updated_at),
        }
    }
}

#[async_trait]
impl ScheduleRepository for ScheduleRepositoryImpl {
    async fn create(&self, schedule: &Schedule) -> Result<Schedule, RepositoryError> {
        let model: schedule_entity::ActiveModel = schedule.into();
        Ok(model.insert(self.db.as_ref()).await?.into())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Schedule>, RepositoryError> {
        let model = schedule_entity::Entity::find_by_id(id)
            .one(self.db.as_ref())
            .await?;
        Ok(model.map(Into::into))
    }

    async fn list(&self, source_id: Option<Uuid>) -> Result<Vec<Schedule>, RepositoryError> {
        let mut query = schedule_entity::Entity::find();
        if let Some(source_id) = source_id {
            query = query.filter(schedule_entity::Column::SourceId.eq(source_id));
        }
        let models = query
            .order_by_asc(schedule_entity::Column::CreatedAt)
            .all(self.db.as_ref())
            .await?;
        Ok(models.into_iter().map(Into::into).collect())
    }

    async fn update(
        &self,
        schedule: &Schedule,
        next_run: NextRunWrite,
    ) -> Result<Schedule, RepositoryError> {
        let params = &schedule.params;
        let mut update = schedule_entity::Entity::update_many()
            .col_expr(
                schedule_entity::Column::CronExpression,
                Expr::value(schedule.cron_expression.clone()),
            )
            .col_expr(schedule_entity::Column::Active, Expr::value(schedule.active))
            .col_expr(schedule_entity::Column::MaxDepth, Expr::value(params.max_depth as i32))
            .col_expr(
                schedule_entity::Column::ArticleLimit,
                Expr::value(params.article_limit as i32),
            )
            .col_expr(schedule_entity::Column::TimeoutMs, Expr::value(params.timeout_ms as i64))
            .col_expr(schedule_entity::Column::FullContent, Expr::value(params.full_content))
            .col_expr(schedule_entity::Column::FollowLinks, Expr::value(params.follow_links))
            .col_expr(schedule_entity::Column::UpdatedAt, Expr::value(schedule.updated_at))
            .filter(schedule_entity::Column::Id.eq(schedule.id));

        // last_run is owned by the scheduler and never written here
        if let NextRunWrite::Replace { expected } = next_run {
            update = update.col_expr(schedule_entity::Column::NextRun, Expr::value(schedule.next_run));
            update = match expected {
                Some(expected) => update.filter(schedule_entity::Column::NextRun.eq(expected)),
                None => update.filter(schedule_entity::Column::NextRun.is_null()),
            };
        }

        let result = update.exec(self.db.as_ref()).await?;
        if result.rows_affected == 0 {
            return match self.find_by_id(schedule.id).await? {
                Some(_) => Err(RepositoryError::Conflict(format!(
                    "schedule {} was dispatched while being edited, retry the update",
                    schedule.id
                ))),
                None => Err(RepositoryError::NotFound),
            };
        }
        self.find_by_id(schedule.id)
            .await?
            .ok_or(RepositoryError::NotFound)
    }

    async fn delete(&self, id: Uuid) -> Result<bool, RepositoryError> {
        let result = schedule_entity::Entity::delete_by_id(id)
            .exec(self.db.as_ref())
            .await?;
        Ok(result.rows_affected > 0)
    }

    async fn find_due(&self, now: DateTime<FixedOffset>) -> Result<Vec<Schedule>, RepositoryError> {
        let models = schedule_entity::Entity::find()
            .filter(schedule_entity::Column::Active.eq(true))
            .filter(schedule_entity::Column::NextRun.is_not_null())
            .filter(schedule_entity::Column::NextRun.lte(now))
            .order_by_asc(schedule_entity::Column::NextRun)
            .all(self.db.as_ref())
            .await?;
        Ok(models.into_iter().map(Into::into).collect())
    }

    async fn advance(
        &self,
        id: Uuid,
        now: DateTime<FixedOffset>,
        expected_next_run: DateTime<FixedOffset>,
        last_run: Option<DateTime<FixedOffset>>,
        next_run: DateTime<FixedOffset>,
    ) -> Result<bool, RepositoryError> {
        let mut update = schedule_entity::Entity::update_many()
            .col_expr(schedule_entity::Column::NextRun, Expr::value(Some(next_run)))
            .col_expr(schedule_entity::Column::UpdatedAt, Expr::value(now));
        if let Some(last_run) = last_run {
            update = update.col_expr(schedule_entity::Column::LastRun, Expr::value(Some(last_run)));
        }

        // conditional on the value this tick observed, so concurrent ticks cannot both dispatch
        let result = update
            .filter(schedule_entity::Column::Id.eq(id))
            .filter(schedule_entity::Column::Active.eq(true))
            .filter(schedule_entity::Column::NextRun.eq(expected_next_run))
            .exec(self.db.as_ref())
            .await?;
        Ok(result.rows_affected == 1)
    }
}
