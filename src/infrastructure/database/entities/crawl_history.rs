// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use sea_orm::entity::prelude::*;
use uuid::Uuid;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "crawl_history")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub job_id: Option<Uuid>,
    pub source_id: Uuid,
    pub schedule_id: Option<Uuid>,
    pub status: String,
    pub params: Json,
    pub attempt: i32,
    pub found: i32,
    pub processed: i32,
    pub new_articles: i32,
    pub duplicates: i32,
    pub errors: i32,
    pub duration_ms: i64,
    #[sea_orm(column_type = "Text")]
    pub message: String,
    pub error_kind: Option<String>,
    pub failures: Json,
    pub started_at: ChronoDateTimeWithTimeZone,
    pub finished_at: ChronoDateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
