//! Incident entity.
//!
//! `severity` and `status` hold the wire literals; the counts are derived
//! values recomputed from the child tables.

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "incidents")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub title: String,
    #[sea_orm(column_type = "Text")]
    pub description: String,
    pub category: String,
    pub location: String,
    pub people_involved: String,
    pub severity: String,
    pub status: String,
    pub created_by: Uuid,
    pub created_by_username: String,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
    pub comments_count: i64,
    pub files_count: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
