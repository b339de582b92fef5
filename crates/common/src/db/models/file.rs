//! File entity
//!
//! One row per uploaded artifact. Rows are keyed uniquely on
//! (date, newspaper, type, topic); the orchestrators are the only writers.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "files")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,

    pub date: Date,

    /// Newspaper slug (referential guard, not a foreign key)
    #[sea_orm(column_type = "Text")]
    pub newspaper: String,

    #[sea_orm(column_name = "type", column_type = "Text")]
    #[serde(rename = "type")]
    pub file_type: String,

    /// Topic tag; null except for type = topic
    #[sea_orm(column_type = "Text", nullable)]
    pub topic: Option<String>,

    /// Public CDN link
    #[sea_orm(column_type = "Text")]
    pub url: String,

    /// Media-store identifier; required for original/archive rows
    #[sea_orm(column_type = "Text", nullable)]
    pub file_id: Option<String>,

    /// Media-store path; required alongside file_id
    #[sea_orm(column_type = "Text", nullable)]
    pub path: Option<String>,

    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
