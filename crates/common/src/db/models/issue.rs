//! Issue entity
//!
//! One row per (date, newspaper). The URL fields are denormalized copies of
//! the matching file rows' URLs, maintained by the orchestrators; nothing
//! cascades them automatically.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "issues")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub date: Date,

    #[sea_orm(primary_key, auto_increment = false, column_type = "Text")]
    pub newspaper: String,

    #[sea_orm(column_type = "Text", nullable)]
    pub original_url: Option<String>,

    #[sea_orm(column_type = "Text", nullable)]
    pub summary_url: Option<String>,

    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
