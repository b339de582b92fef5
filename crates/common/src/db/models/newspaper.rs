//! Newspaper entity

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "newspapers")]
pub struct Model {
    /// Normalized lowercase-hyphenated identifier
    #[sea_orm(primary_key, auto_increment = false, column_type = "Text")]
    pub slug: String,

    #[sea_orm(column_type = "Text")]
    pub display_name: String,

    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
