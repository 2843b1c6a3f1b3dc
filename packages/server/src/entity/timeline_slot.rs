use common::SlotCategory;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "timeline_slot")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    pub activity: String,
    #[sea_orm(indexed)]
    pub start_time: DateTimeUtc,
    pub end_time: DateTimeUtc,
    pub category: SlotCategory,

    pub created_at: DateTimeUtc,
}

impl ActiveModelBehavior for ActiveModel {}
