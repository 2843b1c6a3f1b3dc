use common::{Round, RoundBoard, RoundStatus};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Primary key of the single event row, created at bootstrap.
pub const SINGLETON_ID: i32 = 1;

#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "hackathon")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: i32,

    pub name: String,
    #[sea_orm(column_type = "Text")]
    pub description: String,
    pub start_time: DateTimeUtc,
    pub end_time: DateTimeUtc,

    /// 1, 2 or 3.
    pub current_round: i32,
    pub round1_status: RoundStatus,
    pub round2_status: RoundStatus,
    pub round3_status: RoundStatus,

    pub updated_at: DateTimeUtc,
}

impl Model {
    /// Round state as the state machine sees it. An out-of-range stored
    /// `current_round` falls back to round 1.
    pub fn board(&self) -> RoundBoard {
        RoundBoard::new(
            [self.round1_status, self.round2_status, self.round3_status],
            Round::try_from(self.current_round).unwrap_or(Round::One),
        )
    }
}

impl ActiveModelBehavior for ActiveModel {}
