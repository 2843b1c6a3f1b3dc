use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// A judge's score for one team in one round. Never updated after insert.
#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "evaluation")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    #[sea_orm(unique_key = "team_judge_round")]
    pub team_id: i32,
    #[sea_orm(unique_key = "team_judge_round")]
    pub judge_id: i32,
    /// 1, 2 or 3.
    #[sea_orm(unique_key = "team_judge_round")]
    pub round: i32,

    pub score: f64,
    /// Optional sub-scores, JSON object of criterion name to number.
    #[sea_orm(column_type = "JsonBinary", nullable)]
    pub criteria: Option<serde_json::Value>,
    #[sea_orm(column_type = "Text")]
    pub feedback: String,

    #[sea_orm(belongs_to, from = "team_id", to = "id")]
    pub team: HasOne<super::team::Entity>,
    #[sea_orm(belongs_to, from = "judge_id", to = "id")]
    pub judge: HasOne<super::user::Entity>,

    pub created_at: DateTimeUtc,
}

impl ActiveModelBehavior for ActiveModel {}
