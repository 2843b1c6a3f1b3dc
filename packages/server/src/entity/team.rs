use common::Readiness;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "team")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    #[sea_orm(unique)]
    pub name: String,

    pub theme_id: i32,
    #[sea_orm(belongs_to, from = "theme_id", to = "id")]
    pub theme: HasOne<super::theme::Entity>,

    /// Participant account owned by this team. Deleted with the team.
    #[sea_orm(unique)]
    pub leader_id: i32,
    #[sea_orm(belongs_to, from = "leader_id", to = "id")]
    pub leader: HasOne<super::user::Entity>,

    /// Member names, informational only. JSON array of strings.
    #[sea_orm(column_type = "JsonBinary")]
    pub members: serde_json::Value,

    #[sea_orm(default_value = false)]
    pub ready_round1: bool,
    #[sea_orm(default_value = false)]
    pub ready_round2: bool,

    #[sea_orm(has_many)]
    pub evaluations: HasMany<super::evaluation::Entity>,

    #[sea_orm(has_many)]
    pub complaints: HasMany<super::complaint::Entity>,

    pub created_at: DateTimeUtc,
}

impl Model {
    pub fn readiness(&self) -> Readiness {
        Readiness {
            round1: self.ready_round1,
            round2: self.ready_round2,
        }
    }

    pub fn member_names(&self) -> Vec<String> {
        serde_json::from_value(self.members.clone()).unwrap_or_default()
    }
}

impl ActiveModelBehavior for ActiveModel {}
