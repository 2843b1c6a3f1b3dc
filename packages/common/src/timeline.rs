#[cfg(feature = "sea-orm")]
use sea_orm::prelude::StringLen;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Category tag of a timeline slot.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize, utoipa::ToSchema)]
#[cfg_attr(
    feature = "sea-orm",
    derive(sea_orm::DeriveActiveEnum, sea_orm::EnumIter),
    sea_orm(rs_type = "String", db_type = "String(StringLen::None)")
)]
#[serde(rename_all = "lowercase")]
pub enum SlotCategory {
    #[default]
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "general"))]
    General,
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "dev"))]
    Dev,
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "evaluation"))]
    Evaluation,
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "break"))]
    Break,
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "final"))]
    Final,
}

impl SlotCategory {
    /// Whether judges should be scoring while a slot of this category runs.
    pub fn allows_evaluation(&self) -> bool {
        matches!(self, Self::Evaluation | Self::Final)
    }
}

/// Half-open `[start, end)` containment.
pub fn window_contains(start: DateTime<Utc>, end: DateTime<Utc>, at: DateTime<Utc>) -> bool {
    start <= at && at < end
}
