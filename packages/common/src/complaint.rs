#[cfg(feature = "sea-orm")]
use sea_orm::prelude::StringLen;

use serde::{Deserialize, Serialize};

/// What a complaint is about.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, utoipa::ToSchema)]
#[cfg_attr(
    feature = "sea-orm",
    derive(sea_orm::DeriveActiveEnum, sea_orm::EnumIter),
    sea_orm(rs_type = "String", db_type = "String(StringLen::None)")
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ComplaintType {
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "TECHNICAL"))]
    Technical,
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "EVALUATION"))]
    Evaluation,
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "OTHER"))]
    Other,
}

/// `PENDING -> RESOLVED`; resolved complaints are never reopened.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize, utoipa::ToSchema)]
#[cfg_attr(
    feature = "sea-orm",
    derive(sea_orm::DeriveActiveEnum, sea_orm::EnumIter),
    sea_orm(rs_type = "String", db_type = "String(StringLen::None)")
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ComplaintStatus {
    #[default]
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "PENDING"))]
    Pending,
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "RESOLVED"))]
    Resolved,
}

impl ComplaintStatus {
    pub fn is_final(&self) -> bool {
        matches!(self, Self::Resolved)
    }
}
