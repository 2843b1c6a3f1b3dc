#[cfg(feature = "sea-orm")]
use sea_orm::prelude::StringLen;

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The role an identity holds for the whole event.
///
/// When the `sea-orm` feature is enabled, this enum can be used directly in SeaORM entities.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, utoipa::ToSchema)]
#[cfg_attr(
    feature = "sea-orm",
    derive(sea_orm::DeriveActiveEnum, sea_orm::EnumIter),
    sea_orm(rs_type = "String", db_type = "String(StringLen::None)")
)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Organizer: manages rosters, rounds and the timeline, reads the leaderboard.
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "admin"))]
    Admin,
    /// Scores teams of the one theme assigned to them.
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "judge"))]
    Judge,
    /// Team leader account.
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "participant"))]
    Participant,
}

impl Role {
    pub const ALL: &'static [Role] = &[Self::Admin, Self::Judge, Self::Participant];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::Judge => "judge",
            Self::Participant => "participant",
        }
    }

    /// Permissions granted to the role. Carried inside issued tokens.
    pub fn permissions(&self) -> &'static [&'static str] {
        match self {
            Self::Admin => &[
                "hackathon:manage",
                "timeline:manage",
                "theme:manage",
                "team:manage",
                "team:ready",
                "judge:manage",
                "evaluation:view_all",
                "leaderboard:view",
                "complaint:resolve",
                "complaint:view_all",
            ],
            Self::Judge => &["evaluation:submit", "evaluation:view_own"],
            Self::Participant => &["team:ready", "evaluation:view_team", "complaint:create"],
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error when parsing an invalid role string.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Invalid role '{invalid}'. Valid values: admin, judge, participant")]
pub struct ParseRoleError {
    invalid: String,
}

impl FromStr for Role {
    type Err = ParseRoleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "admin" => Ok(Self::Admin),
            "judge" => Ok(Self::Judge),
            "participant" => Ok(Self::Participant),
            _ => Err(ParseRoleError {
                invalid: s.to_string(),
            }),
        }
    }
}
