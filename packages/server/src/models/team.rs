use chrono::{DateTime, Utc};
use common::Readiness;
use serde::{Deserialize, Serialize};

use super::shared::{validate_members, validate_name};
use crate::error::AppError;
use crate::utils::credentials::IssuedCredentials;

#[derive(Deserialize, utoipa::ToSchema)]
pub struct CreateTeamRequest {
    #[schema(example = "Alpha")]
    pub name: String,
    pub theme_id: i32,
    /// Member names, informational only.
    #[serde(default)]
    #[schema(example = json!(["Ada", "Linus"]))]
    pub members: Vec<String>,
    /// Leader login. Derived from the team name when omitted.
    #[schema(example = "team_alpha")]
    pub username: Option<String>,
}

pub fn validate_create_team(req: &CreateTeamRequest) -> Result<(), AppError> {
    validate_name(&req.name, "Team name")?;
    validate_members(&req.members)
}

#[derive(Deserialize, Default, PartialEq, utoipa::ToSchema)]
pub struct UpdateTeamRequest {
    pub name: Option<String>,
    pub theme_id: Option<i32>,
    pub members: Option<Vec<String>>,
}

pub fn validate_update_team(req: &UpdateTeamRequest) -> Result<(), AppError> {
    if let Some(ref name) = req.name {
        validate_name(name, "Team name")?;
    }
    if let Some(ref members) = req.members {
        validate_members(members)?;
    }
    Ok(())
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct TeamResponse {
    pub id: i32,
    pub name: String,
    pub theme_id: i32,
    pub leader_id: i32,
    pub members: Vec<String>,
    pub readiness: Readiness,
    pub created_at: DateTime<Utc>,
}

impl From<crate::entity::team::Model> for TeamResponse {
    fn from(m: crate::entity::team::Model) -> Self {
        Self {
            members: m.member_names(),
            readiness: m.readiness(),
            id: m.id,
            name: m.name,
            theme_id: m.theme_id,
            leader_id: m.leader_id,
            created_at: m.created_at,
        }
    }
}

/// Returned once, on creation. The password cannot be retrieved later.
#[derive(Serialize, utoipa::ToSchema)]
pub struct CreateTeamResponse {
    pub team: TeamResponse,
    pub credentials: IssuedCredentials,
}

#[derive(Deserialize, utoipa::ToSchema)]
pub struct SetReadinessRequest {
    /// 1 or 2. The final round has no readiness gate.
    #[schema(example = 1)]
    pub round: i32,
    pub ready: bool,
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct ReadinessResponse {
    pub team_id: i32,
    pub round: i32,
    /// False for the final round, which has no readiness flag.
    pub applicable: bool,
    /// Stored flag; `null` when not applicable.
    pub ready: Option<bool>,
    /// Whether judges see the team for this round right now.
    pub visible_to_judges: bool,
}
