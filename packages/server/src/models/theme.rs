use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::shared::{double_option, validate_name};
use crate::error::AppError;

#[derive(Deserialize, utoipa::ToSchema)]
pub struct CreateThemeRequest {
    #[schema(example = "AI")]
    pub name: String,
    /// Maximum number of teams; omit for no cap.
    pub max_teams: Option<i32>,
}

#[derive(Deserialize, Default, PartialEq, utoipa::ToSchema)]
pub struct UpdateThemeRequest {
    pub name: Option<String>,
    /// `null` removes the cap.
    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<i32>)]
    pub max_teams: Option<Option<i32>>,
}

fn validate_max_teams(max_teams: Option<i32>) -> Result<(), AppError> {
    if let Some(max) = max_teams
        && !(1..=1000).contains(&max)
    {
        return Err(AppError::Validation("max_teams must be 1-1000".into()));
    }
    Ok(())
}

pub fn validate_create_theme(req: &CreateThemeRequest) -> Result<(), AppError> {
    validate_name(&req.name, "Theme name")?;
    validate_max_teams(req.max_teams)
}

pub fn validate_update_theme(req: &UpdateThemeRequest) -> Result<(), AppError> {
    if let Some(ref name) = req.name {
        validate_name(name, "Theme name")?;
    }
    validate_max_teams(req.max_teams.flatten())
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct ThemeResponse {
    pub id: i32,
    pub name: String,
    pub max_teams: Option<i32>,
    pub team_count: u64,
    /// Judge assigned to the theme, if any.
    pub judge_id: Option<i32>,
    pub created_at: DateTime<Utc>,
}

pub fn theme_response(
    m: crate::entity::theme::Model,
    team_count: u64,
    judge_id: Option<i32>,
) -> ThemeResponse {
    ThemeResponse {
        id: m.id,
        name: m.name,
        max_teams: m.max_teams,
        team_count,
        judge_id,
        created_at: m.created_at,
    }
}
