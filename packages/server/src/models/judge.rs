use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::shared::validate_name;
use crate::error::AppError;
use crate::utils::credentials::IssuedCredentials;

#[derive(Deserialize, utoipa::ToSchema)]
pub struct CreateJudgeRequest {
    #[schema(example = "Grace Hopper")]
    pub name: String,
    pub theme_id: i32,
    /// Login name. Derived from the judge's name when omitted.
    pub username: Option<String>,
}

pub fn validate_create_judge(req: &CreateJudgeRequest) -> Result<(), AppError> {
    validate_name(&req.name, "Judge name")
}

#[derive(Deserialize, Default, PartialEq, utoipa::ToSchema)]
pub struct UpdateJudgeRequest {
    pub name: Option<String>,
    pub theme_id: Option<i32>,
}

pub fn validate_update_judge(req: &UpdateJudgeRequest) -> Result<(), AppError> {
    if let Some(ref name) = req.name {
        validate_name(name, "Judge name")?;
    }
    Ok(())
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct JudgeResponse {
    pub id: i32,
    pub username: String,
    pub name: String,
    pub theme_id: Option<i32>,
    pub first_login: bool,
    pub created_at: DateTime<Utc>,
}

impl From<crate::entity::user::Model> for JudgeResponse {
    fn from(m: crate::entity::user::Model) -> Self {
        Self {
            id: m.id,
            username: m.username,
            name: m.name,
            theme_id: m.theme_id,
            first_login: m.first_login,
            created_at: m.created_at,
        }
    }
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct CreateJudgeResponse {
    pub judge: JudgeResponse,
    pub credentials: IssuedCredentials,
}
