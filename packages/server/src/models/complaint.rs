use chrono::{DateTime, Utc};
use common::{ComplaintStatus, ComplaintType};
use serde::{Deserialize, Serialize};
use utoipa::IntoParams;

use super::shared::validate_text;
use crate::error::AppError;

#[derive(Deserialize, utoipa::ToSchema)]
pub struct CreateComplaintRequest {
    #[serde(rename = "type")]
    pub kind: ComplaintType,
    #[schema(example = "Our demo machine lost network during the pitch")]
    pub description: String,
}

pub fn validate_create_complaint(req: &CreateComplaintRequest) -> Result<(), AppError> {
    validate_text(&req.description, "Description", 10_000)
}

#[derive(Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ComplaintListQuery {
    /// Only complaints with this status.
    pub status: Option<ComplaintStatus>,
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct ComplaintResponse {
    pub id: i32,
    pub team_id: i32,
    pub team_name: String,
    #[serde(rename = "type")]
    pub kind: ComplaintType,
    pub description: String,
    pub status: ComplaintStatus,
    pub resolved_by: Option<i32>,
    pub resolved_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

pub fn complaint_response(m: crate::entity::complaint::Model, team_name: String) -> ComplaintResponse {
    ComplaintResponse {
        id: m.id,
        team_id: m.team_id,
        team_name,
        kind: m.kind,
        description: m.description,
        status: m.status,
        resolved_by: m.resolved_by,
        resolved_at: m.resolved_at,
        created_at: m.created_at,
    }
}
