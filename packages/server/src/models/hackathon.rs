use chrono::{DateTime, Utc};
use common::{Round, RoundStatus, SlotCategory};
use serde::{Deserialize, Serialize};

use super::shared::{validate_name, validate_text};
use crate::error::AppError;

#[derive(Serialize, utoipa::ToSchema)]
pub struct RoundState {
    #[schema(example = 1)]
    pub round: i32,
    pub status: RoundStatus,
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct HackathonResponse {
    pub name: String,
    pub description: String,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    #[schema(example = 1)]
    pub current_round: i32,
    /// Round open for judging, if any.
    pub active_round: Option<i32>,
    pub rounds: Vec<RoundState>,
    pub updated_at: DateTime<Utc>,
}

impl From<crate::entity::hackathon::Model> for HackathonResponse {
    fn from(m: crate::entity::hackathon::Model) -> Self {
        let board = m.board();
        Self {
            current_round: board.current().number(),
            active_round: board.active().map(Round::number),
            rounds: Round::ALL
                .into_iter()
                .map(|round| RoundState {
                    round: round.number(),
                    status: board.status(round),
                })
                .collect(),
            name: m.name,
            description: m.description,
            start_time: m.start_time,
            end_time: m.end_time,
            updated_at: m.updated_at,
        }
    }
}

#[derive(Deserialize, Default, PartialEq, utoipa::ToSchema)]
pub struct UpdateHackathonRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub start_time: Option<DateTime<Utc>>,
    pub end_time: Option<DateTime<Utc>>,
}

pub fn validate_update_hackathon(req: &UpdateHackathonRequest) -> Result<(), AppError> {
    if let Some(ref name) = req.name {
        validate_name(name, "Name")?;
    }
    if let Some(ref description) = req.description
        && description.len() > 100_000
    {
        return Err(AppError::Validation(
            "Description must be at most 100KB".into(),
        ));
    }
    if let (Some(start), Some(end)) = (req.start_time, req.end_time)
        && end <= start
    {
        return Err(AppError::Validation(
            "end_time must be after start_time".into(),
        ));
    }
    Ok(())
}

#[derive(Deserialize, utoipa::ToSchema)]
pub struct SetRoundStatusRequest {
    pub status: RoundStatus,
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct RoundChangeResponse {
    pub hackathon: HackathonResponse,
    /// Rounds that were forced back to `LOCKED`.
    pub deactivated: Vec<i32>,
}

// ---------------------------------------------------------------------------
// Timeline
// ---------------------------------------------------------------------------

#[derive(Deserialize, utoipa::ToSchema)]
pub struct CreateSlotRequest {
    #[schema(example = "Round 1 pitches")]
    pub activity: String,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    #[serde(default)]
    pub category: SlotCategory,
}

#[derive(Deserialize, Default, PartialEq, utoipa::ToSchema)]
pub struct UpdateSlotRequest {
    pub activity: Option<String>,
    pub start_time: Option<DateTime<Utc>>,
    pub end_time: Option<DateTime<Utc>>,
    pub category: Option<SlotCategory>,
}

pub fn validate_create_slot(req: &CreateSlotRequest) -> Result<(), AppError> {
    validate_text(&req.activity, "Activity", 256)?;
    if req.end_time <= req.start_time {
        return Err(AppError::Validation(
            "end_time must be after start_time".into(),
        ));
    }
    Ok(())
}

pub fn validate_update_slot(req: &UpdateSlotRequest) -> Result<(), AppError> {
    if let Some(ref activity) = req.activity {
        validate_text(activity, "Activity", 256)?;
    }
    Ok(())
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct SlotResponse {
    pub id: i32,
    pub activity: String,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub category: SlotCategory,
}

impl From<crate::entity::timeline_slot::Model> for SlotResponse {
    fn from(m: crate::entity::timeline_slot::Model) -> Self {
        Self {
            id: m.id,
            activity: m.activity,
            start_time: m.start_time,
            end_time: m.end_time,
            category: m.category,
        }
    }
}

/// The slot running right now. Advisory: submissions are never blocked by it.
#[derive(Serialize, utoipa::ToSchema)]
pub struct CurrentSlotResponse {
    pub now: DateTime<Utc>,
    pub slot: Option<SlotResponse>,
    /// Whether the running slot is one judges should be scoring in.
    pub evaluation_window: bool,
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct StatsResponse {
    pub themes: u64,
    pub teams: u64,
    pub judges: u64,
    pub evaluations: u64,
    pub pending_complaints: u64,
    pub current_round: i32,
    pub current_round_status: RoundStatus,
}
