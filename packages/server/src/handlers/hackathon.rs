use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use common::timeline::window_contains;
use common::{ComplaintStatus, Role, Round};
use sea_orm::*;
use tracing::instrument;

use crate::engine::rounds::{self, load_hackathon};
use crate::entity::{complaint, evaluation, team, theme, timeline_slot, user};
use crate::error::{AppError, ErrorBody};
use crate::extractors::auth::AuthUser;
use crate::extractors::json::AppJson;
use crate::models::hackathon::*;
use crate::state::AppState;

#[utoipa::path(
    get,
    path = "/config",
    tag = "Hackathon",
    operation_id = "getHackathon",
    summary = "Get event configuration",
    description = "Returns the event's name, schedule and the status of every round.",
    responses(
        (status = 200, description = "Event configuration", body = HackathonResponse),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, _auth_user))]
pub async fn get_hackathon(
    _auth_user: AuthUser,
    State(state): State<AppState>,
) -> Result<Json<HackathonResponse>, AppError> {
    let model = load_hackathon(&state.db).await?;
    Ok(Json(HackathonResponse::from(model)))
}

#[utoipa::path(
    put,
    path = "/config",
    tag = "Hackathon",
    operation_id = "updateHackathon",
    summary = "Update event configuration",
    description = "Updates name, description or schedule. Round statuses are changed through the rounds endpoint. Requires `hackathon:manage` permission.",
    request_body = UpdateHackathonRequest,
    responses(
        (status = 200, description = "Configuration updated", body = HackathonResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload))]
pub async fn update_hackathon(
    auth_user: AuthUser,
    State(state): State<AppState>,
    AppJson(payload): AppJson<UpdateHackathonRequest>,
) -> Result<Json<HackathonResponse>, AppError> {
    auth_user.require_permission("hackathon:manage")?;
    validate_update_hackathon(&payload)?;

    let existing = load_hackathon(&state.db).await?;
    if payload == UpdateHackathonRequest::default() {
        return Ok(Json(HackathonResponse::from(existing)));
    }

    let start = payload.start_time.unwrap_or(existing.start_time);
    let end = payload.end_time.unwrap_or(existing.end_time);
    if end <= start {
        return Err(AppError::Validation(
            "end_time must be after start_time".into(),
        ));
    }

    let mut active: crate::entity::hackathon::ActiveModel = existing.into();
    if let Some(name) = payload.name {
        active.name = Set(name.trim().to_string());
    }
    if let Some(description) = payload.description {
        active.description = Set(description);
    }
    active.start_time = Set(start);
    active.end_time = Set(end);
    active.updated_at = Set(chrono::Utc::now());

    let model = active.update(&state.db).await?;
    Ok(Json(HackathonResponse::from(model)))
}

#[utoipa::path(
    put,
    path = "/rounds/{round}",
    tag = "Hackathon",
    operation_id = "setRoundStatus",
    summary = "Change a round's status",
    description = "Moves a round to LOCKED, ACTIVE or COMPLETED. Activating a round locks any other active round and makes it the current round. Requires `hackathon:manage` permission.",
    params(("round" = i32, Path, description = "Round number (1, 2 or 3)")),
    request_body = SetRoundStatusRequest,
    responses(
        (status = 200, description = "Round status changed", body = RoundChangeResponse),
        (status = 400, description = "Unknown round or transition refused by the round policy (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload), fields(status = %payload.status))]
pub async fn set_round_status(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(round): Path<i32>,
    AppJson(payload): AppJson<SetRoundStatusRequest>,
) -> Result<Json<RoundChangeResponse>, AppError> {
    auth_user.require_permission("hackathon:manage")?;
    let round = Round::try_from(round).map_err(|e| AppError::Validation(e.to_string()))?;

    let change = rounds::set_round_status(
        &state.db,
        &auth_user.caller(),
        state.config.hackathon.round_policy,
        round,
        payload.status,
    )
    .await?;

    Ok(Json(RoundChangeResponse {
        deactivated: change
            .transition
            .deactivated
            .iter()
            .map(|r| r.number())
            .collect(),
        hackathon: HackathonResponse::from(change.hackathon),
    }))
}

#[utoipa::path(
    get,
    path = "/timeline",
    tag = "Timeline",
    operation_id = "listTimeline",
    summary = "List the schedule",
    description = "Returns every timeline slot ordered by start time.",
    responses(
        (status = 200, description = "Timeline slots", body = Vec<SlotResponse>),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, _auth_user))]
pub async fn list_timeline(
    _auth_user: AuthUser,
    State(state): State<AppState>,
) -> Result<Json<Vec<SlotResponse>>, AppError> {
    let slots = timeline_slot::Entity::find()
        .order_by_asc(timeline_slot::Column::StartTime)
        .order_by_asc(timeline_slot::Column::Id)
        .all(&state.db)
        .await?;
    Ok(Json(slots.into_iter().map(SlotResponse::from).collect()))
}

#[utoipa::path(
    post,
    path = "/timeline",
    tag = "Timeline",
    operation_id = "createTimelineSlot",
    summary = "Add a timeline slot",
    description = "Requires `timeline:manage` permission.",
    request_body = CreateSlotRequest,
    responses(
        (status = 201, description = "Slot created", body = SlotResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload), fields(activity = %payload.activity))]
pub async fn create_slot(
    auth_user: AuthUser,
    State(state): State<AppState>,
    AppJson(payload): AppJson<CreateSlotRequest>,
) -> Result<impl IntoResponse, AppError> {
    auth_user.require_permission("timeline:manage")?;
    validate_create_slot(&payload)?;

    let model = timeline_slot::ActiveModel {
        activity: Set(payload.activity.trim().to_string()),
        start_time: Set(payload.start_time),
        end_time: Set(payload.end_time),
        category: Set(payload.category),
        created_at: Set(chrono::Utc::now()),
        ..Default::default()
    }
    .insert(&state.db)
    .await?;

    Ok((StatusCode::CREATED, Json(SlotResponse::from(model))))
}

#[utoipa::path(
    put,
    path = "/timeline/{id}",
    tag = "Timeline",
    operation_id = "updateTimelineSlot",
    summary = "Update a timeline slot",
    description = "Partially updates a slot. Requires `timeline:manage` permission.",
    params(("id" = i32, Path, description = "Slot ID")),
    request_body = UpdateSlotRequest,
    responses(
        (status = 200, description = "Slot updated", body = SlotResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Slot not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload))]
pub async fn update_slot(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
    AppJson(payload): AppJson<UpdateSlotRequest>,
) -> Result<Json<SlotResponse>, AppError> {
    auth_user.require_permission("timeline:manage")?;
    validate_update_slot(&payload)?;

    let existing = timeline_slot::Entity::find_by_id(id)
        .one(&state.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Timeline slot not found".into()))?;

    if payload == UpdateSlotRequest::default() {
        return Ok(Json(SlotResponse::from(existing)));
    }

    let start = payload.start_time.unwrap_or(existing.start_time);
    let end = payload.end_time.unwrap_or(existing.end_time);
    if end <= start {
        return Err(AppError::Validation(
            "end_time must be after start_time".into(),
        ));
    }

    let mut active: timeline_slot::ActiveModel = existing.into();
    if let Some(activity) = payload.activity {
        active.activity = Set(activity.trim().to_string());
    }
    if let Some(category) = payload.category {
        active.category = Set(category);
    }
    active.start_time = Set(start);
    active.end_time = Set(end);

    let model = active.update(&state.db).await?;
    Ok(Json(SlotResponse::from(model)))
}

#[utoipa::path(
    delete,
    path = "/timeline/{id}",
    tag = "Timeline",
    operation_id = "deleteTimelineSlot",
    summary = "Delete a timeline slot",
    description = "Requires `timeline:manage` permission.",
    params(("id" = i32, Path, description = "Slot ID")),
    responses(
        (status = 204, description = "Slot deleted"),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Slot not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user))]
pub async fn delete_slot(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<StatusCode, AppError> {
    auth_user.require_permission("timeline:manage")?;

    let result = timeline_slot::Entity::delete_by_id(id)
        .exec(&state.db)
        .await?;
    if result.rows_affected == 0 {
        return Err(AppError::NotFound("Timeline slot not found".into()));
    }
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    get,
    path = "/timeline/current",
    tag = "Timeline",
    operation_id = "getCurrentTimelineSlot",
    summary = "Get the slot running now",
    description = "Returns the slot whose window contains the current time, or null. `evaluation_window` is advisory and never blocks submissions.",
    responses(
        (status = 200, description = "Current slot", body = CurrentSlotResponse),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, _auth_user))]
pub async fn current_slot(
    _auth_user: AuthUser,
    State(state): State<AppState>,
) -> Result<Json<CurrentSlotResponse>, AppError> {
    let now = chrono::Utc::now();

    // Overlapping slots resolve to the one that started last.
    let slot = timeline_slot::Entity::find()
        .filter(timeline_slot::Column::StartTime.lte(now))
        .filter(timeline_slot::Column::EndTime.gt(now))
        .order_by_desc(timeline_slot::Column::StartTime)
        .order_by_desc(timeline_slot::Column::Id)
        .one(&state.db)
        .await?
        .filter(|s| window_contains(s.start_time, s.end_time, now));

    Ok(Json(CurrentSlotResponse {
        now,
        evaluation_window: slot.as_ref().is_some_and(|s| s.category.allows_evaluation()),
        slot: slot.map(SlotResponse::from),
    }))
}

#[utoipa::path(
    get,
    path = "/stats",
    tag = "Hackathon",
    operation_id = "getHackathonStats",
    summary = "Get event statistics",
    description = "Counts of themes, teams, judges, evaluations and pending complaints. Requires `hackathon:manage` permission.",
    responses(
        (status = 200, description = "Statistics", body = StatsResponse),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user))]
pub async fn get_stats(
    auth_user: AuthUser,
    State(state): State<AppState>,
) -> Result<Json<StatsResponse>, AppError> {
    auth_user.require_permission("hackathon:manage")?;

    let board = load_hackathon(&state.db).await?.board();
    let themes = theme::Entity::find().count(&state.db).await?;
    let teams = team::Entity::find().count(&state.db).await?;
    let judges = user::Entity::find()
        .filter(user::Column::Role.eq(Role::Judge))
        .count(&state.db)
        .await?;
    let evaluations = evaluation::Entity::find().count(&state.db).await?;
    let pending_complaints = complaint::Entity::find()
        .filter(complaint::Column::Status.eq(ComplaintStatus::Pending))
        .count(&state.db)
        .await?;

    Ok(Json(StatsResponse {
        themes,
        teams,
        judges,
        evaluations,
        pending_complaints,
        current_round: board.current().number(),
        current_round_status: board.status(board.current()),
    }))
}
