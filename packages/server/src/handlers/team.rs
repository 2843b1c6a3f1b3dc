use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use common::Round;
use tracing::instrument;

use crate::engine::readiness::set_readiness;
use crate::engine::rounds::load_hackathon;
use crate::engine::roster::{self, RegisterTeam, UpdateTeam};
use crate::error::{AppError, ErrorBody};
use crate::extractors::auth::AuthUser;
use crate::extractors::json::AppJson;
use crate::models::team::*;
use crate::state::AppState;

fn parse_round(round: i32) -> Result<Round, AppError> {
    Round::try_from(round).map_err(|e| AppError::Validation(e.to_string()))
}

#[utoipa::path(
    post,
    path = "/",
    tag = "Teams",
    operation_id = "createTeam",
    summary = "Register a team",
    description = "Creates the team and the participant account that leads it in one transaction. The returned password equals the username and is shown only once. Requires `team:manage` permission.",
    request_body = CreateTeamRequest,
    responses(
        (status = 201, description = "Team created", body = CreateTeamResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Theme not found (NOT_FOUND)", body = ErrorBody),
        (status = 409, description = "Name taken or theme full (CONFLICT, USERNAME_TAKEN)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload), fields(name = %payload.name, theme_id = payload.theme_id))]
pub async fn create_team(
    auth_user: AuthUser,
    State(state): State<AppState>,
    AppJson(payload): AppJson<CreateTeamRequest>,
) -> Result<impl IntoResponse, AppError> {
    auth_user.require_permission("team:manage")?;
    validate_create_team(&payload)?;

    let registered = RegisterTeam {
        name: payload.name,
        theme_id: payload.theme_id,
        members: payload.members,
        username: payload.username,
    }
    .execute(&state.db, &auth_user.caller())
    .await?;

    Ok((
        StatusCode::CREATED,
        Json(CreateTeamResponse {
            team: TeamResponse::from(registered.team),
            credentials: registered.credentials,
        }),
    ))
}

#[utoipa::path(
    get,
    path = "/",
    tag = "Teams",
    operation_id = "listTeams",
    summary = "List teams",
    description = "Admins see every team, judges the teams of their theme, participants their own team.",
    responses(
        (status = 200, description = "Teams", body = Vec<TeamResponse>),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Judge without a theme (PERMISSION_DENIED)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(user_id = auth_user.user_id))]
pub async fn list_teams(
    auth_user: AuthUser,
    State(state): State<AppState>,
) -> Result<Json<Vec<TeamResponse>>, AppError> {
    let teams = roster::visible_teams(&state.db, &auth_user.caller()).await?;
    Ok(Json(teams.into_iter().map(TeamResponse::from).collect()))
}

#[utoipa::path(
    get,
    path = "/{id}",
    tag = "Teams",
    operation_id = "getTeam",
    summary = "Get a team",
    params(("id" = i32, Path, description = "Team ID")),
    responses(
        (status = 200, description = "Team", body = TeamResponse),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Team not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user))]
pub async fn get_team(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<TeamResponse>, AppError> {
    let found = roster::visible_team(&state.db, &auth_user.caller(), id).await?;
    Ok(Json(TeamResponse::from(found)))
}

#[utoipa::path(
    put,
    path = "/{id}",
    tag = "Teams",
    operation_id = "updateTeam",
    summary = "Update a team",
    description = "Renames a team, replaces its member list or moves it to another theme (subject to that theme's cap). Requires `team:manage` permission.",
    params(("id" = i32, Path, description = "Team ID")),
    request_body = UpdateTeamRequest,
    responses(
        (status = 200, description = "Team updated", body = TeamResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Team or theme not found (NOT_FOUND)", body = ErrorBody),
        (status = 409, description = "Name taken or theme full (CONFLICT)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload))]
pub async fn update_team(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
    AppJson(payload): AppJson<UpdateTeamRequest>,
) -> Result<Json<TeamResponse>, AppError> {
    auth_user.require_permission("team:manage")?;
    validate_update_team(&payload)?;

    if payload == UpdateTeamRequest::default() {
        let found = roster::visible_team(&state.db, &auth_user.caller(), id).await?;
        return Ok(Json(TeamResponse::from(found)));
    }

    let model = roster::update_team(
        &state.db,
        &auth_user.caller(),
        id,
        UpdateTeam {
            name: payload.name,
            theme_id: payload.theme_id,
            members: payload.members,
        },
    )
    .await?;
    Ok(Json(TeamResponse::from(model)))
}

#[utoipa::path(
    delete,
    path = "/{id}",
    tag = "Teams",
    operation_id = "deleteTeam",
    summary = "Delete a team",
    description = "Deletes the team together with its leader account, evaluations and complaints. Requires `team:manage` permission.",
    params(("id" = i32, Path, description = "Team ID")),
    responses(
        (status = 204, description = "Team deleted"),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Team not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user))]
pub async fn delete_team(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<StatusCode, AppError> {
    auth_user.require_permission("team:manage")?;
    roster::delete_team(&state.db, &auth_user.caller(), id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    post,
    path = "/{id}/ready",
    tag = "Teams",
    operation_id = "setTeamReadiness",
    summary = "Set a team's readiness for a round",
    description = "Flags the team ready (or not) for round 1 or 2. Any of those rounds may be flagged at any time; the response tells whether judges currently see the flag. The team's own participant or an admin may call this.",
    params(("id" = i32, Path, description = "Team ID")),
    request_body = SetReadinessRequest,
    responses(
        (status = 200, description = "Readiness stored", body = ReadinessResponse),
        (status = 400, description = "Round 3 or unknown round (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Not this team's leader (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Team not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload), fields(round = payload.round, ready = payload.ready))]
pub async fn set_team_readiness(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
    AppJson(payload): AppJson<SetReadinessRequest>,
) -> Result<Json<ReadinessResponse>, AppError> {
    auth_user.require_permission("team:ready")?;
    let round = parse_round(payload.round)?;

    let board = load_hackathon(&state.db).await?.board();
    let change = set_readiness(
        &state.db,
        &auth_user.caller(),
        &board,
        id,
        round,
        payload.ready,
    )
    .await?;

    Ok(Json(ReadinessResponse {
        team_id: change.team.id,
        round: change.round.number(),
        applicable: true,
        ready: Some(change.ready),
        visible_to_judges: change.visible_to_judges,
    }))
}

#[utoipa::path(
    get,
    path = "/{id}/ready/{round}",
    tag = "Teams",
    operation_id = "getTeamReadiness",
    summary = "Get a team's readiness for a round",
    description = "For round 3 the flag does not apply: `applicable` is false and `ready` is null.",
    params(
        ("id" = i32, Path, description = "Team ID"),
        ("round" = i32, Path, description = "Round number (1, 2 or 3)"),
    ),
    responses(
        (status = 200, description = "Readiness", body = ReadinessResponse),
        (status = 400, description = "Unknown round (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Team not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user))]
pub async fn get_team_readiness(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path((id, round)): Path<(i32, i32)>,
) -> Result<Json<ReadinessResponse>, AppError> {
    let round = parse_round(round)?;
    let found = roster::visible_team(&state.db, &auth_user.caller(), id).await?;
    let board = load_hackathon(&state.db).await?.board();

    let ready = found.readiness().get(round);
    Ok(Json(ReadinessResponse {
        team_id: found.id,
        round: round.number(),
        applicable: ready.is_some(),
        visible_to_judges: ready == Some(true) && board.is_live(round),
        ready,
    }))
}
