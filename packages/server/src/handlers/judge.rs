use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use common::Role;
use sea_orm::*;
use tracing::instrument;

use crate::engine::roster::{self, RegisterJudge, UpdateJudge};
use crate::entity::user;
use crate::error::{AppError, ErrorBody};
use crate::extractors::auth::AuthUser;
use crate::extractors::json::AppJson;
use crate::models::judge::*;
use crate::state::AppState;

async fn find_judge(db: &DatabaseConnection, id: i32) -> Result<user::Model, AppError> {
    user::Entity::find_by_id(id)
        .filter(user::Column::Role.eq(Role::Judge))
        .one(db)
        .await?
        .ok_or_else(|| AppError::NotFound("Judge not found".into()))
}

#[utoipa::path(
    post,
    path = "/",
    tag = "Judges",
    operation_id = "createJudge",
    summary = "Register a judge",
    description = "Creates a judge account assigned to one theme. A theme has at most one judge. The returned password equals the username and is shown only once. Requires `judge:manage` permission.",
    request_body = CreateJudgeRequest,
    responses(
        (status = 201, description = "Judge created", body = CreateJudgeResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Theme not found (NOT_FOUND)", body = ErrorBody),
        (status = 409, description = "Theme already judged or username taken (CONFLICT, USERNAME_TAKEN)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload), fields(name = %payload.name, theme_id = payload.theme_id))]
pub async fn create_judge(
    auth_user: AuthUser,
    State(state): State<AppState>,
    AppJson(payload): AppJson<CreateJudgeRequest>,
) -> Result<impl IntoResponse, AppError> {
    auth_user.require_permission("judge:manage")?;
    validate_create_judge(&payload)?;

    let registered = RegisterJudge {
        name: payload.name,
        theme_id: payload.theme_id,
        username: payload.username,
    }
    .execute(&state.db, &auth_user.caller())
    .await?;

    Ok((
        StatusCode::CREATED,
        Json(CreateJudgeResponse {
            judge: JudgeResponse::from(registered.judge),
            credentials: registered.credentials,
        }),
    ))
}

#[utoipa::path(
    get,
    path = "/",
    tag = "Judges",
    operation_id = "listJudges",
    summary = "List judges",
    description = "Requires `judge:manage` permission.",
    responses(
        (status = 200, description = "Judges", body = Vec<JudgeResponse>),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user))]
pub async fn list_judges(
    auth_user: AuthUser,
    State(state): State<AppState>,
) -> Result<Json<Vec<JudgeResponse>>, AppError> {
    auth_user.require_permission("judge:manage")?;

    let judges = user::Entity::find()
        .filter(user::Column::Role.eq(Role::Judge))
        .order_by_asc(user::Column::Id)
        .all(&state.db)
        .await?;
    Ok(Json(judges.into_iter().map(JudgeResponse::from).collect()))
}

#[utoipa::path(
    get,
    path = "/{id}",
    tag = "Judges",
    operation_id = "getJudge",
    summary = "Get a judge",
    description = "Requires `judge:manage` permission.",
    params(("id" = i32, Path, description = "Judge ID")),
    responses(
        (status = 200, description = "Judge", body = JudgeResponse),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Judge not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user))]
pub async fn get_judge(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<JudgeResponse>, AppError> {
    auth_user.require_permission("judge:manage")?;
    Ok(Json(JudgeResponse::from(find_judge(&state.db, id).await?)))
}

#[utoipa::path(
    put,
    path = "/{id}",
    tag = "Judges",
    operation_id = "updateJudge",
    summary = "Update a judge",
    description = "Renames a judge or reassigns them to a theme that has no judge yet. Requires `judge:manage` permission.",
    params(("id" = i32, Path, description = "Judge ID")),
    request_body = UpdateJudgeRequest,
    responses(
        (status = 200, description = "Judge updated", body = JudgeResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Judge or theme not found (NOT_FOUND)", body = ErrorBody),
        (status = 409, description = "Theme already judged (CONFLICT)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload))]
pub async fn update_judge(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
    AppJson(payload): AppJson<UpdateJudgeRequest>,
) -> Result<Json<JudgeResponse>, AppError> {
    auth_user.require_permission("judge:manage")?;
    validate_update_judge(&payload)?;

    if payload == UpdateJudgeRequest::default() {
        return Ok(Json(JudgeResponse::from(find_judge(&state.db, id).await?)));
    }

    let model = roster::update_judge(
        &state.db,
        &auth_user.caller(),
        id,
        UpdateJudge {
            name: payload.name,
            theme_id: payload.theme_id,
        },
    )
    .await?;
    Ok(Json(JudgeResponse::from(model)))
}

#[utoipa::path(
    delete,
    path = "/{id}",
    tag = "Judges",
    operation_id = "deleteJudge",
    summary = "Delete a judge",
    description = "Deletes the judge and every evaluation they submitted. Requires `judge:manage` permission.",
    params(("id" = i32, Path, description = "Judge ID")),
    responses(
        (status = 204, description = "Judge deleted"),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Judge not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user))]
pub async fn delete_judge(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<StatusCode, AppError> {
    auth_user.require_permission("judge:manage")?;
    roster::delete_judge(&state.db, &auth_user.caller(), id).await?;
    Ok(StatusCode::NO_CONTENT)
}
