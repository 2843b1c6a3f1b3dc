use std::collections::HashMap;

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use common::Role;
use sea_orm::*;
use tracing::instrument;

use crate::engine::roster;
use crate::entity::{team, theme, user};
use crate::error::{AppError, ErrorBody};
use crate::extractors::auth::AuthUser;
use crate::extractors::json::AppJson;
use crate::models::theme::*;
use crate::state::AppState;

async fn describe<C: ConnectionTrait>(db: &C, model: theme::Model) -> Result<ThemeResponse, AppError> {
    let team_count = team::Entity::find()
        .filter(team::Column::ThemeId.eq(model.id))
        .count(db)
        .await?;
    let judge_id = user::Entity::find()
        .filter(user::Column::ThemeId.eq(model.id))
        .filter(user::Column::Role.eq(Role::Judge))
        .select_only()
        .column(user::Column::Id)
        .into_tuple::<i32>()
        .one(db)
        .await?;
    Ok(theme_response(model, team_count, judge_id))
}

#[utoipa::path(
    post,
    path = "/",
    tag = "Themes",
    operation_id = "createTheme",
    summary = "Create a theme",
    description = "Requires `theme:manage` permission.",
    request_body = CreateThemeRequest,
    responses(
        (status = 201, description = "Theme created", body = ThemeResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 409, description = "Name already used (CONFLICT)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload), fields(name = %payload.name))]
pub async fn create_theme(
    auth_user: AuthUser,
    State(state): State<AppState>,
    AppJson(payload): AppJson<CreateThemeRequest>,
) -> Result<impl IntoResponse, AppError> {
    auth_user.require_permission("theme:manage")?;
    validate_create_theme(&payload)?;

    let model = theme::ActiveModel {
        name: Set(payload.name.trim().to_string()),
        max_teams: Set(payload.max_teams),
        created_at: Set(chrono::Utc::now()),
        ..Default::default()
    }
    .insert(&state.db)
    .await
    .map_err(|e| match e.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(_)) => {
            AppError::Conflict("A theme with this name already exists".into())
        }
        _ => AppError::from(e),
    })?;

    Ok((
        StatusCode::CREATED,
        Json(theme_response(model, 0, None)),
    ))
}

#[utoipa::path(
    get,
    path = "/",
    tag = "Themes",
    operation_id = "listThemes",
    summary = "List themes",
    description = "Returns every theme with its team count and assigned judge.",
    responses(
        (status = 200, description = "Themes", body = Vec<ThemeResponse>),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, _auth_user))]
pub async fn list_themes(
    _auth_user: AuthUser,
    State(state): State<AppState>,
) -> Result<Json<Vec<ThemeResponse>>, AppError> {
    let themes = theme::Entity::find()
        .order_by_asc(theme::Column::Id)
        .all(&state.db)
        .await?;

    let mut team_counts: HashMap<i32, u64> = HashMap::new();
    let theme_of_team: Vec<i32> = team::Entity::find()
        .select_only()
        .column(team::Column::ThemeId)
        .into_tuple()
        .all(&state.db)
        .await?;
    for theme_id in theme_of_team {
        *team_counts.entry(theme_id).or_default() += 1;
    }

    let judges: HashMap<i32, i32> = user::Entity::find()
        .filter(user::Column::Role.eq(Role::Judge))
        .all(&state.db)
        .await?
        .into_iter()
        .filter_map(|u| u.theme_id.map(|t| (t, u.id)))
        .collect();

    Ok(Json(
        themes
            .into_iter()
            .map(|t| {
                let count = team_counts.get(&t.id).copied().unwrap_or(0);
                let judge_id = judges.get(&t.id).copied();
                theme_response(t, count, judge_id)
            })
            .collect(),
    ))
}

#[utoipa::path(
    get,
    path = "/{id}",
    tag = "Themes",
    operation_id = "getTheme",
    summary = "Get a theme",
    params(("id" = i32, Path, description = "Theme ID")),
    responses(
        (status = 200, description = "Theme", body = ThemeResponse),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 404, description = "Theme not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, _auth_user))]
pub async fn get_theme(
    _auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<ThemeResponse>, AppError> {
    let model = theme::Entity::find_by_id(id)
        .one(&state.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Theme not found".into()))?;
    Ok(Json(describe(&state.db, model).await?))
}

#[utoipa::path(
    put,
    path = "/{id}",
    tag = "Themes",
    operation_id = "updateTheme",
    summary = "Update a theme",
    description = "Renames a theme or changes its team cap. The cap cannot drop below the current number of teams. Requires `theme:manage` permission.",
    params(("id" = i32, Path, description = "Theme ID")),
    request_body = UpdateThemeRequest,
    responses(
        (status = 200, description = "Theme updated", body = ThemeResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Theme not found (NOT_FOUND)", body = ErrorBody),
        (status = 409, description = "Name taken or cap below team count (CONFLICT)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload))]
pub async fn update_theme(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
    AppJson(payload): AppJson<UpdateThemeRequest>,
) -> Result<Json<ThemeResponse>, AppError> {
    auth_user.require_permission("theme:manage")?;
    validate_update_theme(&payload)?;

    let model = if payload == UpdateThemeRequest::default() {
        theme::Entity::find_by_id(id)
            .one(&state.db)
            .await?
            .ok_or_else(|| AppError::NotFound("Theme not found".into()))?
    } else {
        roster::update_theme(
            &state.db,
            &auth_user.caller(),
            id,
            payload.name,
            payload.max_teams,
        )
        .await?
    };

    Ok(Json(describe(&state.db, model).await?))
}

#[utoipa::path(
    delete,
    path = "/{id}",
    tag = "Themes",
    operation_id = "deleteTheme",
    summary = "Delete a theme",
    description = "Only themes without teams and without a judge can be deleted. Requires `theme:manage` permission.",
    params(("id" = i32, Path, description = "Theme ID")),
    responses(
        (status = 204, description = "Theme deleted"),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Theme not found (NOT_FOUND)", body = ErrorBody),
        (status = 409, description = "Theme still referenced (CONFLICT)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user))]
pub async fn delete_theme(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<StatusCode, AppError> {
    auth_user.require_permission("theme:manage")?;
    roster::delete_theme(&state.db, &auth_user.caller(), id).await?;
    Ok(StatusCode::NO_CONTENT)
}
