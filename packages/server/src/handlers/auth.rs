use axum::{Json, extract::State, http::StatusCode};
use sea_orm::*;
use tracing::instrument;

use crate::entity::{team, user};
use crate::error::{AppError, ErrorBody};
use crate::extractors::auth::AuthUser;
use crate::extractors::json::AppJson;
use crate::models::auth::{
    ChangePasswordRequest, LoginRequest, LoginResponse, UserProfile, validate_change_password,
    validate_login_request,
};
use crate::state::AppState;
use crate::utils::{hash, jwt};

async fn load_profile<C: ConnectionTrait>(db: &C, user: user::Model) -> Result<UserProfile, AppError> {
    let team_id = team::Entity::find()
        .filter(team::Column::LeaderId.eq(user.id))
        .select_only()
        .column(team::Column::Id)
        .into_tuple::<i32>()
        .one(db)
        .await?;

    Ok(UserProfile {
        id: user.id,
        username: user.username,
        name: user.name,
        role: user.role,
        first_login: user.first_login,
        team_id,
        theme_id: user.theme_id,
    })
}

#[utoipa::path(
    post,
    path = "/login",
    tag = "Auth",
    operation_id = "login",
    summary = "Sign in",
    description = "Exchanges username, password and the role the user signs in as for a JWT. A role that does not match the account fails like a wrong password.",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Signed in", body = LoginResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Wrong credentials or role (INVALID_CREDENTIALS)", body = ErrorBody),
    ),
)]
#[instrument(skip(state, payload), fields(username = %payload.username, role = %payload.role))]
pub async fn login(
    State(state): State<AppState>,
    AppJson(payload): AppJson<LoginRequest>,
) -> Result<Json<LoginResponse>, AppError> {
    validate_login_request(&payload)?;

    let username = payload.username.trim();

    let user = user::Entity::find()
        .filter(user::Column::Username.eq(username))
        .one(&state.db)
        .await?
        .ok_or(AppError::InvalidCredentials)?;

    let is_valid = hash::verify_password(&payload.password, &user.password)
        .map_err(|e| AppError::Internal(format!("Password verify error: {}", e)))?;

    if !is_valid || user.role != payload.role {
        return Err(AppError::InvalidCredentials);
    }

    let permissions: Vec<String> = user
        .role
        .permissions()
        .iter()
        .map(|p| ToString::to_string(p))
        .collect();

    let token = jwt::sign(
        user.id,
        &user.username,
        user.role.as_str(),
        permissions.clone(),
        &state.config.auth.jwt_secret,
        state.config.auth.token_ttl_hours,
    )
    .map_err(|e| AppError::Internal(format!("JWT sign error: {}", e)))?;

    tracing::info!(user_id = user.id, "User signed in");

    Ok(Json(LoginResponse {
        token,
        user: load_profile(&state.db, user).await?,
        permissions,
    }))
}

#[utoipa::path(
    get,
    path = "/me",
    tag = "Auth",
    operation_id = "getCurrentUser",
    summary = "Get current user profile",
    responses(
        (status = 200, description = "Current user", body = UserProfile),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(user_id = auth_user.user_id))]
pub async fn me(
    auth_user: AuthUser,
    State(state): State<AppState>,
) -> Result<Json<UserProfile>, AppError> {
    // The token may outlive its account (e.g. a deleted team).
    let user = user::Entity::find_by_id(auth_user.user_id)
        .one(&state.db)
        .await?
        .ok_or(AppError::TokenInvalid)?;

    Ok(Json(load_profile(&state.db, user).await?))
}

#[utoipa::path(
    post,
    path = "/change-password",
    tag = "Auth",
    operation_id = "changePassword",
    summary = "Change own password",
    description = "Replaces the issued password and clears the first-login flag.",
    request_body = ChangePasswordRequest,
    responses(
        (status = 204, description = "Password changed"),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized or wrong current password (TOKEN_MISSING, TOKEN_INVALID, INVALID_CREDENTIALS)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload), fields(user_id = auth_user.user_id))]
pub async fn change_password(
    auth_user: AuthUser,
    State(state): State<AppState>,
    AppJson(payload): AppJson<ChangePasswordRequest>,
) -> Result<StatusCode, AppError> {
    validate_change_password(&payload)?;

    let user = user::Entity::find_by_id(auth_user.user_id)
        .one(&state.db)
        .await?
        .ok_or(AppError::TokenInvalid)?;

    let is_valid = hash::verify_password(&payload.current_password, &user.password)
        .map_err(|e| AppError::Internal(format!("Password verify error: {}", e)))?;
    if !is_valid {
        return Err(AppError::InvalidCredentials);
    }

    let hash = hash::hash_password(&payload.new_password)
        .map_err(|e| AppError::Internal(format!("Password hash error: {}", e)))?;

    let mut active: user::ActiveModel = user.into();
    active.password = Set(hash);
    active.first_login = Set(false);
    active.update(&state.db).await?;

    tracing::info!("Password changed");
    Ok(StatusCode::NO_CONTENT)
}
