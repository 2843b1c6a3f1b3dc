use common::Role;
use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// Request body for login.
#[derive(Deserialize, utoipa::ToSchema)]
pub struct LoginRequest {
    #[schema(example = "team_alpha")]
    pub username: String,
    #[schema(example = "team_alpha")]
    pub password: String,
    /// Role the user is signing in as. Must match the account's role.
    pub role: Role,
}

pub fn validate_login_request(payload: &LoginRequest) -> Result<(), AppError> {
    if payload.username.trim().is_empty() {
        return Err(AppError::Validation("Username must not be empty".into()));
    }
    if payload.password.is_empty() {
        return Err(AppError::Validation("Password must not be empty".into()));
    }
    Ok(())
}

#[derive(Deserialize, utoipa::ToSchema)]
pub struct ChangePasswordRequest {
    pub current_password: String,
    /// New password (8-128 characters).
    #[schema(example = "s3cure_P@ss!")]
    pub new_password: String,
}

pub fn validate_change_password(payload: &ChangePasswordRequest) -> Result<(), AppError> {
    if payload.new_password.len() < 8 || payload.new_password.len() > 128 {
        return Err(AppError::Validation(
            "Password must be 8-128 characters".into(),
        ));
    }
    if payload.new_password == payload.current_password {
        return Err(AppError::Validation(
            "New password must differ from the current one".into(),
        ));
    }
    Ok(())
}

/// Profile of the signed-in account.
#[derive(Serialize, utoipa::ToSchema)]
pub struct UserProfile {
    #[schema(example = 42)]
    pub id: i32,
    #[schema(example = "team_alpha")]
    pub username: String,
    #[schema(example = "Alpha")]
    pub name: String,
    pub role: Role,
    /// True until the issued password has been changed.
    pub first_login: bool,
    /// Team led by this account (participants only).
    pub team_id: Option<i32>,
    /// Assigned theme (judges only).
    pub theme_id: Option<i32>,
}

/// Successful login response.
#[derive(Serialize, utoipa::ToSchema)]
pub struct LoginResponse {
    /// JWT bearer token.
    #[schema(example = "eyJhbGciOiJIUzI1NiIsInR5cCI6IkpXVCJ9...")]
    pub token: String,
    pub user: UserProfile,
    /// Permissions granted to the user.
    #[schema(example = json!(["team:ready"]))]
    pub permissions: Vec<String>,
}
