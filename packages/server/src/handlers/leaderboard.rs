use axum::Json;
use axum::extract::State;
use tracing::instrument;

use crate::engine::leaderboard::compute_leaderboard;
use crate::error::{AppError, ErrorBody};
use crate::extractors::auth::AuthUser;
use crate::models::leaderboard::LeaderboardResponse;
use crate::state::AppState;

#[utoipa::path(
    get,
    path = "/",
    tag = "Leaderboard",
    operation_id = "getLeaderboard",
    summary = "Get the leaderboard",
    description = "Ranks every team by the mean of its three round averages, computed on each request. A round without evaluations counts as 0. Requires `leaderboard:view` permission.",
    responses(
        (status = 200, description = "Standings", body = LeaderboardResponse),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user))]
pub async fn get_leaderboard(
    auth_user: AuthUser,
    State(state): State<AppState>,
) -> Result<Json<LeaderboardResponse>, AppError> {
    auth_user.require_permission("leaderboard:view")?;
    let standings = compute_leaderboard(&state.db, &auth_user.caller()).await?;
    Ok(Json(LeaderboardResponse {
        standings,
        generated_at: chrono::Utc::now(),
    }))
}
