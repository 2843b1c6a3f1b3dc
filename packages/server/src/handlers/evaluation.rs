use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use tracing::instrument;

use crate::engine::evaluation::{
    NamedEvaluation, all_evaluations, judge_evaluations, judge_queue, my_team_coverage,
    submit_evaluation, team_evaluations,
};
use crate::engine::rounds::load_hackathon;
use crate::error::{AppError, ErrorBody};
use crate::extractors::auth::AuthUser;
use crate::extractors::json::AppJson;
use crate::models::evaluation::*;
use crate::state::AppState;

fn to_responses(rows: Vec<NamedEvaluation>) -> Vec<EvaluationResponse> {
    rows.into_iter().map(EvaluationResponse::from).collect()
}

#[utoipa::path(
    post,
    path = "/",
    tag = "Evaluations",
    operation_id = "submitEvaluation",
    summary = "Score a team",
    description = "Records the calling judge's score for a team of their theme. Each judge scores a team at most once per round; evaluations cannot be edited. Requires `evaluation:submit` permission.",
    request_body = SubmitEvaluationRequest,
    responses(
        (status = 201, description = "Evaluation recorded", body = EvaluationResponse),
        (status = 400, description = "Score, round or criteria out of range (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Team outside the judge's theme (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Team not found (NOT_FOUND)", body = ErrorBody),
        (status = 409, description = "Already evaluated in this round (CONFLICT)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload), fields(team_id = payload.team_id, round = payload.round))]
pub async fn submit(
    auth_user: AuthUser,
    State(state): State<AppState>,
    AppJson(payload): AppJson<SubmitEvaluationRequest>,
) -> Result<impl IntoResponse, AppError> {
    auth_user.require_permission("evaluation:submit")?;

    let named = submit_evaluation(&state.db, &auth_user.caller(), payload.into()).await?;
    Ok((StatusCode::CREATED, Json(EvaluationResponse::from(named))))
}

#[utoipa::path(
    get,
    path = "/judge",
    tag = "Evaluations",
    operation_id = "listJudgeEvaluations",
    summary = "List own evaluations",
    description = "Evaluations submitted by the calling judge, newest first. Requires `evaluation:view_own` permission.",
    responses(
        (status = 200, description = "Evaluations", body = Vec<EvaluationResponse>),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(judge_id = auth_user.user_id))]
pub async fn list_judge_evaluations(
    auth_user: AuthUser,
    State(state): State<AppState>,
) -> Result<Json<Vec<EvaluationResponse>>, AppError> {
    auth_user.require_permission("evaluation:view_own")?;
    let rows = judge_evaluations(&state.db, &auth_user.caller()).await?;
    Ok(Json(to_responses(rows)))
}

#[utoipa::path(
    get,
    path = "/judge/queue",
    tag = "Evaluations",
    operation_id = "getJudgeQueue",
    summary = "Teams to score now",
    description = "Teams of the judge's theme eligible for the current round: teams flagged ready in rounds 1 and 2, every team in the final. Empty unless the current round is ACTIVE. Requires `evaluation:submit` permission.",
    responses(
        (status = 200, description = "Queue", body = JudgeQueueResponse),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(judge_id = auth_user.user_id))]
pub async fn get_judge_queue(
    auth_user: AuthUser,
    State(state): State<AppState>,
) -> Result<Json<JudgeQueueResponse>, AppError> {
    auth_user.require_permission("evaluation:submit")?;
    let board = load_hackathon(&state.db).await?.board();
    let queue = judge_queue(&state.db, &auth_user.caller(), &board).await?;
    Ok(Json(JudgeQueueResponse::from(queue)))
}

#[utoipa::path(
    get,
    path = "/my-team",
    tag = "Evaluations",
    operation_id = "getMyTeamEvaluationStatus",
    summary = "Evaluation status of own team",
    description = "Whether each round of the caller's team has been scored at least once. Scores themselves are not disclosed. Requires `evaluation:view_team` permission.",
    responses(
        (status = 200, description = "Status", body = MyTeamStatusResponse),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Caller leads no team (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(user_id = auth_user.user_id))]
pub async fn my_team_status(
    auth_user: AuthUser,
    State(state): State<AppState>,
) -> Result<Json<MyTeamStatusResponse>, AppError> {
    auth_user.require_permission("evaluation:view_team")?;
    let (own, coverage) = my_team_coverage(&state.db, &auth_user.caller()).await?;
    Ok(Json(MyTeamStatusResponse::new(own, coverage)))
}

#[utoipa::path(
    get,
    path = "/team/{id}",
    tag = "Evaluations",
    operation_id = "listTeamEvaluations",
    summary = "List a team's evaluations",
    description = "Visible to admins and to the judge of the team's theme.",
    params(("id" = i32, Path, description = "Team ID")),
    responses(
        (status = 200, description = "Evaluations", body = Vec<EvaluationResponse>),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Team not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user))]
pub async fn list_team_evaluations(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<Vec<EvaluationResponse>>, AppError> {
    auth_user.require_any_permission(&["evaluation:view_all", "evaluation:view_own"])?;
    let rows = team_evaluations(&state.db, &auth_user.caller(), id).await?;
    Ok(Json(to_responses(rows)))
}

#[utoipa::path(
    get,
    path = "/all",
    tag = "Evaluations",
    operation_id = "listAllEvaluations",
    summary = "List every evaluation",
    description = "Requires `evaluation:view_all` permission.",
    responses(
        (status = 200, description = "Evaluations", body = Vec<EvaluationResponse>),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user))]
pub async fn list_all_evaluations(
    auth_user: AuthUser,
    State(state): State<AppState>,
) -> Result<Json<Vec<EvaluationResponse>>, AppError> {
    auth_user.require_permission("evaluation:view_all")?;
    let rows = all_evaluations(&state.db, &auth_user.caller()).await?;
    Ok(Json(to_responses(rows)))
}
