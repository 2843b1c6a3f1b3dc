use std::collections::HashMap;

use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use common::ComplaintStatus;
use sea_orm::sea_query::LockType;
use sea_orm::*;
use tracing::instrument;

use crate::entity::{complaint, team};
use crate::error::{AppError, ErrorBody};
use crate::extractors::auth::AuthUser;
use crate::extractors::json::AppJson;
use crate::models::complaint::*;
use crate::state::AppState;

async fn own_team(db: &DatabaseConnection, user_id: i32) -> Result<team::Model, AppError> {
    team::Entity::find()
        .filter(team::Column::LeaderId.eq(user_id))
        .one(db)
        .await?
        .ok_or_else(|| AppError::NotFound("You are not leading a team".into()))
}

#[utoipa::path(
    post,
    path = "/",
    tag = "Complaints",
    operation_id = "createComplaint",
    summary = "File a complaint",
    description = "Files a complaint on behalf of the caller's team. Requires `complaint:create` permission.",
    request_body = CreateComplaintRequest,
    responses(
        (status = 201, description = "Complaint filed", body = ComplaintResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Caller leads no team (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload), fields(user_id = auth_user.user_id, kind = ?payload.kind))]
pub async fn create_complaint(
    auth_user: AuthUser,
    State(state): State<AppState>,
    AppJson(payload): AppJson<CreateComplaintRequest>,
) -> Result<impl IntoResponse, AppError> {
    auth_user.require_permission("complaint:create")?;
    validate_create_complaint(&payload)?;

    let own = own_team(&state.db, auth_user.user_id).await?;

    let model = complaint::ActiveModel {
        team_id: Set(own.id),
        kind: Set(payload.kind),
        description: Set(payload.description.trim().to_string()),
        status: Set(ComplaintStatus::Pending),
        resolved_by: Set(None),
        resolved_at: Set(None),
        created_at: Set(chrono::Utc::now()),
        ..Default::default()
    }
    .insert(&state.db)
    .await?;

    tracing::info!(complaint_id = model.id, team_id = own.id, "Complaint filed");

    Ok((
        StatusCode::CREATED,
        Json(complaint_response(model, own.name)),
    ))
}

#[utoipa::path(
    get,
    path = "/",
    tag = "Complaints",
    operation_id = "listComplaints",
    summary = "List complaints",
    description = "Admins see every complaint; participants see their own team's. Newest first.",
    params(ComplaintListQuery),
    responses(
        (status = 200, description = "Complaints", body = Vec<ComplaintResponse>),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Caller leads no team (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, query))]
pub async fn list_complaints(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Query(query): Query<ComplaintListQuery>,
) -> Result<Json<Vec<ComplaintResponse>>, AppError> {
    auth_user.require_any_permission(&["complaint:view_all", "complaint:create"])?;

    let mut select = complaint::Entity::find();
    if !auth_user.has_permission("complaint:view_all") {
        let own = own_team(&state.db, auth_user.user_id).await?;
        select = select.filter(complaint::Column::TeamId.eq(own.id));
    }
    if let Some(status) = query.status {
        select = select.filter(complaint::Column::Status.eq(status));
    }

    let rows = select
        .order_by_desc(complaint::Column::CreatedAt)
        .order_by_desc(complaint::Column::Id)
        .all(&state.db)
        .await?;

    let team_ids: Vec<i32> = rows.iter().map(|c| c.team_id).collect();
    let names: HashMap<i32, String> = team::Entity::find()
        .filter(team::Column::Id.is_in(team_ids))
        .all(&state.db)
        .await?
        .into_iter()
        .map(|t| (t.id, t.name))
        .collect();

    Ok(Json(
        rows.into_iter()
            .map(|c| {
                let name = names.get(&c.team_id).cloned().unwrap_or_default();
                complaint_response(c, name)
            })
            .collect(),
    ))
}

#[utoipa::path(
    put,
    path = "/{id}/resolve",
    tag = "Complaints",
    operation_id = "resolveComplaint",
    summary = "Resolve a complaint",
    description = "Marks a pending complaint resolved, stamping the resolver and time. Resolution is final. Requires `complaint:resolve` permission.",
    params(("id" = i32, Path, description = "Complaint ID")),
    responses(
        (status = 200, description = "Complaint resolved", body = ComplaintResponse),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Complaint not found (NOT_FOUND)", body = ErrorBody),
        (status = 409, description = "Already resolved (CONFLICT)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user))]
pub async fn resolve_complaint(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<ComplaintResponse>, AppError> {
    auth_user.require_permission("complaint:resolve")?;

    let txn = state.db.begin().await?;
    let existing = complaint::Entity::find_by_id(id)
        .lock(LockType::Update)
        .one(&txn)
        .await?
        .ok_or_else(|| AppError::NotFound("Complaint not found".into()))?;

    if existing.status.is_final() {
        return Err(AppError::Conflict("Complaint is already resolved".into()));
    }

    let mut active: complaint::ActiveModel = existing.into();
    active.status = Set(ComplaintStatus::Resolved);
    active.resolved_by = Set(Some(auth_user.user_id));
    active.resolved_at = Set(Some(chrono::Utc::now()));
    let model = active.update(&txn).await?;
    txn.commit().await?;

    let team_name = team::Entity::find_by_id(model.team_id)
        .one(&state.db)
        .await?
        .map(|t| t.name)
        .unwrap_or_default();

    tracing::info!(complaint_id = model.id, "Complaint resolved");
    Ok(Json(complaint_response(model, team_name)))
}
