//! Team and judge lifecycle: the multi-row commands of the roster.

use common::Role;
use sea_orm::sea_query::LockType;
use sea_orm::*;
use tracing::{info, instrument};

use super::{Caller, EngineError, Precondition, unique_violation};
use crate::entity::{complaint, evaluation, team, theme, user};
use crate::utils::credentials::{IssuedCredentials, resolve_username};
use crate::utils::hash;

async fn find_theme_for_update(
    txn: &DatabaseTransaction,
    id: i32,
) -> Result<theme::Model, EngineError> {
    theme::Entity::find_by_id(id)
        .lock(LockType::Update)
        .one(txn)
        .await?
        .ok_or_else(|| EngineError::NotFound("Theme not found".into()))
}

async fn find_team_for_update(
    txn: &DatabaseTransaction,
    id: i32,
) -> Result<team::Model, EngineError> {
    team::Entity::find_by_id(id)
        .lock(LockType::Update)
        .one(txn)
        .await?
        .ok_or_else(|| EngineError::NotFound("Team not found".into()))
}

async fn find_judge_for_update(
    txn: &DatabaseTransaction,
    id: i32,
) -> Result<user::Model, EngineError> {
    user::Entity::find_by_id(id)
        .filter(user::Column::Role.eq(Role::Judge))
        .lock(LockType::Update)
        .one(txn)
        .await?
        .ok_or_else(|| EngineError::NotFound("Judge not found".into()))
}

/// Fail with `Conflict` when `theme` already holds its maximum number of teams.
/// The theme row must be locked by the caller's transaction.
async fn ensure_theme_has_room(
    txn: &DatabaseTransaction,
    theme: &theme::Model,
) -> Result<(), EngineError> {
    let Some(max) = theme.max_teams else {
        return Ok(());
    };
    let count = team::Entity::find()
        .filter(team::Column::ThemeId.eq(theme.id))
        .count(txn)
        .await?;
    if count >= std::cmp::Ord::max(max, 0) as u64 {
        return Err(EngineError::Conflict(format!(
            "Theme '{}' already has its maximum of {} teams",
            theme.name, max
        )));
    }
    Ok(())
}

async fn ensure_theme_has_no_judge(
    txn: &DatabaseTransaction,
    theme: &theme::Model,
) -> Result<(), EngineError> {
    let assigned = user::Entity::find()
        .filter(user::Column::ThemeId.eq(theme.id))
        .one(txn)
        .await?;
    if assigned.is_some() {
        return Err(EngineError::Conflict(format!(
            "Theme '{}' already has a judge",
            theme.name
        )));
    }
    Ok(())
}

async fn ensure_username_free(
    txn: &DatabaseTransaction,
    username: &str,
) -> Result<(), EngineError> {
    let taken = user::Entity::find()
        .filter(user::Column::Username.eq(username))
        .one(txn)
        .await?
        .is_some();
    if taken {
        return Err(EngineError::UsernameTaken);
    }
    Ok(())
}

fn initial_password_hash(username: &str) -> Result<String, EngineError> {
    hash::hash_password(username)
        .map_err(|e| EngineError::Internal(format!("Password hash error: {e}")))
}

fn members_json(members: &[String]) -> serde_json::Value {
    serde_json::Value::from(
        members
            .iter()
            .map(|m| m.trim())
            .filter(|m| !m.is_empty())
            .map(str::to_string)
            .collect::<Vec<_>>(),
    )
}

/// Load a team the caller may look at: any team for admins, the judge's own
/// theme for judges, and their own team for participants.
pub async fn visible_team<C: ConnectionTrait>(
    db: &C,
    caller: &Caller,
    team_id: i32,
) -> Result<team::Model, EngineError> {
    let found = team::Entity::find_by_id(team_id)
        .one(db)
        .await?
        .ok_or_else(|| EngineError::NotFound("Team not found".into()))?;

    match caller.role {
        Role::Admin | Role::Participant => Precondition::owns_team(&found).check(caller)?,
        Role::Judge => {
            let judge = user::Entity::find_by_id(caller.user_id)
                .one(db)
                .await?
                .ok_or(EngineError::Forbidden)?;
            Precondition::judges_theme(&judge, found.theme_id).check(caller)?;
        }
    }
    Ok(found)
}

/// Teams the caller may look at, ordered by id.
pub async fn visible_teams<C: ConnectionTrait>(
    db: &C,
    caller: &Caller,
) -> Result<Vec<team::Model>, EngineError> {
    let mut select = team::Entity::find().order_by_asc(team::Column::Id);
    match caller.role {
        Role::Admin => {}
        Role::Participant => select = select.filter(team::Column::LeaderId.eq(caller.user_id)),
        Role::Judge => {
            let theme_id = user::Entity::find_by_id(caller.user_id)
                .one(db)
                .await?
                .and_then(|u| u.theme_id)
                .ok_or(EngineError::Forbidden)?;
            select = select.filter(team::Column::ThemeId.eq(theme_id));
        }
    }
    Ok(select.all(db).await?)
}

/// Create a team together with the participant account that leads it.
///
/// Both rows are written in one transaction: either the team and its leader
/// exist afterwards, or neither does.
#[derive(Debug, Clone)]
pub struct RegisterTeam {
    pub name: String,
    pub theme_id: i32,
    pub members: Vec<String>,
    /// Leader login; derived from the team name when absent.
    pub username: Option<String>,
}

pub struct RegisteredTeam {
    pub team: team::Model,
    pub leader: user::Model,
    pub credentials: IssuedCredentials,
}

impl RegisterTeam {
    #[instrument(skip_all, fields(name = %self.name, theme_id = self.theme_id))]
    pub async fn execute(
        self,
        db: &DatabaseConnection,
        caller: &Caller,
    ) -> Result<RegisteredTeam, EngineError> {
        Precondition::Role(Role::Admin).check(caller)?;

        let name = self.name.trim().to_string();
        let username = resolve_username(self.username.as_deref(), "team", &name)
            .map_err(|e| EngineError::InvalidArgument(e.into()))?;
        let password_hash = initial_password_hash(&username)?;

        let txn = db.begin().await?;
        let theme = find_theme_for_update(&txn, self.theme_id).await?;
        ensure_theme_has_room(&txn, &theme).await?;

        if team::Entity::find()
            .filter(team::Column::Name.eq(&name))
            .one(&txn)
            .await?
            .is_some()
        {
            return Err(EngineError::Conflict(format!("Team '{name}' already exists")));
        }
        ensure_username_free(&txn, &username).await?;

        let now = chrono::Utc::now();
        let leader = user::ActiveModel {
            username: Set(username.clone()),
            name: Set(name.clone()),
            password: Set(password_hash),
            role: Set(Role::Participant),
            theme_id: Set(None),
            first_login: Set(true),
            created_at: Set(now),
            ..Default::default()
        }
        .insert(&txn)
        .await
        .map_err(|e| match unique_violation(&e) {
            Some(_) => EngineError::UsernameTaken,
            None => EngineError::from(e),
        })?;

        let created = team::ActiveModel {
            name: Set(name.clone()),
            theme_id: Set(theme.id),
            leader_id: Set(leader.id),
            members: Set(members_json(&self.members)),
            ready_round1: Set(false),
            ready_round2: Set(false),
            created_at: Set(now),
            ..Default::default()
        }
        .insert(&txn)
        .await
        .map_err(|e| match unique_violation(&e) {
            Some(_) => EngineError::Conflict(format!("Team '{name}' already exists")),
            None => EngineError::from(e),
        })?;

        txn.commit().await?;
        info!(team_id = created.id, leader_id = leader.id, "Team registered");

        Ok(RegisteredTeam {
            team: created,
            leader,
            credentials: IssuedCredentials::for_username(&username),
        })
    }
}

/// Partial update of a team. `None` fields are left alone.
#[derive(Debug, Clone, Default)]
pub struct UpdateTeam {
    pub name: Option<String>,
    pub theme_id: Option<i32>,
    pub members: Option<Vec<String>>,
}

#[instrument(skip(db, caller, changes))]
pub async fn update_team(
    db: &DatabaseConnection,
    caller: &Caller,
    team_id: i32,
    changes: UpdateTeam,
) -> Result<team::Model, EngineError> {
    Precondition::Role(Role::Admin).check(caller)?;

    let txn = db.begin().await?;
    let existing = find_team_for_update(&txn, team_id).await?;

    let mut active: team::ActiveModel = existing.clone().into();

    if let Some(theme_id) = changes.theme_id
        && theme_id != existing.theme_id
    {
        let theme = find_theme_for_update(&txn, theme_id).await?;
        ensure_theme_has_room(&txn, &theme).await?;
        active.theme_id = Set(theme.id);
    }
    if let Some(ref name) = changes.name {
        active.name = Set(name.trim().to_string());
    }
    if let Some(ref members) = changes.members {
        active.members = Set(members_json(members));
    }

    let model = active.update(&txn).await.map_err(|e| match unique_violation(&e) {
        Some(_) => EngineError::Conflict("A team with this name already exists".into()),
        None => EngineError::from(e),
    })?;
    txn.commit().await?;

    Ok(model)
}

/// Delete a team with its leader account, evaluations and complaints.
#[instrument(skip(db, caller))]
pub async fn delete_team(
    db: &DatabaseConnection,
    caller: &Caller,
    team_id: i32,
) -> Result<(), EngineError> {
    Precondition::Role(Role::Admin).check(caller)?;

    let txn = db.begin().await?;
    let existing = find_team_for_update(&txn, team_id).await?;

    let evaluations = evaluation::Entity::delete_many()
        .filter(evaluation::Column::TeamId.eq(team_id))
        .exec(&txn)
        .await?;
    let complaints = complaint::Entity::delete_many()
        .filter(complaint::Column::TeamId.eq(team_id))
        .exec(&txn)
        .await?;
    team::Entity::delete_by_id(team_id).exec(&txn).await?;
    user::Entity::delete_by_id(existing.leader_id)
        .exec(&txn)
        .await?;

    txn.commit().await?;
    info!(
        evaluations = evaluations.rows_affected,
        complaints = complaints.rows_affected,
        "Team deleted"
    );
    Ok(())
}

/// Create a judge account assigned to one theme.
#[derive(Debug, Clone)]
pub struct RegisterJudge {
    pub name: String,
    pub theme_id: i32,
    pub username: Option<String>,
}

pub struct RegisteredJudge {
    pub judge: user::Model,
    pub credentials: IssuedCredentials,
}

impl RegisterJudge {
    #[instrument(skip_all, fields(name = %self.name, theme_id = self.theme_id))]
    pub async fn execute(
        self,
        db: &DatabaseConnection,
        caller: &Caller,
    ) -> Result<RegisteredJudge, EngineError> {
        Precondition::Role(Role::Admin).check(caller)?;

        let name = self.name.trim().to_string();
        let username = resolve_username(self.username.as_deref(), "judge", &name)
            .map_err(|e| EngineError::InvalidArgument(e.into()))?;
        let password_hash = initial_password_hash(&username)?;

        let txn = db.begin().await?;
        let theme = find_theme_for_update(&txn, self.theme_id).await?;
        ensure_theme_has_no_judge(&txn, &theme).await?;
        ensure_username_free(&txn, &username).await?;

        let judge = user::ActiveModel {
            username: Set(username.clone()),
            name: Set(name),
            password: Set(password_hash),
            role: Set(Role::Judge),
            theme_id: Set(Some(theme.id)),
            first_login: Set(true),
            created_at: Set(chrono::Utc::now()),
            ..Default::default()
        }
        .insert(&txn)
        .await
        .map_err(judge_unique_violation)?;

        txn.commit().await?;
        info!(judge_id = judge.id, "Judge registered");

        Ok(RegisteredJudge {
            judge,
            credentials: IssuedCredentials::for_username(&username),
        })
    }
}

/// Both unique keys on `user` are named after their column: Postgres calls
/// them `user_theme_id_key` and `user_username_key`.
fn judge_key_conflict(constraint_msg: &str) -> EngineError {
    if constraint_msg.contains("theme_id") {
        EngineError::Conflict("This theme already has a judge".into())
    } else {
        EngineError::UsernameTaken
    }
}

fn judge_unique_violation(err: DbErr) -> EngineError {
    match unique_violation(&err) {
        Some(msg) => judge_key_conflict(&msg),
        None => EngineError::from(err),
    }
}

#[derive(Debug, Clone, Default)]
pub struct UpdateJudge {
    pub name: Option<String>,
    pub theme_id: Option<i32>,
}

#[instrument(skip(db, caller, changes))]
pub async fn update_judge(
    db: &DatabaseConnection,
    caller: &Caller,
    judge_id: i32,
    changes: UpdateJudge,
) -> Result<user::Model, EngineError> {
    Precondition::Role(Role::Admin).check(caller)?;

    let txn = db.begin().await?;
    let existing = find_judge_for_update(&txn, judge_id).await?;
    let mut active: user::ActiveModel = existing.clone().into();

    if let Some(theme_id) = changes.theme_id
        && existing.theme_id != Some(theme_id)
    {
        let theme = find_theme_for_update(&txn, theme_id).await?;
        ensure_theme_has_no_judge(&txn, &theme).await?;
        active.theme_id = Set(Some(theme.id));
    }
    if let Some(ref name) = changes.name {
        active.name = Set(name.trim().to_string());
    }

    let model = active.update(&txn).await.map_err(judge_unique_violation)?;
    txn.commit().await?;
    Ok(model)
}

/// Delete a judge together with the evaluations they submitted.
#[instrument(skip(db, caller))]
pub async fn delete_judge(
    db: &DatabaseConnection,
    caller: &Caller,
    judge_id: i32,
) -> Result<(), EngineError> {
    Precondition::Role(Role::Admin).check(caller)?;

    let txn = db.begin().await?;
    find_judge_for_update(&txn, judge_id).await?;

    let evaluations = evaluation::Entity::delete_many()
        .filter(evaluation::Column::JudgeId.eq(judge_id))
        .exec(&txn)
        .await?;
    user::Entity::delete_by_id(judge_id).exec(&txn).await?;

    txn.commit().await?;
    info!(evaluations = evaluations.rows_affected, "Judge deleted");
    Ok(())
}

/// Delete a theme nobody references.
#[instrument(skip(db, caller))]
pub async fn delete_theme(
    db: &DatabaseConnection,
    caller: &Caller,
    theme_id: i32,
) -> Result<(), EngineError> {
    Precondition::Role(Role::Admin).check(caller)?;

    let txn = db.begin().await?;
    let theme = find_theme_for_update(&txn, theme_id).await?;

    let teams = team::Entity::find()
        .filter(team::Column::ThemeId.eq(theme_id))
        .count(&txn)
        .await?;
    if teams > 0 {
        return Err(EngineError::Conflict(format!(
            "Theme '{}' still has {teams} team(s)",
            theme.name
        )));
    }
    ensure_theme_has_no_judge(&txn, &theme).await?;

    theme::Entity::delete_by_id(theme_id).exec(&txn).await?;
    txn.commit().await?;
    Ok(())
}

/// Change a theme's team cap. The cap may not drop below the current team count.
#[instrument(skip(db, caller))]
pub async fn update_theme(
    db: &DatabaseConnection,
    caller: &Caller,
    theme_id: i32,
    name: Option<String>,
    max_teams: Option<Option<i32>>,
) -> Result<theme::Model, EngineError> {
    Precondition::Role(Role::Admin).check(caller)?;

    let txn = db.begin().await?;
    let existing = find_theme_for_update(&txn, theme_id).await?;
    let mut active: theme::ActiveModel = existing.into();

    if let Some(Some(max)) = max_teams {
        let teams = team::Entity::find()
            .filter(team::Column::ThemeId.eq(theme_id))
            .count(&txn)
            .await?;
        if (max as u64) < teams {
            return Err(EngineError::Conflict(format!(
                "Theme already has {teams} teams, more than the requested maximum of {max}"
            )));
        }
    }
    if let Some(max_teams) = max_teams {
        active.max_teams = Set(max_teams);
    }
    if let Some(ref name) = name {
        active.name = Set(name.trim().to_string());
    }

    let model = active.update(&txn).await.map_err(|e| match unique_violation(&e) {
        Some(_) => EngineError::Conflict("A theme with this name already exists".into()),
        None => EngineError::from(e),
    })?;
    txn.commit().await?;
    Ok(model)
}
