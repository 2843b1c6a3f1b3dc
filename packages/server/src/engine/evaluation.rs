use std::collections::{BTreeMap, HashMap, HashSet};

use common::scoring::{RoundCoverage, validate_score};
use common::{Role, Round, RoundBoard, RoundStatus};
use sea_orm::*;
use tracing::instrument;

use super::{Caller, EngineError, Precondition, unique_violation};
use crate::entity::{evaluation, team, user};

const MAX_CRITERIA: usize = 20;
const MAX_FEEDBACK_LEN: usize = 10_000;

/// Input of [`submit_evaluation`].
#[derive(Debug, Clone)]
pub struct NewEvaluation {
    pub team_id: i32,
    pub round: i32,
    pub score: f64,
    pub criteria: Option<BTreeMap<String, f64>>,
    pub feedback: Option<String>,
}

fn validate_input(input: &NewEvaluation) -> Result<Round, EngineError> {
    let round =
        Round::try_from(input.round).map_err(|e| EngineError::InvalidArgument(e.to_string()))?;
    validate_score(input.score).map_err(|e| EngineError::InvalidArgument(e.to_string()))?;

    if let Some(ref criteria) = input.criteria {
        if criteria.len() > MAX_CRITERIA {
            return Err(EngineError::InvalidArgument(format!(
                "At most {MAX_CRITERIA} criteria are allowed"
            )));
        }
        for (name, value) in criteria {
            let name = name.trim();
            if name.is_empty() || name.chars().count() > 64 {
                return Err(EngineError::InvalidArgument(
                    "Criterion names must be 1-64 characters".into(),
                ));
            }
            validate_score(*value)
                .map_err(|e| EngineError::InvalidArgument(format!("Criterion '{name}': {e}")))?;
        }
    }

    if let Some(ref feedback) = input.feedback
        && feedback.len() > MAX_FEEDBACK_LEN
    {
        return Err(EngineError::InvalidArgument(
            "Feedback must be at most 10000 bytes".into(),
        ));
    }
    Ok(round)
}

async fn find_judge<C: ConnectionTrait>(db: &C, caller: &Caller) -> Result<user::Model, EngineError> {
    Precondition::Role(Role::Judge).check(caller)?;
    user::Entity::find_by_id(caller.user_id)
        .one(db)
        .await?
        .filter(|u| u.role == Role::Judge)
        .ok_or(EngineError::Forbidden)
}

async fn find_team<C: ConnectionTrait>(db: &C, team_id: i32) -> Result<team::Model, EngineError> {
    team::Entity::find_by_id(team_id)
        .one(db)
        .await?
        .ok_or_else(|| EngineError::NotFound("Team not found".into()))
}

const ALREADY_EVALUATED: &str = "You have already evaluated this team in this round";

/// Record a judge's score for a team in a round.
///
/// Authorization is checked before the input is validated, so a judge of
/// another theme is refused whatever the score. The `(team, judge, round)`
/// unique key is authoritative: a concurrent duplicate that slips past the
/// pre-check still surfaces as `Conflict`.
#[instrument(skip(db, caller, input), fields(judge_id = caller.user_id, team_id = input.team_id, round = input.round))]
pub async fn submit_evaluation<C: ConnectionTrait>(
    db: &C,
    caller: &Caller,
    input: NewEvaluation,
) -> Result<NamedEvaluation, EngineError> {
    let judge = find_judge(db, caller).await?;
    let target = find_team(db, input.team_id).await?;
    Precondition::judges_theme(&judge, target.theme_id).check(caller)?;

    let round = validate_input(&input)?;

    let exists = evaluation::Entity::find()
        .filter(evaluation::Column::TeamId.eq(target.id))
        .filter(evaluation::Column::JudgeId.eq(judge.id))
        .filter(evaluation::Column::Round.eq(round.number()))
        .one(db)
        .await?
        .is_some();
    if exists {
        return Err(EngineError::Conflict(ALREADY_EVALUATED.into()));
    }

    let criteria = input
        .criteria
        .map(|c| serde_json::to_value(c).map_err(|e| EngineError::Internal(e.to_string())))
        .transpose()?;

    let new_evaluation = evaluation::ActiveModel {
        team_id: Set(target.id),
        judge_id: Set(judge.id),
        round: Set(round.number()),
        score: Set(input.score),
        criteria: Set(criteria),
        feedback: Set(input.feedback.unwrap_or_default().trim().to_string()),
        created_at: Set(chrono::Utc::now()),
        ..Default::default()
    };

    let model = new_evaluation.insert(db).await.map_err(|e| {
        if unique_violation(&e).is_some() {
            tracing::debug!("Duplicate evaluation caught by unique key");
            EngineError::Conflict(ALREADY_EVALUATED.into())
        } else {
            EngineError::from(e)
        }
    })?;

    tracing::info!(evaluation_id = model.id, score = model.score, "Evaluation recorded");
    Ok(NamedEvaluation {
        evaluation: model,
        team_name: target.name,
        judge_name: judge.name,
    })
}

/// An evaluation joined with the names a reader needs.
#[derive(Debug, Clone)]
pub struct NamedEvaluation {
    pub evaluation: evaluation::Model,
    pub team_name: String,
    pub judge_name: String,
}

async fn attach_names<C: ConnectionTrait>(
    db: &C,
    rows: Vec<evaluation::Model>,
) -> Result<Vec<NamedEvaluation>, EngineError> {
    let team_ids: HashSet<i32> = rows.iter().map(|e| e.team_id).collect();
    let judge_ids: HashSet<i32> = rows.iter().map(|e| e.judge_id).collect();

    let teams: HashMap<i32, String> = team::Entity::find()
        .filter(team::Column::Id.is_in(team_ids))
        .all(db)
        .await?
        .into_iter()
        .map(|t| (t.id, t.name))
        .collect();
    let judges: HashMap<i32, String> = user::Entity::find()
        .filter(user::Column::Id.is_in(judge_ids))
        .all(db)
        .await?
        .into_iter()
        .map(|u| (u.id, u.name))
        .collect();

    Ok(rows
        .into_iter()
        .map(|evaluation| NamedEvaluation {
            team_name: teams.get(&evaluation.team_id).cloned().unwrap_or_default(),
            judge_name: judges.get(&evaluation.judge_id).cloned().unwrap_or_default(),
            evaluation,
        })
        .collect())
}

/// Evaluations submitted by the calling judge, newest first.
pub async fn judge_evaluations<C: ConnectionTrait>(
    db: &C,
    caller: &Caller,
) -> Result<Vec<NamedEvaluation>, EngineError> {
    let judge = find_judge(db, caller).await?;
    let rows = evaluation::Entity::find()
        .filter(evaluation::Column::JudgeId.eq(judge.id))
        .order_by_desc(evaluation::Column::CreatedAt)
        .order_by_desc(evaluation::Column::Id)
        .all(db)
        .await?;
    attach_names(db, rows).await
}

/// Evaluations of one team. Visible to admins and to the judge of the team's theme.
pub async fn team_evaluations<C: ConnectionTrait>(
    db: &C,
    caller: &Caller,
    team_id: i32,
) -> Result<Vec<NamedEvaluation>, EngineError> {
    let target = find_team(db, team_id).await?;
    if !Precondition::Role(Role::Admin).holds(caller) {
        let judge = find_judge(db, caller).await?;
        Precondition::judges_theme(&judge, target.theme_id).check(caller)?;
    }

    let rows = evaluation::Entity::find()
        .filter(evaluation::Column::TeamId.eq(target.id))
        .order_by_asc(evaluation::Column::Round)
        .order_by_asc(evaluation::Column::Id)
        .all(db)
        .await?;
    attach_names(db, rows).await
}

/// Every evaluation. Admin only.
pub async fn all_evaluations<C: ConnectionTrait>(
    db: &C,
    caller: &Caller,
) -> Result<Vec<NamedEvaluation>, EngineError> {
    Precondition::Role(Role::Admin).check(caller)?;
    let rows = evaluation::Entity::find()
        .order_by_asc(evaluation::Column::Id)
        .all(db)
        .await?;
    attach_names(db, rows).await
}

/// Which rounds of the caller's own team have been evaluated at least once.
pub async fn my_team_coverage<C: ConnectionTrait>(
    db: &C,
    caller: &Caller,
) -> Result<(team::Model, RoundCoverage), EngineError> {
    Precondition::Role(Role::Participant).check(caller)?;
    let own = team::Entity::find()
        .filter(team::Column::LeaderId.eq(caller.user_id))
        .one(db)
        .await?
        .ok_or_else(|| EngineError::NotFound("You are not leading a team".into()))?;

    let rounds: Vec<i32> = evaluation::Entity::find()
        .filter(evaluation::Column::TeamId.eq(own.id))
        .select_only()
        .column(evaluation::Column::Round)
        .distinct()
        .into_tuple()
        .all(db)
        .await?;

    let coverage = RoundCoverage::from_rounds(rounds.into_iter().filter_map(|r| Round::try_from(r).ok()));
    Ok((own, coverage))
}

pub struct QueueEntry {
    pub team: team::Model,
    /// The calling judge already scored this team in the current round.
    pub evaluated: bool,
}

pub struct JudgeQueue {
    pub round: Round,
    pub status: RoundStatus,
    pub teams: Vec<QueueEntry>,
}

/// Teams the calling judge may score right now.
///
/// Empty unless the current round is active. In rounds 1 and 2 only teams
/// flagged ready appear; in the final every team of the judge's theme does.
pub async fn judge_queue<C: ConnectionTrait>(
    db: &C,
    caller: &Caller,
    board: &RoundBoard,
) -> Result<JudgeQueue, EngineError> {
    let judge = find_judge(db, caller).await?;
    let round = board.current();
    let status = board.status(round);

    let Some(theme_id) = judge.theme_id else {
        return Err(EngineError::Forbidden);
    };
    if !board.is_live(round) {
        return Ok(JudgeQueue {
            round,
            status,
            teams: Vec::new(),
        });
    }

    let teams = team::Entity::find()
        .filter(team::Column::ThemeId.eq(theme_id))
        .order_by_asc(team::Column::Name)
        .all(db)
        .await?;

    let evaluated: HashSet<i32> = evaluation::Entity::find()
        .filter(evaluation::Column::JudgeId.eq(judge.id))
        .filter(evaluation::Column::Round.eq(round.number()))
        .select_only()
        .column(evaluation::Column::TeamId)
        .into_tuple::<i32>()
        .all(db)
        .await?
        .into_iter()
        .collect();

    let teams = teams
        .into_iter()
        .filter(|t| t.readiness().is_eligible(round))
        .map(|t| QueueEntry {
            evaluated: evaluated.contains(&t.id),
            team: t,
        })
        .collect();

    Ok(JudgeQueue {
        round,
        status,
        teams,
    })
}
