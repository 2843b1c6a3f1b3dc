use common::{Round, RoundBoard};
use sea_orm::sea_query::LockType;
use sea_orm::*;
use tracing::instrument;

use super::{Caller, EngineError, Precondition};
use crate::entity::team;

pub struct ReadinessChange {
    pub team: team::Model,
    pub round: Round,
    pub ready: bool,
    /// Ready, and the round is current and active.
    pub visible_to_judges: bool,
}

/// Set a team's readiness flag for round 1 or 2.
///
/// Future rounds may be flagged ahead of time; the flag is stored either way.
/// The row is locked while the flags are rewritten so that concurrent writes
/// to the other round's flag are not lost.
#[instrument(skip(db, caller, board), fields(round = round.number()))]
pub async fn set_readiness(
    db: &DatabaseConnection,
    caller: &Caller,
    board: &RoundBoard,
    team_id: i32,
    round: Round,
    ready: bool,
) -> Result<ReadinessChange, EngineError> {
    let txn = db.begin().await?;

    let existing = team::Entity::find_by_id(team_id)
        .lock(LockType::Update)
        .one(&txn)
        .await?
        .ok_or_else(|| EngineError::NotFound("Team not found".into()))?;

    Precondition::owns_team(&existing).check(caller)?;

    let mut readiness = existing.readiness();
    readiness
        .set(round, ready)
        .map_err(|e| EngineError::InvalidArgument(e.to_string()))?;

    let mut active: team::ActiveModel = existing.into();
    active.ready_round1 = Set(readiness.round1);
    active.ready_round2 = Set(readiness.round2);
    let model = active.update(&txn).await?;
    txn.commit().await?;

    tracing::info!(team_id, ready, "Readiness updated");

    Ok(ReadinessChange {
        team: model,
        round,
        ready,
        visible_to_judges: ready && board.is_live(round),
    })
}
