use common::round::Transition;
use common::{Role, Round, RoundPolicy, RoundStatus};
use sea_orm::sea_query::LockType;
use sea_orm::*;
use tracing::{info, instrument};

use super::{Caller, EngineError, Precondition};
use crate::entity::hackathon;

/// Read the event row. It is created by bootstrap, never by a read.
pub async fn load_hackathon<C: ConnectionTrait>(db: &C) -> Result<hackathon::Model, EngineError> {
    hackathon::Entity::find_by_id(hackathon::SINGLETON_ID)
        .one(db)
        .await?
        .ok_or_else(|| EngineError::Internal("Hackathon has not been bootstrapped".into()))
}

async fn load_hackathon_for_update(
    txn: &DatabaseTransaction,
) -> Result<hackathon::Model, EngineError> {
    hackathon::Entity::find_by_id(hackathon::SINGLETON_ID)
        .lock(LockType::Update)
        .one(txn)
        .await?
        .ok_or_else(|| EngineError::Internal("Hackathon has not been bootstrapped".into()))
}

/// Result of [`set_round_status`].
pub struct RoundChange {
    pub hackathon: hackathon::Model,
    pub transition: Transition,
}

/// Move `round` to `status`, deactivating any other active round when
/// activating. Runs under a row lock on the event so concurrent admins
/// cannot leave two rounds active.
#[instrument(skip(db, caller), fields(round = round.number(), status = %status))]
pub async fn set_round_status(
    db: &DatabaseConnection,
    caller: &Caller,
    policy: RoundPolicy,
    round: Round,
    status: RoundStatus,
) -> Result<RoundChange, EngineError> {
    Precondition::Role(Role::Admin).check(caller)?;

    let txn = db.begin().await?;
    let existing = load_hackathon_for_update(&txn).await?;

    let mut board = existing.board();
    let transition = board
        .transition(round, status, policy)
        .map_err(|e| EngineError::InvalidArgument(e.to_string()))?;

    if transition.is_noop() {
        txn.commit().await?;
        return Ok(RoundChange {
            hackathon: existing,
            transition,
        });
    }

    let [r1, r2, r3] = board.statuses();
    let mut active: hackathon::ActiveModel = existing.into();
    active.round1_status = Set(r1);
    active.round2_status = Set(r2);
    active.round3_status = Set(r3);
    active.current_round = Set(board.current().number());
    active.updated_at = Set(chrono::Utc::now());

    let model = active.update(&txn).await?;
    txn.commit().await?;

    for deactivated in &transition.deactivated {
        info!(round = deactivated.number(), "Round auto-deactivated");
    }
    info!(
        from = %transition.from,
        current_round = model.current_round,
        "Round status changed"
    );

    Ok(RoundChange {
        hackathon: model,
        transition,
    })
}
