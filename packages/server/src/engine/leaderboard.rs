use std::collections::HashMap;

use common::scoring::{ScoreEntry, Standing, TeamEntry, compute_standings};
use common::{Role, Round};
use sea_orm::*;
use tracing::instrument;

use super::{Caller, EngineError, Precondition};
use crate::entity::{evaluation, team, theme};

/// Rank every team by its overall average. Admin only; computed on each call.
///
/// Teams are enumerated by ascending id so ties always resolve the same way.
#[instrument(skip(db, caller))]
pub async fn compute_leaderboard<C: ConnectionTrait>(
    db: &C,
    caller: &Caller,
) -> Result<Vec<Standing>, EngineError> {
    Precondition::Role(Role::Admin).check(caller)?;

    let theme_names: HashMap<i32, String> = theme::Entity::find()
        .all(db)
        .await?
        .into_iter()
        .map(|t| (t.id, t.name))
        .collect();

    let teams: Vec<TeamEntry> = team::Entity::find()
        .order_by_asc(team::Column::Id)
        .all(db)
        .await?
        .into_iter()
        .map(|t| TeamEntry {
            theme_name: theme_names.get(&t.theme_id).cloned().unwrap_or_default(),
            id: t.id,
            name: t.name,
        })
        .collect();

    let rows: Vec<(i32, i32, f64)> = evaluation::Entity::find()
        .select_only()
        .column(evaluation::Column::TeamId)
        .column(evaluation::Column::Round)
        .column(evaluation::Column::Score)
        .into_tuple()
        .all(db)
        .await?;

    let scores: Vec<ScoreEntry> = rows
        .into_iter()
        .filter_map(|(team_id, round, score)| {
            let round = Round::try_from(round)
                .inspect_err(|e| tracing::warn!(team_id, "Skipping stored evaluation: {e}"))
                .ok()?;
            Some(ScoreEntry {
                team_id,
                round,
                score,
            })
        })
        .collect();

    Ok(compute_standings(&teams, &scores))
}
