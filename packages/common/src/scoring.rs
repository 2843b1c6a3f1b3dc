use std::collections::HashMap;

use serde::Serialize;

use crate::round::Round;

pub const MIN_SCORE: f64 = 0.0;
pub const MAX_SCORE: f64 = 10.0;

#[derive(Debug, Clone, Copy, PartialEq, thiserror::Error)]
pub enum ScoreError {
    #[error("Score must be a finite number")]
    NotFinite,
    #[error("Score must be between 0 and 10 (got {0})")]
    OutOfRange(f64),
}

/// Accept a finite score in `[0, 10]`; fractional values are allowed.
pub fn validate_score(score: f64) -> Result<f64, ScoreError> {
    if !score.is_finite() {
        return Err(ScoreError::NotFinite);
    }
    if !(MIN_SCORE..=MAX_SCORE).contains(&score) {
        return Err(ScoreError::OutOfRange(score));
    }
    Ok(score)
}

/// Round half away from zero to two decimals.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// A team as it appears on the leaderboard.
#[derive(Debug, Clone)]
pub struct TeamEntry {
    pub id: i32,
    pub name: String,
    pub theme_name: String,
}

/// One stored evaluation, reduced to what aggregation needs.
#[derive(Debug, Clone, Copy)]
pub struct ScoreEntry {
    pub team_id: i32,
    pub round: Round,
    pub score: f64,
}

/// Aggregated result for one team.
#[derive(Debug, Clone, PartialEq, Serialize, utoipa::ToSchema)]
pub struct Standing {
    /// 1-based position after sorting.
    pub rank: usize,
    pub team_id: i32,
    pub team_name: String,
    pub theme_name: String,
    /// Mean of round 1 scores, `0` when the round has no evaluations.
    pub round1_avg: f64,
    pub round2_avg: f64,
    pub round3_avg: f64,
    pub round1_count: usize,
    pub round2_count: usize,
    pub round3_count: usize,
    /// Sum of the three round averages divided by 3.
    pub overall_avg: f64,
}

#[derive(Default, Clone, Copy)]
struct Tally {
    sum: f64,
    count: usize,
}

impl Tally {
    fn mean(self) -> f64 {
        if self.count == 0 {
            0.0
        } else {
            self.sum / self.count as f64
        }
    }
}

/// Build the ranked leaderboard.
///
/// Every round slot counts toward the overall mean: a round without
/// evaluations contributes `0` and the divisor is always 3. Averages are
/// rounded once, at output. Teams with equal overall averages keep the order
/// they have in `teams`.
pub fn compute_standings(teams: &[TeamEntry], scores: &[ScoreEntry]) -> Vec<Standing> {
    let mut tallies: HashMap<i32, [Tally; 3]> = HashMap::with_capacity(teams.len());
    for entry in scores {
        let slot = &mut tallies.entry(entry.team_id).or_default()[entry.round.number() as usize - 1];
        slot.sum += entry.score;
        slot.count += 1;
    }

    let mut rows: Vec<(f64, Standing)> = teams
        .iter()
        .map(|team| {
            let t = tallies.get(&team.id).copied().unwrap_or_default();
            let avgs = [t[0].mean(), t[1].mean(), t[2].mean()];
            let overall = avgs.iter().sum::<f64>() / 3.0;
            let standing = Standing {
                rank: 0,
                team_id: team.id,
                team_name: team.name.clone(),
                theme_name: team.theme_name.clone(),
                round1_avg: round2(avgs[0]),
                round2_avg: round2(avgs[1]),
                round3_avg: round2(avgs[2]),
                round1_count: t[0].count,
                round2_count: t[1].count,
                round3_count: t[2].count,
                overall_avg: round2(overall),
            };
            (overall, standing)
        })
        .collect();

    // `sort_by` is stable, so ties stay in enumeration order.
    rows.sort_by(|a, b| b.0.total_cmp(&a.0));

    rows.into_iter()
        .enumerate()
        .map(|(i, (_, mut standing))| {
            standing.rank = i + 1;
            standing
        })
        .collect()
}

/// Which rounds have at least one evaluation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, utoipa::ToSchema)]
pub struct RoundCoverage {
    pub round1: bool,
    pub round2: bool,
    pub round3: bool,
}

impl RoundCoverage {
    pub fn from_rounds(rounds: impl IntoIterator<Item = Round>) -> Self {
        let mut coverage = Self::default();
        for round in rounds {
            match round {
                Round::One => coverage.round1 = true,
                Round::Two => coverage.round2 = true,
                Round::Final => coverage.round3 = true,
            }
        }
        coverage
    }
}
