#[cfg(feature = "sea-orm")]
use sea_orm::prelude::StringLen;

use serde::{Deserialize, Serialize};
use std::fmt;

/// One of the three evaluation phases. Round 3 is the final.
///
/// Serialized as its number (`1`, `2`, `3`).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "i32", into = "i32")]
pub enum Round {
    One,
    Two,
    Final,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("Round must be 1, 2 or 3 (got {0})")]
pub struct InvalidRound(pub i32);

impl Round {
    pub const ALL: [Round; 3] = [Self::One, Self::Two, Self::Final];

    pub fn number(self) -> i32 {
        match self {
            Self::One => 1,
            Self::Two => 2,
            Self::Final => 3,
        }
    }

    fn index(self) -> usize {
        self.number() as usize - 1
    }

    /// Whether teams must flag themselves ready before judges see them.
    /// The final round has no gate: every team of a theme is eligible.
    pub fn has_readiness_gate(self) -> bool {
        !matches!(self, Self::Final)
    }
}

impl TryFrom<i32> for Round {
    type Error = InvalidRound;

    fn try_from(value: i32) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(Self::One),
            2 => Ok(Self::Two),
            3 => Ok(Self::Final),
            other => Err(InvalidRound(other)),
        }
    }
}

impl From<Round> for i32 {
    fn from(round: Round) -> Self {
        round.number()
    }
}

impl fmt::Display for Round {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.number())
    }
}

/// Lifecycle status of a single round slot.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, utoipa::ToSchema)]
#[cfg_attr(
    feature = "sea-orm",
    derive(sea_orm::DeriveActiveEnum, sea_orm::EnumIter),
    sea_orm(rs_type = "String", db_type = "String(StringLen::None)")
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RoundStatus {
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "LOCKED"))]
    Locked,
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "ACTIVE"))]
    Active,
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "COMPLETED"))]
    Completed,
}

impl RoundStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Locked => "LOCKED",
            Self::Active => "ACTIVE",
            Self::Completed => "COMPLETED",
        }
    }
}

impl fmt::Display for RoundStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How strictly round transitions are sequenced.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RoundPolicy {
    /// Any transition is accepted; activating a round still deactivates the others.
    #[default]
    Permissive,
    /// Only `LOCKED -> ACTIVE` and `ACTIVE -> COMPLETED` may be requested.
    Sequential,
}

impl RoundPolicy {
    fn allows(self, from: RoundStatus, to: RoundStatus) -> bool {
        match self {
            Self::Permissive => true,
            Self::Sequential => matches!(
                (from, to),
                (RoundStatus::Locked, RoundStatus::Active)
                    | (RoundStatus::Active, RoundStatus::Completed)
            ),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TransitionError {
    #[error("Round {round} cannot move from {from} to {to}")]
    NotAllowed {
        round: Round,
        from: RoundStatus,
        to: RoundStatus,
    },
}

/// Outcome of a successful [`RoundBoard::transition`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transition {
    pub round: Round,
    pub from: RoundStatus,
    pub to: RoundStatus,
    /// Rounds forced back to `LOCKED` because another round was activated.
    pub deactivated: Vec<Round>,
}

impl Transition {
    pub fn is_noop(&self) -> bool {
        self.from == self.to && self.deactivated.is_empty()
    }
}

/// Status of all three round slots plus the current round pointer.
///
/// At most one slot is `ACTIVE` after any transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoundBoard {
    statuses: [RoundStatus; 3],
    current: Round,
}

impl RoundBoard {
    pub fn new(statuses: [RoundStatus; 3], current: Round) -> Self {
        Self { statuses, current }
    }

    pub fn status(&self, round: Round) -> RoundStatus {
        self.statuses[round.index()]
    }

    pub fn statuses(&self) -> [RoundStatus; 3] {
        self.statuses
    }

    pub fn current(&self) -> Round {
        self.current
    }

    /// The round currently open for judging, if any.
    pub fn active(&self) -> Option<Round> {
        Round::ALL
            .into_iter()
            .find(|r| self.status(*r) == RoundStatus::Active)
    }

    /// Whether `round` is both the current round and `ACTIVE`.
    pub fn is_live(&self, round: Round) -> bool {
        self.current == round && self.status(round) == RoundStatus::Active
    }

    /// Apply `round := to` under `policy`.
    ///
    /// Activating a round first forces every other active round to `LOCKED`
    /// and moves the current-round pointer. Requesting the status a round
    /// already has is a no-op under every policy.
    pub fn transition(
        &mut self,
        round: Round,
        to: RoundStatus,
        policy: RoundPolicy,
    ) -> Result<Transition, TransitionError> {
        let from = self.status(round);
        if from != to && !policy.allows(from, to) {
            return Err(TransitionError::NotAllowed { round, from, to });
        }

        let mut deactivated = Vec::new();
        if to == RoundStatus::Active {
            for other in Round::ALL {
                if other != round && self.status(other) == RoundStatus::Active {
                    self.statuses[other.index()] = RoundStatus::Locked;
                    deactivated.push(other);
                }
            }
            self.current = round;
        }
        self.statuses[round.index()] = to;

        Ok(Transition {
            round,
            from,
            to,
            deactivated,
        })
    }
}

impl Default for RoundBoard {
    fn default() -> Self {
        Self::new([RoundStatus::Locked; 3], Round::One)
    }
}

/// Per-round readiness flags of a team. Only rounds 1 and 2 carry one.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
pub struct Readiness {
    pub round1: bool,
    pub round2: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("Readiness does not apply to round {0}")]
pub struct NoReadinessGate(pub Round);

impl Readiness {
    /// `None` means "not applicable", which is distinct from "not ready".
    pub fn get(&self, round: Round) -> Option<bool> {
        match round {
            Round::One => Some(self.round1),
            Round::Two => Some(self.round2),
            Round::Final => None,
        }
    }

    pub fn set(&mut self, round: Round, ready: bool) -> Result<(), NoReadinessGate> {
        match round {
            Round::One => self.round1 = ready,
            Round::Two => self.round2 = ready,
            Round::Final => return Err(NoReadinessGate(round)),
        }
        Ok(())
    }

    /// Whether a team with these flags is in the judging queue for `round`.
    pub fn is_eligible(&self, round: Round) -> bool {
        self.get(round).unwrap_or(true)
    }
}
