use common::Role;

use super::EngineError;
use crate::entity::{team, user};

/// Who is invoking an engine operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Caller {
    pub user_id: i32,
    pub role: Role,
}

/// A capability an operation requires of its caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Precondition {
    /// Caller holds exactly this role.
    Role(Role),
    /// Caller is an admin or the participant leading the team.
    TeamOwnerOrAdmin { leader_id: i32 },
    /// Caller is the judge assigned to `theme_id`.
    AssignedJudge {
        judge_id: i32,
        judge_theme: Option<i32>,
        theme_id: i32,
    },
}

impl Precondition {
    pub fn owns_team(team: &team::Model) -> Self {
        Self::TeamOwnerOrAdmin {
            leader_id: team.leader_id,
        }
    }

    pub fn judges_theme(judge: &user::Model, theme_id: i32) -> Self {
        Self::AssignedJudge {
            judge_id: judge.id,
            judge_theme: judge.theme_id,
            theme_id,
        }
    }

    pub fn holds(&self, caller: &Caller) -> bool {
        match *self {
            Self::Role(role) => caller.role == role,
            Self::TeamOwnerOrAdmin { leader_id } => {
                caller.role == Role::Admin
                    || (caller.role == Role::Participant && caller.user_id == leader_id)
            }
            Self::AssignedJudge {
                judge_id,
                judge_theme,
                theme_id,
            } => {
                caller.role == Role::Judge
                    && caller.user_id == judge_id
                    && judge_theme == Some(theme_id)
            }
        }
    }

    pub fn check(&self, caller: &Caller) -> Result<(), EngineError> {
        if self.holds(caller) {
            Ok(())
        } else {
            tracing::debug!(?caller, precondition = ?self, "Precondition failed");
            Err(EngineError::Forbidden)
        }
    }
}
