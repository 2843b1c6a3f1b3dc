use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use common::RoundStatus;
use common::scoring::RoundCoverage;
use serde::{Deserialize, Serialize};

use crate::engine::evaluation::{JudgeQueue, NamedEvaluation, NewEvaluation};

#[derive(Deserialize, utoipa::ToSchema)]
pub struct SubmitEvaluationRequest {
    pub team_id: i32,
    /// 1, 2 or 3 (the final).
    #[schema(example = 1)]
    pub round: i32,
    /// 0-10, fractions allowed.
    #[schema(example = 8.5)]
    pub score: f64,
    /// Optional sub-scores by criterion, each 0-10.
    #[schema(example = json!({"innovation": 9, "execution": 8}))]
    pub criteria: Option<BTreeMap<String, f64>>,
    pub feedback: Option<String>,
}

impl From<SubmitEvaluationRequest> for NewEvaluation {
    fn from(req: SubmitEvaluationRequest) -> Self {
        Self {
            team_id: req.team_id,
            round: req.round,
            score: req.score,
            criteria: req.criteria,
            feedback: req.feedback,
        }
    }
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct EvaluationResponse {
    pub id: i32,
    pub team_id: i32,
    pub team_name: String,
    pub judge_id: i32,
    pub judge_name: String,
    pub round: i32,
    pub score: f64,
    #[schema(value_type = Option<Object>)]
    pub criteria: Option<serde_json::Value>,
    pub feedback: String,
    pub created_at: DateTime<Utc>,
}

impl From<NamedEvaluation> for EvaluationResponse {
    fn from(n: NamedEvaluation) -> Self {
        let e = n.evaluation;
        Self {
            id: e.id,
            team_id: e.team_id,
            team_name: n.team_name,
            judge_id: e.judge_id,
            judge_name: n.judge_name,
            round: e.round,
            score: e.score,
            criteria: e.criteria,
            feedback: e.feedback,
            created_at: e.created_at,
        }
    }
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct QueueTeam {
    pub team_id: i32,
    pub team_name: String,
    pub members: Vec<String>,
    /// Already scored by the calling judge in this round.
    pub evaluated: bool,
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct JudgeQueueResponse {
    pub round: i32,
    pub status: RoundStatus,
    pub teams: Vec<QueueTeam>,
}

impl From<JudgeQueue> for JudgeQueueResponse {
    fn from(q: JudgeQueue) -> Self {
        Self {
            round: q.round.number(),
            status: q.status,
            teams: q
                .teams
                .into_iter()
                .map(|entry| QueueTeam {
                    members: entry.team.member_names(),
                    team_id: entry.team.id,
                    team_name: entry.team.name,
                    evaluated: entry.evaluated,
                })
                .collect(),
        }
    }
}

/// Whether each round of the caller's team has been scored. Scores stay hidden.
#[derive(Serialize, utoipa::ToSchema)]
pub struct MyTeamStatusResponse {
    pub team_id: i32,
    pub team_name: String,
    pub round1_evaluated: bool,
    pub round2_evaluated: bool,
    pub round3_evaluated: bool,
}

impl MyTeamStatusResponse {
    pub fn new(team: crate::entity::team::Model, coverage: RoundCoverage) -> Self {
        Self {
            team_id: team.id,
            team_name: team.name,
            round1_evaluated: coverage.round1,
            round2_evaluated: coverage.round2,
            round3_evaluated: coverage.round3,
        }
    }
}
