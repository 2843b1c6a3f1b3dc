use common::scoring::Standing;
use serde::Serialize;

#[derive(Serialize, utoipa::ToSchema)]
pub struct LeaderboardResponse {
    pub standings: Vec<Standing>,
    pub generated_at: chrono::DateTime<chrono::Utc>,
}
