pub mod auth;
pub mod complaint;
pub mod evaluation;
pub mod hackathon;
pub mod judge;
pub mod leaderboard;
pub mod team;
pub mod theme;
