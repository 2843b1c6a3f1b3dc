mod common;
mod complaint;
mod evaluation;
mod leaderboard;
mod theme;
