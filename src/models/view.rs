pub mod account;
pub mod leaderboard;
pub mod task;
