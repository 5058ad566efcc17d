pub mod accounts;
pub mod images;
pub mod leaderboard;
pub mod tasks;
