pub mod account_service;
pub mod claim_coordinator;
pub mod leaderboard_service;
pub mod points_ledger;
pub mod task_service;
