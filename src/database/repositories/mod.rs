pub mod account_repo;
pub mod points_credit_repo;
pub mod task_repo;
