pub mod account;
pub mod points_credit;
pub mod task;
