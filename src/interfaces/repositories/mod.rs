pub mod account_ifce;
pub mod points_ledger_ifce;
pub mod task_ifce;
