pub mod account_helpers;
pub mod task_helpers;
pub mod test_with_server;
