pub mod client;
pub mod repositories;
pub mod repository_impl;
pub mod repository_traits;
pub mod surrdb_utils;
