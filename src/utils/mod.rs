pub mod file;
pub mod jwt;
