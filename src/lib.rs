pub mod config;
pub mod database;
pub mod entities;
pub mod geo;
pub mod init;
pub mod interfaces;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod utils;
