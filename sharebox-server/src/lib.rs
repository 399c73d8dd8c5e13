//! sharebox-server: HTTP API over the sharebox file services

pub mod config;
pub mod error;
pub mod middleware;
pub mod routes;
pub mod state;
