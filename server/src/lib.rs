//! HTTP backend of the users CRUD demo.
//!
//! Every endpoint answers `200 OK` with an [`ApiResponse`](unistate::users::ApiResponse) envelope.

pub mod config;
pub mod db;
pub mod error;
pub mod local;
pub mod routes;
pub mod service;
pub mod validate;

use tracing_subscriber::EnvFilter;

/// Installs a fmt subscriber filtered by `RUST_LOG`, or by `default_filter` if it is unset.
pub fn init_tracing(default_filter: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_level(true)
        .init();
}
