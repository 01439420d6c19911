//! kc-provision - bulk user provisioning for Keycloak
//!
//! Reads a fixed list of people and creates (or finds) a Keycloak user for
//! each one, sets a temporary password and the configured required actions.
//! Triggered through `POST /users/bulk-create`.

pub mod api;
pub mod config;
pub mod domain;
pub mod error;
pub mod keycloak;
pub mod repository;
pub mod server;
pub mod service;
pub mod telemetry;

// Re-export commonly used types
pub use config::Config;
pub use error::{AppError, Result};
