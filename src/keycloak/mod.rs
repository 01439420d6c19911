//! Keycloak Admin API integration

mod client;
mod token;
mod types;

pub use client::{CreateOutcome, KeycloakClient};
pub use token::{AdminSession, TokenCache};
pub use types::{CreateKeycloakUserInput, KeycloakCredential, KeycloakUser, KeycloakUserUpdate};
