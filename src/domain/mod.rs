//! Domain models

pub mod person;

pub use person::{ImportSummary, Person, ProvisionResult, UsernameField};
