//! Data access layer (Repository pattern)

pub mod person;

pub use person::{PersonRepository, StaticPersonRepository};
