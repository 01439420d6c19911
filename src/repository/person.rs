//! Person repository

use crate::domain::Person;
use crate::error::{AppError, Result};
use async_trait::async_trait;
use std::path::Path;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PersonRepository: Send + Sync {
    /// All people to import, in import order
    async fn list(&self) -> Result<Vec<Person>>;
}

/// Fixed, in-memory list of people
#[derive(Debug, Clone, Default)]
pub struct StaticPersonRepository {
    people: Vec<Person>,
}

impl StaticPersonRepository {
    pub fn new(people: Vec<Person>) -> Self {
        Self { people }
    }

    /// The built-in sample directory
    pub fn builtin() -> Self {
        Self::new(vec![
            Person::new("Ana", "Silva", "ana.silva@example.com", "12345678"),
            Person::new("Bruno", "Costa", "bruno.costa@example.com", "23456789"),
            Person::new("Carla", "Mendes", "carla.mendes@example.com", "34567890"),
            Person::new("Diego", "Rocha", "diego.rocha@example.com", "45678901"),
            Person::new("Elena", "Ferreira", "elena.ferreira@example.com", "56789012"),
        ])
    }

    /// Load a JSON array of people from disk
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path).map_err(|e| {
            AppError::Config(format!("Failed to read {}: {}", path.display(), e))
        })?;
        Self::from_json_str(&raw)
            .map_err(|e| AppError::Config(format!("{} in {}", e, path.display())))
    }

    pub fn from_json_str(raw: &str) -> Result<Self> {
        let people: Vec<Person> = serde_json::from_str(raw)
            .map_err(|e| AppError::Config(format!("Invalid people JSON: {}", e)))?;
        Ok(Self::new(people))
    }

    pub fn len(&self) -> usize {
        self.people.len()
    }

    pub fn is_empty(&self) -> bool {
        self.people.is_empty()
    }
}

#[async_trait]
impl PersonRepository for StaticPersonRepository {
    async fn list(&self) -> Result<Vec<Person>> {
        Ok(self.people.clone())
    }
}
