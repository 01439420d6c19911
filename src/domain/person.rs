//! Person records and import results

use crate::error::AppError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A person to be provisioned as a Keycloak user
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Person {
    pub name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub email: String,
    pub national_id: String,
}

impl Person {
    pub fn new(name: &str, last_name: &str, email: &str, national_id: &str) -> Self {
        Self {
            name: name.to_string(),
            last_name: last_name.to_string(),
            email: email.to_string(),
            national_id: national_id.to_string(),
        }
    }

    /// Username derived from the configured field, `None` when blank
    pub fn username(&self, field: UsernameField) -> Option<&str> {
        let raw = match field {
            UsernameField::Email => &self.email,
            UsernameField::NationalId => &self.national_id,
        };
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed)
        }
    }
}

/// Person field used as the Keycloak username
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum UsernameField {
    #[default]
    Email,
    NationalId,
}

impl FromStr for UsernameField {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "email" => Ok(Self::Email),
            "nationalid" | "national_id" => Ok(Self::NationalId),
            other => Err(AppError::Config(format!(
                "unknown username field '{}': expected 'email' or 'nationalId'",
                other
            ))),
        }
    }
}

impl fmt::Display for UsernameField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Email => write!(f, "email"),
            Self::NationalId => write!(f, "nationalId"),
        }
    }
}

/// Outcome of an idempotent user provisioning call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProvisionResult {
    pub user_id: String,
    /// `false` when the user already existed
    pub created: bool,
}

/// Result of a bulk import run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportSummary {
    pub imported: usize,
    pub skipped: usize,
}
