//! Configuration management for kc-provision

use crate::domain::UsernameField;
use anyhow::{bail, Context, Result};
use std::collections::BTreeSet;
use std::env;
use std::path::PathBuf;

/// Upper bound for the admin token safety margin (one day)
const MAX_TOKEN_SAFETY_MARGIN_SECS: i64 = 86_400;

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// HTTP server host
    pub http_host: String,
    /// HTTP server port
    pub http_port: u16,
    /// Log output format: "text" or "json"
    pub log_format: String,
    /// Keycloak configuration
    pub keycloak: KeycloakConfig,
    /// Bulk import configuration
    pub import: ImportConfig,
}

#[derive(Clone)]
pub struct KeycloakConfig {
    /// Base URL for server-to-server communication (e.g., http://keycloak:8080)
    pub url: String,
    /// Realm the admin account logs into
    pub admin_realm: String,
    /// Realm users are provisioned into
    pub realm: String,
    pub admin_client_id: String,
    /// Only sent when non-empty (confidential admin clients)
    pub admin_client_secret: String,
    pub admin_username: String,
    pub admin_password: String,
    /// Tokens are treated as expired this many seconds early
    pub token_safety_margin_secs: i64,
    pub request_timeout_secs: u64,
}

impl std::fmt::Debug for KeycloakConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeycloakConfig")
            .field("url", &self.url)
            .field("admin_realm", &self.admin_realm)
            .field("realm", &self.realm)
            .field("admin_client_id", &self.admin_client_id)
            .field("admin_client_secret", &"<redacted>")
            .field("admin_username", &self.admin_username)
            .field("admin_password", &"<redacted>")
            .field("token_safety_margin_secs", &self.token_safety_margin_secs)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .finish()
    }
}

#[derive(Debug, Clone)]
pub struct ImportConfig {
    /// Which person field becomes the Keycloak username
    pub username_field: UsernameField,
    /// Required actions set on every imported user (replaces existing ones)
    pub required_actions: BTreeSet<String>,
    /// Optional JSON file replacing the built-in person list
    pub people_file: Option<PathBuf>,
}

impl Default for ImportConfig {
    fn default() -> Self {
        Self {
            username_field: UsernameField::Email,
            required_actions: default_required_actions(),
            people_file: None,
        }
    }
}

pub fn default_required_actions() -> BTreeSet<String> {
    BTreeSet::from(["UPDATE_PASSWORD".to_string()])
}

/// Parse a comma-separated list of required actions, ignoring blanks.
pub fn parse_required_actions(raw: &str) -> BTreeSet<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration from an arbitrary key lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var_or = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());

        let url = var_or("KEYCLOAK_URL", "http://localhost:8081");
        url::Url::parse(&url).with_context(|| format!("Invalid KEYCLOAK_URL: {}", url))?;

        let log_format = var_or("LOG_FORMAT", "text");
        if log_format != "text" && log_format != "json" {
            bail!("Invalid LOG_FORMAT '{}': expected 'text' or 'json'", log_format);
        }

        let token_safety_margin_secs: i64 = var_or("KEYCLOAK_TOKEN_SAFETY_MARGIN_SECS", "10")
            .parse()
            .context("Invalid KEYCLOAK_TOKEN_SAFETY_MARGIN_SECS")?;
        if !(0..=MAX_TOKEN_SAFETY_MARGIN_SECS).contains(&token_safety_margin_secs) {
            bail!(
                "Invalid KEYCLOAK_TOKEN_SAFETY_MARGIN_SECS '{}': expected 0 to {}",
                token_safety_margin_secs,
                MAX_TOKEN_SAFETY_MARGIN_SECS
            );
        }

        let required_actions = match lookup("IMPORT_REQUIRED_ACTIONS") {
            Some(raw) => parse_required_actions(&raw),
            None => default_required_actions(),
        };

        Ok(Self {
            http_host: var_or("HTTP_HOST", "0.0.0.0"),
            http_port: var_or("HTTP_PORT", "8080")
                .parse()
                .context("Invalid HTTP_PORT")?,
            log_format,
            keycloak: KeycloakConfig {
                url: url.trim_end_matches('/').to_string(),
                admin_realm: var_or("KEYCLOAK_ADMIN_REALM", "master"),
                realm: lookup("KEYCLOAK_REALM").context("KEYCLOAK_REALM is required")?,
                admin_client_id: var_or("KEYCLOAK_ADMIN_CLIENT_ID", "admin-cli"),
                admin_client_secret: var_or("KEYCLOAK_ADMIN_CLIENT_SECRET", ""),
                admin_username: lookup("KEYCLOAK_ADMIN").context("KEYCLOAK_ADMIN is required")?,
                admin_password: lookup("KEYCLOAK_ADMIN_PASSWORD")
                    .context("KEYCLOAK_ADMIN_PASSWORD is required")?,
                token_safety_margin_secs,
                request_timeout_secs: var_or("KEYCLOAK_REQUEST_TIMEOUT_SECS", "30")
                    .parse()
                    .context("Invalid KEYCLOAK_REQUEST_TIMEOUT_SECS")?,
            },
            import: ImportConfig {
                username_field: var_or("IMPORT_USERNAME_FIELD", "email")
                    .parse()
                    .context("Invalid IMPORT_USERNAME_FIELD")?,
                required_actions,
                people_file: lookup("IMPORT_PEOPLE_FILE").map(PathBuf::from),
            },
        })
    }

    /// Get HTTP server address
    pub fn http_addr(&self) -> String {
        format!("{}:{}", self.http_host, self.http_port)
    }
}
