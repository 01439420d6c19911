//! Keycloak Admin API client

use super::token::{AdminSession, TokenCache};
use super::types::{
    CreateKeycloakUserInput, KeycloakCredential, KeycloakErrorBody, KeycloakUser,
    KeycloakUserUpdate, TokenResponse,
};
use crate::config::KeycloakConfig;
use crate::domain::ProvisionResult;
use crate::error::{AppError, Result};
use reqwest::{Client, Response, StatusCode};
use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Keycloak Admin API client
#[derive(Clone)]
pub struct KeycloakClient {
    config: KeycloakConfig,
    http_client: Client,
    token: Arc<TokenCache>,
}

/// Result of a single create call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CreateOutcome {
    /// 201, with the id taken from the `Location` header
    Created(String),
    /// 409, someone else created the username first
    Conflict,
}

impl KeycloakClient {
    /// Create a new Keycloak client
    pub fn new(config: KeycloakConfig) -> Result<Self> {
        let http_client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()?;

        let token = Arc::new(TokenCache::new(config.token_safety_margin_secs));

        Ok(Self {
            config,
            http_client,
            token,
        })
    }

    fn users_url(&self) -> String {
        format!(
            "{}/admin/realms/{}/users",
            self.config.url, self.config.realm
        )
    }

    /// Get admin access token (with caching)
    async fn get_admin_token(&self) -> Result<String> {
        self.token.get_or_refresh(|| self.fetch_admin_token()).await
    }

    /// Password grant against the admin realm
    async fn fetch_admin_token(&self) -> Result<AdminSession> {
        let token_url = format!(
            "{}/realms/{}/protocol/openid-connect/token",
            self.config.url, self.config.admin_realm
        );

        let mut params = vec![
            ("grant_type", "password"),
            ("client_id", self.config.admin_client_id.as_str()),
            ("username", self.config.admin_username.as_str()),
            ("password", self.config.admin_password.as_str()),
        ];

        if !self.config.admin_client_secret.is_empty() {
            params.push(("client_secret", self.config.admin_client_secret.as_str()));
        }

        let response = self.http_client.post(&token_url).form(&params).send().await?;

        if !response.status().is_success() {
            let (status, body) = status_and_body(response).await;
            return Err(AppError::Auth(format!(
                "Failed to get admin token: {} - {}",
                status, body
            )));
        }

        let token_response: TokenResponse = response
            .json()
            .await
            .map_err(|e| AppError::Auth(format!("Failed to parse token response: {}", e)))?;

        info!(
            expires_in = token_response.expires_in,
            "Obtained Keycloak admin token"
        );

        AdminSession::from_expires_in(token_response.access_token, token_response.expires_in)
    }

    /// Drop the cached token when the API says it is no longer accepted
    async fn note_unauthorized(&self, status: StatusCode) {
        if status == StatusCode::UNAUTHORIZED {
            warn!("Keycloak rejected the admin token, discarding it");
            self.token.invalidate().await;
        }
    }

    // ============================================================================
    // User Management
    // ============================================================================

    /// Search users by exact username
    pub async fn search_users_by_username(&self, username: &str) -> Result<Vec<KeycloakUser>> {
        let token = self.get_admin_token().await?;

        let response = self
            .http_client
            .get(self.users_url())
            .bearer_auth(&token)
            .query(&[("username", username), ("exact", "true")])
            .send()
            .await?;

        if !response.status().is_success() {
            let (status, body) = status_and_body(response).await;
            self.note_unauthorized(status).await;
            return Err(AppError::Provision(format!(
                "Failed to search users: {} - {}",
                status, body
            )));
        }

        let users: Vec<KeycloakUser> = response
            .json()
            .await
            .map_err(|e| AppError::Provision(format!("Failed to parse users: {}", e)))?;

        Ok(users)
    }

    /// Create a user in Keycloak
    pub async fn create_user(&self, input: &CreateKeycloakUserInput) -> Result<CreateOutcome> {
        let token = self.get_admin_token().await?;

        let response = self
            .http_client
            .post(self.users_url())
            .bearer_auth(&token)
            .json(input)
            .send()
            .await?;

        if response.status() == StatusCode::CONFLICT {
            return Ok(CreateOutcome::Conflict);
        }

        if !response.status().is_success() {
            let (status, body) = status_and_body(response).await;
            self.note_unauthorized(status).await;
            return Err(AppError::Provision(format!(
                "Failed to create user: {} - {}",
                status, body
            )));
        }

        // Get user ID from Location header
        let user_id = response
            .headers()
            .get("location")
            .and_then(|v| v.to_str().ok())
            .and_then(|location| location.trim_end_matches('/').rsplit('/').next())
            .filter(|id| !id.is_empty())
            .ok_or_else(|| {
                AppError::Provision("Missing or invalid location header".to_string())
            })?;

        Ok(CreateOutcome::Created(user_id.to_string()))
    }

    /// Find a user by username, creating it when absent.
    ///
    /// A 409 from the create call means another writer won the race; the
    /// user is looked up again and reported as pre-existing.
    pub async fn provision_user(
        &self,
        username: &str,
        first_name: &str,
        last_name: &str,
        email: &str,
    ) -> Result<ProvisionResult> {
        if let Some(user_id) = self.find_user_id(username).await? {
            debug!(username, user_id = %user_id, "User already exists");
            return Ok(ProvisionResult {
                user_id,
                created: false,
            });
        }

        let input = CreateKeycloakUserInput {
            username: username.to_string(),
            email: non_blank(email),
            first_name: non_blank(first_name),
            last_name: non_blank(last_name),
            enabled: true,
            email_verified: false,
        };

        match self.create_user(&input).await? {
            CreateOutcome::Created(user_id) => {
                info!(username, user_id = %user_id, "Created Keycloak user");
                Ok(ProvisionResult {
                    user_id,
                    created: true,
                })
            }
            CreateOutcome::Conflict => {
                warn!(username, "User created concurrently, looking it up again");
                let user_id = self.find_user_id(username).await?.ok_or_else(|| {
                    AppError::Provision("user vanished after conflict".to_string())
                })?;
                Ok(ProvisionResult {
                    user_id,
                    created: false,
                })
            }
        }
    }

    async fn find_user_id(&self, username: &str) -> Result<Option<String>> {
        let users = self.search_users_by_username(username).await?;
        match users.into_iter().next() {
            Some(user) => user
                .id
                .map(Some)
                .ok_or_else(|| AppError::Provision("User id missing in Keycloak response".to_string())),
            None => Ok(None),
        }
    }

    /// Update a user
    pub async fn update_user(&self, user_id: &str, input: &KeycloakUserUpdate) -> Result<()> {
        let token = self.get_admin_token().await?;
        let url = format!("{}/{}", self.users_url(), user_id);

        let response = self
            .http_client
            .put(&url)
            .bearer_auth(&token)
            .json(input)
            .send()
            .await?;

        if !response.status().is_success() {
            let (status, body) = status_and_body(response).await;
            self.note_unauthorized(status).await;
            return Err(AppError::Update(format!(
                "Failed to update user {}: {} - {}",
                user_id, status, body
            )));
        }

        Ok(())
    }

    /// Replace the user's required actions with `actions`
    pub async fn add_required_actions(
        &self,
        user_id: &str,
        actions: &BTreeSet<String>,
    ) -> Result<()> {
        let update = KeycloakUserUpdate {
            required_actions: Some(actions.iter().cloned().collect()),
        };
        self.update_user(user_id, &update).await
    }

    // ============================================================================
    // Password Management
    // ============================================================================

    /// Reset a user's password.
    ///
    /// Keycloak answers a password-policy violation with 400; that case is
    /// reported as [`AppError::PasswordRejected`] so callers can tell it apart.
    pub async fn reset_user_password(
        &self,
        user_id: &str,
        credential: &KeycloakCredential,
    ) -> Result<()> {
        let token = self.get_admin_token().await?;
        let url = format!("{}/{}/reset-password", self.users_url(), user_id);

        let response = self
            .http_client
            .put(&url)
            .bearer_auth(&token)
            .json(credential)
            .send()
            .await?;

        if response.status() == StatusCode::BAD_REQUEST {
            let (_, body) = status_and_body(response).await;
            return Err(AppError::PasswordRejected(KeycloakErrorBody::message_from(
                &body,
            )));
        }

        if !response.status().is_success() {
            let (status, body) = status_and_body(response).await;
            self.note_unauthorized(status).await;
            return Err(AppError::Update(format!(
                "Failed to reset password for {}: {} - {}",
                user_id, status, body
            )));
        }

        Ok(())
    }

    /// Set a password the user must change on next login
    pub async fn set_temporary_password(&self, user_id: &str, password: &str) -> Result<()> {
        self.reset_user_password(user_id, &KeycloakCredential::temporary_password(password))
            .await
    }
}

async fn status_and_body(response: Response) -> (StatusCode, String) {
    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    (status, body)
}

fn non_blank(value: &str) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}
