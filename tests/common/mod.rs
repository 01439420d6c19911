//! Shared test infrastructure
//!
//! `MockKeycloakServer` is a wiremock-based stand-in for the Keycloak Admin
//! API, so client and handler tests run without a real Keycloak instance.

#![allow(dead_code)]

use kc_provision::config::{Config, ImportConfig, KeycloakConfig};
use serde_json::{json, Value};
use wiremock::matchers::{body_string_contains, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const REALM: &str = "people";
pub const TOKEN_PATH: &str = "/realms/master/protocol/openid-connect/token";
pub const USERS_PATH: &str = "/admin/realms/people/users";

pub fn keycloak_config(base_url: &str) -> KeycloakConfig {
    KeycloakConfig {
        url: base_url.to_string(),
        admin_realm: "master".to_string(),
        realm: REALM.to_string(),
        admin_client_id: "admin-cli".to_string(),
        admin_client_secret: String::new(),
        admin_username: "admin".to_string(),
        admin_password: "admin".to_string(),
        token_safety_margin_secs: 10,
        request_timeout_secs: 5,
    }
}

pub fn test_config(base_url: &str, import: ImportConfig) -> Config {
    Config {
        http_host: "127.0.0.1".to_string(),
        http_port: 0,
        log_format: "text".to_string(),
        keycloak: keycloak_config(base_url),
        import,
    }
}

/// Mock Keycloak server for testing
pub struct MockKeycloakServer {
    server: MockServer,
}

impl MockKeycloakServer {
    /// Start a server with no mocks mounted
    pub async fn bare() -> Self {
        Self {
            server: MockServer::start().await,
        }
    }

    /// Start a server with a token endpoint issuing 5-minute tokens
    pub async fn new() -> Self {
        let mock = Self::bare().await;
        mock.mock_token(300, None).await;
        mock
    }

    pub fn uri(&self) -> String {
        self.server.uri()
    }

    pub fn server(&self) -> &MockServer {
        &self.server
    }

    /// Token endpoint; `expect` asserts the number of logins on drop
    pub async fn mock_token(&self, expires_in: i64, expect: Option<u64>) {
        let mut mock = Mock::given(method("POST"))
            .and(path(TOKEN_PATH))
            .and(body_string_contains("grant_type=password"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "access_token": "mock-token",
                "expires_in": expires_in,
                "token_type": "Bearer"
            })));
        if let Some(n) = expect {
            mock = mock.expect(n);
        }
        mock.mount(&self.server).await;
    }

    pub async fn mock_token_failure(&self, status: u16) {
        Mock::given(method("POST"))
            .and(path(TOKEN_PATH))
            .respond_with(ResponseTemplate::new(status).set_body_json(json!({
                "error": "invalid_grant",
                "error_description": "Invalid user credentials"
            })))
            .mount(&self.server)
            .await;
    }

    /// User search by exact username returning `users`
    pub async fn mock_search(&self, username: &str, users: Value) {
        Mock::given(method("GET"))
            .and(path(USERS_PATH))
            .and(query_param("username", username))
            .and(query_param("exact", "true"))
            .respond_with(ResponseTemplate::new(200).set_body_json(users))
            .mount(&self.server)
            .await;
    }

    /// User search that answers `users` once, then falls through to later mocks
    pub async fn mock_search_once(&self, username: &str, users: Value) {
        Mock::given(method("GET"))
            .and(path(USERS_PATH))
            .and(query_param("username", username))
            .respond_with(ResponseTemplate::new(200).set_body_json(users))
            .up_to_n_times(1)
            .mount(&self.server)
            .await;
    }

    pub async fn mock_create_created(&self, user_id: &str, expect: u64) {
        let location = format!("{}{}/{}", self.server.uri(), USERS_PATH, user_id);
        Mock::given(method("POST"))
            .and(path(USERS_PATH))
            .respond_with(ResponseTemplate::new(201).append_header("Location", location))
            .expect(expect)
            .mount(&self.server)
            .await;
    }

    pub async fn mock_create_status(&self, status: u16, body: Value) {
        Mock::given(method("POST"))
            .and(path(USERS_PATH))
            .respond_with(ResponseTemplate::new(status).set_body_json(body))
            .mount(&self.server)
            .await;
    }

    pub async fn mock_reset_password(&self, user_id: &str, expect: u64) {
        Mock::given(method("PUT"))
            .and(path(format!("{}/{}/reset-password", USERS_PATH, user_id)))
            .respond_with(ResponseTemplate::new(204))
            .expect(expect)
            .mount(&self.server)
            .await;
    }

    pub async fn mock_reset_password_error(&self, user_id: &str, status: u16, body: Value) {
        Mock::given(method("PUT"))
            .and(path(format!("{}/{}/reset-password", USERS_PATH, user_id)))
            .respond_with(ResponseTemplate::new(status).set_body_json(body))
            .mount(&self.server)
            .await;
    }

    pub async fn mock_update_user(&self, user_id: &str, status: u16, expect: u64) {
        Mock::given(method("PUT"))
            .and(path(format!("{}/{}", USERS_PATH, user_id)))
            .respond_with(ResponseTemplate::new(status))
            .expect(expect)
            .mount(&self.server)
            .await;
    }
}

pub fn user_json(id: &str, username: &str) -> Value {
    json!({
        "id": id,
        "username": username,
        "enabled": true,
        "emailVerified": false
    })
}
