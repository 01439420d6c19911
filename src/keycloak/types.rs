//! Keycloak type definitions
//!
//! Wire shapes for the subset of the Keycloak Admin API used here.

use serde::{Deserialize, Serialize};

/// Keycloak user representation (as returned by the users search)
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KeycloakUser {
    pub id: Option<String>,
    pub username: String,
    pub email: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    #[serde(default)]
    pub enabled: bool,
    #[serde(default)]
    pub email_verified: bool,
    #[serde(default)]
    pub required_actions: Vec<String>,
}

/// Input for creating a user in Keycloak
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateKeycloakUserInput {
    pub username: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub enabled: bool,
    pub email_verified: bool,
}

/// Partial user update; only required actions are ever changed here
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct KeycloakUserUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub required_actions: Option<Vec<String>>,
}

/// Credential body for `reset-password`
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct KeycloakCredential {
    #[serde(rename = "type")]
    pub credential_type: String,
    pub value: String,
    pub temporary: bool,
}

impl KeycloakCredential {
    pub fn temporary_password(value: &str) -> Self {
        Self {
            credential_type: "password".to_string(),
            value: value.to_string(),
            temporary: true,
        }
    }
}

/// Token endpoint response
#[derive(Debug, Deserialize)]
pub(crate) struct TokenResponse {
    pub access_token: String,
    pub expires_in: i64,
}

/// Error body returned by the admin API.
///
/// Keycloak is inconsistent about which key it uses, so all are optional.
#[derive(Debug, Default, Deserialize)]
pub(crate) struct KeycloakErrorBody {
    pub error: Option<String>,
    pub error_description: Option<String>,
    #[serde(rename = "errorMessage")]
    pub error_message: Option<String>,
}

impl KeycloakErrorBody {
    /// Best human-readable message from a raw error body
    pub fn message_from(body: &str) -> String {
        let parsed: KeycloakErrorBody = serde_json::from_str(body).unwrap_or_default();
        parsed
            .error_description
            .or(parsed.error_message)
            .or(parsed.error)
            .unwrap_or_else(|| body.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_user_input_serialization() {
        let input = CreateKeycloakUserInput {
            username: "ana@example.com".to_string(),
            email: Some("ana@example.com".to_string()),
            first_name: Some("Ana".to_string()),
            last_name: Some("Silva".to_string()),
            enabled: true,
            email_verified: false,
        };

        let json = serde_json::to_value(&input).unwrap();
        assert_eq!(json["username"], "ana@example.com");
        assert_eq!(json["firstName"], "Ana");
        assert_eq!(json["lastName"], "Silva");
        assert_eq!(json["enabled"], true);
        assert_eq!(json["emailVerified"], false);
    }

    #[test]
    fn test_create_user_input_omits_missing_email() {
        let input = CreateKeycloakUserInput {
            username: "12345678".to_string(),
            email: None,
            first_name: Some("Ana".to_string()),
            last_name: None,
            enabled: true,
            email_verified: false,
        };

        let json = serde_json::to_string(&input).unwrap();
        assert!(!json.contains("\"email\""));
    }

    #[test]
    fn test_keycloak_user_deserialization_minimal() {
        let json = r#"{"id": "u-1", "username": "ana@example.com"}"#;
        let user: KeycloakUser = serde_json::from_str(json).unwrap();
        assert_eq!(user.id.as_deref(), Some("u-1"));
        assert!(!user.enabled);
        assert!(user.required_actions.is_empty());
    }

    #[test]
    fn test_user_update_with_required_actions() {
        let update = KeycloakUserUpdate {
            required_actions: Some(vec!["UPDATE_PASSWORD".to_string()]),
        };
        let json = serde_json::to_string(&update).unwrap();
        assert_eq!(json, r#"{"requiredActions":["UPDATE_PASSWORD"]}"#);
    }

    #[test]
    fn test_temporary_password_credential() {
        let json = serde_json::to_value(KeycloakCredential::temporary_password("12345678")).unwrap();
        assert_eq!(json["type"], "password");
        assert_eq!(json["value"], "12345678");
        assert_eq!(json["temporary"], true);
    }

    #[test]
    fn test_error_message_preference() {
        assert_eq!(
            KeycloakErrorBody::message_from(
                r#"{"error":"invalidPasswordMinLengthMessage","error_description":"Invalid password: minimum length 12."}"#
            ),
            "Invalid password: minimum length 12."
        );
        assert_eq!(
            KeycloakErrorBody::message_from(r#"{"errorMessage":"User exists with same username"}"#),
            "User exists with same username"
        );
        assert_eq!(
            KeycloakErrorBody::message_from(r#"{"error":"unknown_error"}"#),
            "unknown_error"
        );
        assert_eq!(KeycloakErrorBody::message_from("plain text"), "plain text");
    }
}
