//! Wire types shared by the store and the API client
//!
//! `AuthData` mirrors the `{user, tokens}` envelope returned by the login
//! and refresh endpoints. Every field is optional: the refresh endpoint
//! omits `user`, and a token rotation may omit either token. The store
//! applies whatever is present and leaves the rest untouched.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Partial authentication payload consumed by [`crate::SessionStore::set_auth_data`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AuthData {
    /// User profile object. Opaque to the store, persisted as JSON text.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<Value>,
    /// Token pair. Either token may be absent in a partial rotation.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tokens: Option<TokenUpdate>,
}

/// Token fields of an [`AuthData`] payload.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TokenUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub access_token: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn auth_data_deserializes_full_envelope() {
        let json = r#"{"user":{"id":7,"username":"admin"},"tokens":{"accessToken":"at_1","refreshToken":"rt_1"}}"#;
        let data: AuthData = serde_json::from_str(json).unwrap();
        assert_eq!(data.user.unwrap()["username"], "admin");
        let tokens = data.tokens.unwrap();
        assert_eq!(tokens.access_token.as_deref(), Some("at_1"));
        assert_eq!(tokens.refresh_token.as_deref(), Some("rt_1"));
    }

    #[test]
    fn auth_data_deserializes_tokens_only() {
        // Refresh responses carry no user object
        let json = r#"{"tokens":{"accessToken":"at_2","refreshToken":"rt_2"}}"#;
        let data: AuthData = serde_json::from_str(json).unwrap();
        assert!(data.user.is_none());
        assert!(data.tokens.is_some());
    }

    #[test]
    fn auth_data_tolerates_partial_token_pair() {
        let json = r#"{"tokens":{"accessToken":"at_only"}}"#;
        let data: AuthData = serde_json::from_str(json).unwrap();
        let tokens = data.tokens.unwrap();
        assert_eq!(tokens.access_token.as_deref(), Some("at_only"));
        assert!(tokens.refresh_token.is_none());
    }

    #[test]
    fn auth_data_serializes_camel_case() {
        let data = AuthData {
            user: None,
            tokens: Some(TokenUpdate {
                access_token: Some("at".into()),
                refresh_token: Some("rt".into()),
            }),
        };
        let json = serde_json::to_string(&data).unwrap();
        assert!(json.contains("\"accessToken\":\"at\""));
        assert!(json.contains("\"refreshToken\":\"rt\""));
        assert!(!json.contains("user"), "absent user must be omitted: {json}");
    }
}
