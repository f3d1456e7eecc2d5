//! Typed wrappers for the authentication endpoints
//!
//! Thin request builders over the descriptor pipeline. Field names on the
//! wire are camelCase per the backend contract. Login feeds the response
//! through the session store; logout ends the local session regardless of
//! what the server says about it.

use serde::Serialize;
use serde_json::Value;
use session::AuthData;
use tracing::warn;

use crate::client::ApiClient;
use crate::error::{Error, Result};
use crate::request::ApiRequest;

/// Login credentials.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
    pub remember_me: bool,
}

impl LoginRequest {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
            remember_me: false,
        }
    }

    pub fn remember_me(mut self, remember: bool) -> Self {
        self.remember_me = remember;
        self
    }
}

/// Admin-initiated account creation.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
    pub role: String,
}

impl RegisterRequest {
    /// Role defaults to `"user"`.
    pub fn new(
        username: impl Into<String>,
        email: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            username: username.into(),
            email: email.into(),
            password: password.into(),
            role: "user".into(),
        }
    }

    pub fn role(mut self, role: impl Into<String>) -> Self {
        self.role = role.into();
        self
    }
}

fn to_body<T: Serialize>(value: &T) -> Result<Value> {
    serde_json::to_value(value).map_err(|e| Error::Request {
        message: format!("serializing request body: {e}"),
    })
}

impl ApiClient {
    /// Log in and store the returned credentials wholesale.
    pub async fn login(&self, login: &LoginRequest) -> Result<AuthData> {
        let data: AuthData = self
            .request(ApiRequest::post("/api/auth/login").json(to_body(login)?))
            .await?;
        if let Err(e) = self.store().set_auth_data(&data) {
            warn!(error = %e, "failed to persist login credentials");
        }
        Ok(data)
    }

    /// Log out. The local session is cleared even if the server call
    /// fails; the server error is still reported to the caller.
    pub async fn logout(&self) -> Result<()> {
        let result: Result<Value> = self.request(ApiRequest::post("/api/auth/logout")).await;
        if let Err(e) = self.store().clear_auth_data() {
            warn!(error = %e, "failed to clear session store on logout");
        }
        result.map(|_| ())
    }

    /// Fetch the current user's profile.
    pub async fn profile(&self) -> Result<Value> {
        self.request(ApiRequest::get("/api/auth/profile")).await
    }

    /// Change the current user's username.
    pub async fn update_username(&self, username: &str) -> Result<Value> {
        self.request(
            ApiRequest::put("/api/auth/username")
                .json(serde_json::json!({ "username": username })),
        )
        .await
    }

    /// Change the current user's password.
    pub async fn update_password(&self, current: &str, new: &str) -> Result<Value> {
        self.request(ApiRequest::put("/api/auth/password").json(serde_json::json!({
            "currentPassword": current,
            "newPassword": new,
        })))
        .await
    }

    /// Create a new account (admin function).
    pub async fn register(&self, registration: &RegisterRequest) -> Result<Value> {
        self.request(ApiRequest::post("/api/auth/register").json(to_body(registration)?))
            .await
    }
}
