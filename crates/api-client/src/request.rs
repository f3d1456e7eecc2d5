//! Request descriptor
//!
//! Value describing one API call. The `retried` marker is crate-private:
//! only the client sets it, immediately before replaying a request after
//! a token refresh, which caps every request at one refresh cycle.

use reqwest::Method;
use serde_json::Value;

/// One outgoing API request.
#[derive(Debug, Clone)]
pub struct ApiRequest {
    pub method: Method,
    /// Path relative to the configured base URL, e.g. `/api/auth/profile`.
    pub path: String,
    /// JSON body, if any.
    pub body: Option<Value>,
    /// Set by the client before replay after a refresh. A request whose
    /// marker is set never triggers another refresh.
    pub(crate) retried: bool,
}

impl ApiRequest {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            body: None,
            retried: false,
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::POST, path)
    }

    pub fn put(path: impl Into<String>) -> Self {
        Self::new(Method::PUT, path)
    }

    /// Attach a JSON body.
    pub fn json(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }
}
