//! Authenticated API client for the admin shell
//!
//! Wraps a reqwest transport with the session-aware request pipeline:
//! bearer injection on the way out, error-taxonomy normalization on the
//! way back, and transparent single-flight token refresh on 401. The
//! shared state (session store, pending-refresh slot, redirect hook) is
//! injected at construction so tests get fully isolated instances.
//!
//! Request flow:
//! 1. `ApiRequest` descriptor built by a typed wrapper in `auth`
//! 2. `ApiClient::request()` attaches the bearer token and sends
//! 3. 401 with a refresh token enters the single-flight refresh protocol
//! 4. On refresh success the original request is replayed exactly once
//! 5. On refresh failure the session is cleared and the navigator is told
//!    to redirect to the login entry point

pub mod auth;
pub mod client;
pub mod error;
pub mod navigator;
pub mod request;

pub use auth::{LoginRequest, RegisterRequest};
pub use client::ApiClient;
pub use error::{Error, Result};
pub use navigator::{Navigator, NoopNavigator};
pub use request::ApiRequest;
