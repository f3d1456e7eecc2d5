//! Session credential persistence
//!
//! Durable key-value storage for the admin shell's login session: the
//! access token, the refresh token, and the cached user profile. The
//! store survives process restarts via a single JSON file and is the
//! sole authority on whether the user counts as logged in.
//!
//! Credential flow:
//! 1. Login response stored via `SessionStore::set_auth_data()`
//! 2. Every outgoing request reads `SessionStore::access_token()`
//! 3. Token refresh feeds the refresh response back through `set_auth_data()`
//! 4. Logout or an irrecoverable refresh failure calls `clear_auth_data()`
//!
//! All operations are synchronous and non-suspending; callers on async
//! tasks never block on the network here, only on a brief in-process lock.

pub mod error;
pub mod store;
pub mod types;

pub use error::{Error, Result};
pub use store::SessionStore;
pub use types::{AuthData, TokenUpdate};
