//! Error taxonomy surfaced to the component layer
//!
//! Every transport or protocol failure is normalized into one of these
//! variants at the client boundary. The enum is `Clone` because the
//! single-flight refresh fans the same outcome out to every waiter.

/// Errors surfaced by API requests.
#[derive(Debug, Clone, thiserror::Error)]
pub enum Error {
    /// No response received: connectivity loss or timeout. Never retried.
    #[error("network connection failed: {0}")]
    Connectivity(String),

    /// Session invalid: refresh attempted and failed, or no refresh token
    /// was available. The session store has been cleared and a login
    /// redirect issued before this is returned.
    #[error("session expired, please log in again")]
    AuthExpired,

    #[error("permission denied")]
    PermissionDenied,

    #[error("requested resource not found")]
    NotFound,

    #[error("internal server error")]
    Server,

    /// Any other non-2xx outcome, carrying the server's message if present.
    #[error("request failed: {message}")]
    Request { message: String },
}

/// Result alias for API operations.
pub type Result<T> = std::result::Result<T, Error>;
