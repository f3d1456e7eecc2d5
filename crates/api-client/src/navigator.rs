//! Redirect hook for forced session exits
//!
//! When authentication is irrecoverable the client must send the user
//! back to the login entry point. What "redirect" means belongs to the
//! shell hosting the client, so it is injected behind this trait; tests
//! inject a recording implementation.

/// Receives forced-redirect notifications from the request client.
pub trait Navigator: Send + Sync {
    /// Force the user session back to the login entry point.
    fn redirect_to_login(&self);
}

/// Navigator that ignores redirects. Useful for headless callers that
/// handle `Error::AuthExpired` themselves.
#[derive(Debug, Default)]
pub struct NoopNavigator;

impl Navigator for NoopNavigator {
    fn redirect_to_login(&self) {}
}
