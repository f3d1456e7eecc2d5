//! Login-gated navigation guard
//!
//! Pure function of the target route's metadata and the session store's
//! authentication predicate. Decision table:
//!
//! | requires_auth | authenticated | target is /login | decision        |
//! |---------------|---------------|------------------|-----------------|
//! | yes           | yes           | yes              | redirect home   |
//! | yes           | yes           | no               | proceed         |
//! | yes           | no            | —                | redirect login  |
//! | no            | yes           | yes              | redirect home   |
//! | no            | —             | otherwise        | proceed         |

use session::SessionStore;
use tracing::debug;

use crate::routes::{HOME_PATH, LOGIN_PATH, Route};

/// Terminal decision for a route transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardDecision {
    Proceed,
    Redirect(String),
}

/// Evaluate a transition to `to` against the current session.
pub fn evaluate(to: &Route, store: &SessionStore) -> GuardDecision {
    let authenticated = store.is_authenticated();
    let to_login = to.path == LOGIN_PATH;

    if to.meta.requires_auth {
        if authenticated {
            if to_login {
                // Logged-in user landing on the login page goes home
                GuardDecision::Redirect(HOME_PATH.into())
            } else {
                GuardDecision::Proceed
            }
        } else {
            debug!(path = %to.path, "unauthenticated, redirecting to login");
            GuardDecision::Redirect(LOGIN_PATH.into())
        }
    } else if authenticated && to_login {
        GuardDecision::Redirect(HOME_PATH.into())
    } else {
        GuardDecision::Proceed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::routes::RouteMeta;
    use session::{AuthData, TokenUpdate};

    fn logged_in_store(dir: &tempfile::TempDir) -> SessionStore {
        let store = SessionStore::load(dir.path().join("session.json")).unwrap();
        store
            .set_auth_data(&AuthData {
                user: None,
                tokens: Some(TokenUpdate {
                    access_token: Some("at_guard".into()),
                    refresh_token: Some("rt_guard".into()),
                }),
            })
            .unwrap();
        store
    }

    fn logged_out_store(dir: &tempfile::TempDir) -> SessionStore {
        SessionStore::load(dir.path().join("session.json")).unwrap()
    }

    fn route(path: &str, requires_auth: bool) -> Route {
        Route {
            path: path.into(),
            name: None,
            meta: RouteMeta {
                title: None,
                requires_auth,
            },
        }
    }

    #[test]
    fn protected_route_without_token_redirects_to_login() {
        let dir = tempfile::tempdir().unwrap();
        let store = logged_out_store(&dir);
        assert_eq!(
            evaluate(&route("/", true), &store),
            GuardDecision::Redirect(LOGIN_PATH.into())
        );
    }

    #[test]
    fn protected_route_with_token_proceeds() {
        let dir = tempfile::tempdir().unwrap();
        let store = logged_in_store(&dir);
        assert_eq!(evaluate(&route("/", true), &store), GuardDecision::Proceed);
    }

    #[test]
    fn authenticated_visit_to_login_redirects_home() {
        let dir = tempfile::tempdir().unwrap();
        let store = logged_in_store(&dir);
        // Both auth-gated and public flavors of the login route redirect home
        assert_eq!(
            evaluate(&route("/login", false), &store),
            GuardDecision::Redirect(HOME_PATH.into())
        );
        assert_eq!(
            evaluate(&route("/login", true), &store),
            GuardDecision::Redirect(HOME_PATH.into())
        );
    }

    #[test]
    fn public_route_proceeds_regardless_of_session() {
        let dir = tempfile::tempdir().unwrap();
        let store = logged_out_store(&dir);
        assert_eq!(
            evaluate(&route("/login", false), &store),
            GuardDecision::Proceed
        );
        assert_eq!(
            evaluate(&route("/about", false), &store),
            GuardDecision::Proceed
        );

        let dir2 = tempfile::tempdir().unwrap();
        let store2 = logged_in_store(&dir2);
        assert_eq!(
            evaluate(&route("/about", false), &store2),
            GuardDecision::Proceed
        );
    }

    #[test]
    fn empty_access_token_counts_as_logged_out() {
        let dir = tempfile::tempdir().unwrap();
        let store = logged_out_store(&dir);
        store.set_access_token("").unwrap();
        assert_eq!(
            evaluate(&route("/", true), &store),
            GuardDecision::Redirect(LOGIN_PATH.into())
        );
    }
}
