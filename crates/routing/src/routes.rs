//! Route table and metadata

/// Login entry point. The guard and the API client both redirect here.
pub const LOGIN_PATH: &str = "/login";

/// Authenticated landing page.
pub const HOME_PATH: &str = "/";

/// Per-route metadata consulted by the guard and the title bar.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RouteMeta {
    /// Page title, composed with the application title by [`page_title`].
    pub title: Option<String>,
    /// Whether the route is behind the login gate.
    pub requires_auth: bool,
}

/// A configured route.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Route {
    pub path: String,
    pub name: Option<String>,
    pub meta: RouteMeta,
}

/// Ordered route table with a catch-all fallback.
///
/// Resolution is exact-path: the first route whose path equals the target
/// wins. Anything unmatched resolves to the fallback redirect target.
#[derive(Debug, Clone)]
pub struct RouteTable {
    routes: Vec<Route>,
    fallback: String,
}

/// Outcome of resolving a path against the table.
#[derive(Debug, Clone, PartialEq)]
pub enum Resolution<'a> {
    Matched(&'a Route),
    /// Unknown path; navigate to the fallback target instead.
    Fallback(&'a str),
}

impl RouteTable {
    pub fn new(routes: Vec<Route>, fallback: impl Into<String>) -> Self {
        Self {
            routes,
            fallback: fallback.into(),
        }
    }

    /// Resolve a target path to a configured route or the fallback.
    pub fn resolve(&self, path: &str) -> Resolution<'_> {
        match self.routes.iter().find(|r| r.path == path) {
            Some(route) => Resolution::Matched(route),
            None => Resolution::Fallback(&self.fallback),
        }
    }

    pub fn routes(&self) -> &[Route] {
        &self.routes
    }
}

/// The admin shell's route table: a public login page, an authenticated
/// home page, and a catch-all that sends unknown paths to login.
pub fn default_routes() -> RouteTable {
    RouteTable::new(
        vec![
            Route {
                path: LOGIN_PATH.into(),
                name: Some("Login".into()),
                meta: RouteMeta {
                    title: Some("Login".into()),
                    requires_auth: false,
                },
            },
            Route {
                path: HOME_PATH.into(),
                name: Some("Home".into()),
                meta: RouteMeta {
                    title: Some("Home".into()),
                    requires_auth: true,
                },
            },
        ],
        LOGIN_PATH,
    )
}

/// Compose the window title for a route: `"<route title> - <app title>"`,
/// or the application title alone when the route carries none.
pub fn page_title(route: &Route, app_title: &str) -> String {
    match route.meta.title {
        Some(ref title) => format!("{title} - {app_title}"),
        None => app_title.to_owned(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolve_matches_exact_path() {
        let table = default_routes();
        match table.resolve("/login") {
            Resolution::Matched(route) => {
                assert!(!route.meta.requires_auth);
                assert_eq!(route.name.as_deref(), Some("Login"));
            }
            other => panic!("expected match, got {other:?}"),
        }
    }

    #[test]
    fn unknown_path_falls_back_to_login() {
        let table = default_routes();
        assert_eq!(
            table.resolve("/no/such/page"),
            Resolution::Fallback(LOGIN_PATH)
        );
    }

    #[test]
    fn home_requires_auth() {
        let table = default_routes();
        match table.resolve("/") {
            Resolution::Matched(route) => assert!(route.meta.requires_auth),
            other => panic!("expected match, got {other:?}"),
        }
    }

    #[test]
    fn page_title_composes_with_app_title() {
        let table = default_routes();
        let Resolution::Matched(login) = table.resolve("/login") else {
            panic!("login route missing");
        };
        assert_eq!(page_title(login, "Admin Console"), "Login - Admin Console");
    }

    #[test]
    fn page_title_without_route_title_uses_app_title() {
        let route = Route {
            path: "/bare".into(),
            name: None,
            meta: RouteMeta::default(),
        };
        assert_eq!(page_title(&route, "Admin Console"), "Admin Console");
    }
}
