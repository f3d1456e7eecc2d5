//! Route configuration and the login-gated navigation guard
//!
//! A route table maps paths to metadata (`requires_auth`, page title);
//! unknown paths fall back to the login entry point. The guard decides,
//! per transition, whether to proceed or redirect, consulting only the
//! session store's authentication predicate — it never touches the network.

pub mod guard;
pub mod routes;

pub use guard::{GuardDecision, evaluate};
pub use routes::{
    HOME_PATH, LOGIN_PATH, Resolution, Route, RouteMeta, RouteTable, default_routes, page_title,
};
