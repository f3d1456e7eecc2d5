//! Admin shell CLI
//!
//! Command-line front end for the admin backend:
//! 1. Loads configuration (TOML file + env overlay)
//! 2. Opens the persistent session store
//! 3. Builds the authenticated API client
//! 4. Dispatches one command against the auth API or the route table

mod config;

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result, bail};
use api_client::{ApiClient, LoginRequest, Navigator, RegisterRequest};
use common::Secret;
use routing::{GuardDecision, LOGIN_PATH, Resolution, default_routes, evaluate, page_title};
use session::SessionStore;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::config::Config;

/// Navigator for a headless shell: the "redirect" is a logged prompt to
/// run `login` again.
struct ShellNavigator;

impl Navigator for ShellNavigator {
    fn redirect_to_login(&self) {
        warn!(target_path = LOGIN_PATH, "session ended, log in again");
    }
}

/// Split `--config <path>` out of the raw arguments, returning the config
/// path (if given) and the remaining command tokens.
fn split_cli(args: Vec<String>) -> (Option<String>, Vec<String>) {
    let mut config_path = None;
    let mut rest = Vec::new();
    let mut iter = args.into_iter();
    while let Some(arg) = iter.next() {
        if arg == "--config" {
            config_path = iter.next();
        } else {
            rest.push(arg);
        }
    }
    (config_path, rest)
}

fn usage() -> &'static str {
    "usage: admin-shell [--config <path>] <command>\n\
     commands:\n\
       login <username> <password> [--remember]\n\
       logout\n\
       profile\n\
       whoami\n\
       set-username <username>\n\
       set-password <current> <new>\n\
       register <username> <email> <password> [role]\n\
       open <path>"
}

#[tokio::main]
async fn main() -> Result<()> {
    let (cli_config_path, command) = split_cli(std::env::args().skip(1).collect());

    let config_path = Config::resolve_path(cli_config_path.as_deref());
    let config = Config::load(&config_path)
        .with_context(|| format!("failed to load config from {}", config_path.display()))?;

    let default_level = if config.dev_mode { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .init();

    info!(
        base_url = %config.api.base_url,
        session_file = %config.session_file.display(),
        dev_mode = config.dev_mode,
        "configuration loaded"
    );

    let store = Arc::new(
        SessionStore::load(config.session_file.clone())
            .context("failed to open session store")?,
    );
    let client = ApiClient::new(
        &config.api.base_url,
        Duration::from_secs(config.api.timeout_secs),
        store.clone(),
        Arc::new(ShellNavigator),
    )
    .context("failed to build API client")?
    .with_request_logging(config.dev_mode);

    match command.first().map(String::as_str) {
        Some("login") => {
            let [_, username, password, flags @ ..] = command.as_slice() else {
                bail!("login needs <username> <password>\n{}", usage());
            };
            let password: Secret<String> = password.clone().into();
            let remember = flags.iter().any(|f| f == "--remember");
            let login = LoginRequest::new(username.as_str(), password.expose().as_str())
                .remember_me(remember);
            let data = client.login(&login).await?;
            let who = data
                .user
                .as_ref()
                .and_then(|u| u["username"].as_str())
                .unwrap_or(username);
            println!("logged in as {who}");
        }
        Some("logout") => {
            client.logout().await?;
            println!("logged out");
        }
        Some("profile") => {
            let profile = client.profile().await?;
            println!("{}", serde_json::to_string_pretty(&profile)?);
        }
        Some("whoami") => match store.user_info() {
            Some(user) => println!("{}", serde_json::to_string_pretty(&user)?),
            None => println!("not logged in"),
        },
        Some("set-username") => {
            let [_, username] = command.as_slice() else {
                bail!("set-username needs <username>\n{}", usage());
            };
            client.update_username(username).await?;
            println!("username updated");
        }
        Some("set-password") => {
            let [_, current, new] = command.as_slice() else {
                bail!("set-password needs <current> <new>\n{}", usage());
            };
            let current: Secret<String> = current.clone().into();
            let new: Secret<String> = new.clone().into();
            client
                .update_password(current.expose(), new.expose())
                .await?;
            println!("password updated");
        }
        Some("register") => {
            let [_, username, email, password, role @ ..] = command.as_slice() else {
                bail!("register needs <username> <email> <password> [role]\n{}", usage());
            };
            let password: Secret<String> = password.clone().into();
            let mut registration =
                RegisterRequest::new(username.as_str(), email.as_str(), password.expose().as_str());
            if let Some(role) = role.first() {
                registration = registration.role(role.as_str());
            }
            let created = client.register(&registration).await?;
            println!("{}", serde_json::to_string_pretty(&created)?);
        }
        Some("open") => {
            let [_, path] = command.as_slice() else {
                bail!("open needs <path>\n{}", usage());
            };
            let table = default_routes();
            match table.resolve(path) {
                Resolution::Matched(route) => match evaluate(route, &store) {
                    GuardDecision::Proceed => {
                        println!("{}", page_title(route, &config.app_title));
                        println!("navigated to {}", route.path);
                    }
                    GuardDecision::Redirect(to) => println!("redirected to {to}"),
                },
                Resolution::Fallback(to) => println!("redirected to {to}"),
            }
        }
        _ => bail!("{}", usage()),
    }

    Ok(())
}
