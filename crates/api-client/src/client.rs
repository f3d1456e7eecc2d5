//! Request pipeline and single-flight token refresh
//!
//! The client holds the one pending-refresh slot shared by all concurrent
//! request flows. The first 401 observer with an empty slot creates the
//! shared refresh future; every later observer arriving while it is set
//! attaches to the same handle instead of issuing its own refresh call.
//! When the shared call settles, every waiter sees the same outcome, the
//! slot is cleared so a later expiry can start a fresh cycle, and each
//! waiter replays its own original request with the now-current token.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use futures_util::FutureExt;
use futures_util::future::{BoxFuture, Shared};
use serde::de::DeserializeOwned;
use serde_json::Value;
use session::{AuthData, SessionStore};
use tokio::sync::Mutex;
use tracing::{debug, warn};

use crate::error::{Error, Result};
use crate::navigator::Navigator;
use crate::request::ApiRequest;

/// In-flight refresh shared by every 401 observer in the window.
type RefreshFuture = Shared<BoxFuture<'static, Result<String>>>;

/// Authenticated request client.
///
/// Owns the injected session context: the store, the redirect hook, and
/// the pending-refresh slot. Cheap to share behind an `Arc`; the inner
/// reqwest client is already reference-counted.
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    store: Arc<SessionStore>,
    navigator: Arc<dyn Navigator>,
    /// The single pending-refresh slot, tagged with a generation so a
    /// slow waiter never clears a newer refresh started after its own.
    pending_refresh: Mutex<Option<(u64, RefreshFuture)>>,
    refresh_generation: AtomicU64,
    log_exchanges: bool,
}

impl ApiClient {
    /// Build a client against `base_url` with a fixed per-request timeout.
    pub fn new(
        base_url: impl Into<String>,
        timeout: Duration,
        store: Arc<SessionStore>,
        navigator: Arc<dyn Navigator>,
    ) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| Error::Request {
                message: format!("building http client: {e}"),
            })?;
        let base_url = base_url.into().trim_end_matches('/').to_owned();
        Ok(Self {
            http,
            base_url,
            store,
            navigator,
            pending_refresh: Mutex::new(None),
            refresh_generation: AtomicU64::new(0),
            log_exchanges: false,
        })
    }

    /// Enable request/response debug logging (dev mode).
    pub fn with_request_logging(mut self, enabled: bool) -> Self {
        self.log_exchanges = enabled;
        self
    }

    pub fn store(&self) -> &Arc<SessionStore> {
        &self.store
    }

    /// Perform a request and deserialize the 2xx body into `T`.
    ///
    /// An empty success body deserializes from JSON `null`, so ack-style
    /// endpoints can be consumed as `Value`.
    pub async fn request<T: DeserializeOwned>(&self, req: ApiRequest) -> Result<T> {
        let value = self.execute(req).await?;
        serde_json::from_value(value).map_err(|e| Error::Request {
            message: format!("invalid response body: {e}"),
        })
    }

    /// Run the full response-path state machine for one request.
    ///
    /// At most two transport attempts: the original send, and one replay
    /// after a successful token refresh.
    async fn execute(&self, mut req: ApiRequest) -> Result<Value> {
        let request_id = format!("req_{}", uuid::Uuid::new_v4().as_simple());

        loop {
            let response = self.send(&req, &request_id).await?;
            let status = response.status();

            if status.is_success() {
                let bytes = response.bytes().await.map_err(map_transport_error)?;
                if self.log_exchanges {
                    debug!(request_id, status = status.as_u16(), "response ok");
                }
                if bytes.is_empty() {
                    return Ok(Value::Null);
                }
                return serde_json::from_slice(&bytes).map_err(|e| Error::Request {
                    message: format!("invalid response body: {e}"),
                });
            }

            let code = status.as_u16();
            let body = response.text().await.unwrap_or_default();
            if self.log_exchanges {
                debug!(request_id, status = code, "response error");
            }

            match code {
                401 => {
                    if !req.retried && self.store.has_refresh_token() {
                        req.retried = true;
                        match self.refresh_access_token().await {
                            Ok(_) => {
                                debug!(request_id, "token refreshed, replaying request");
                                continue;
                            }
                            Err(e) => {
                                warn!(request_id, error = %e, "token refresh failed, ending session");
                                self.expire_session();
                                return Err(Error::AuthExpired);
                            }
                        }
                    }
                    // Already replayed once, or nothing to refresh with
                    self.expire_session();
                    return Err(Error::AuthExpired);
                }
                403 => return Err(Error::PermissionDenied),
                404 => return Err(Error::NotFound),
                500 => return Err(Error::Server),
                _ => {
                    return Err(Error::Request {
                        message: server_message(&body)
                            .unwrap_or_else(|| format!("request failed with status {code}")),
                    });
                }
            }
        }
    }

    /// Build and send one transport attempt, attaching the bearer token
    /// if the store holds one.
    async fn send(&self, req: &ApiRequest, request_id: &str) -> Result<reqwest::Response> {
        let url = format!("{}{}", self.base_url, req.path);
        let mut builder = self.http.request(req.method.clone(), &url);

        if let Some(token) = self.store.access_token()
            && !token.is_empty()
        {
            builder = builder.bearer_auth(token);
        }
        if let Some(ref body) = req.body {
            builder = builder.json(body);
        }

        if self.log_exchanges {
            debug!(
                request_id,
                method = %req.method,
                url = %url,
                retried = req.retried,
                "sending request"
            );
        }

        builder.send().await.map_err(map_transport_error)
    }

    /// Single-flight refresh: attach to the pending handle or create it.
    ///
    /// The slot is cleared the moment the shared call settles. The
    /// generation check means only the cycle that was awaited gets
    /// cleared; a newer refresh started in the meantime stays put.
    async fn refresh_access_token(&self) -> Result<String> {
        let (generation, fut) = {
            let mut slot = self.pending_refresh.lock().await;
            match slot.as_ref() {
                Some((generation, pending)) => {
                    debug!("refresh already in flight, attaching");
                    (*generation, pending.clone())
                }
                None => {
                    let generation = self.refresh_generation.fetch_add(1, Ordering::Relaxed);
                    let fut = refresh_call(
                        self.http.clone(),
                        self.base_url.clone(),
                        self.store.clone(),
                    )
                    .boxed()
                    .shared();
                    *slot = Some((generation, fut.clone()));
                    (generation, fut)
                }
            }
        };

        let outcome = fut.await;

        {
            let mut slot = self.pending_refresh.lock().await;
            if slot.as_ref().is_some_and(|(g, _)| *g == generation) {
                *slot = None;
            }
        }

        outcome
    }

    /// Wipe stored credentials and force the shell back to login.
    fn expire_session(&self) {
        if let Err(e) = self.store.clear_auth_data() {
            warn!(error = %e, "failed to clear session store");
        }
        self.navigator.redirect_to_login();
    }
}

/// The actual refresh endpoint call. Owned captures only, so the future
/// can live in the shared slot independent of any one caller.
async fn refresh_call(
    http: reqwest::Client,
    base_url: String,
    store: Arc<SessionStore>,
) -> Result<String> {
    let refresh_token = store
        .refresh_token()
        .filter(|t| !t.is_empty())
        .ok_or(Error::AuthExpired)?;

    let response = http
        .post(format!("{base_url}/api/auth/refresh"))
        .json(&serde_json::json!({ "refreshToken": refresh_token }))
        .send()
        .await
        .map_err(map_transport_error)?;

    let status = response.status();
    if !status.is_success() {
        warn!(status = status.as_u16(), "token refresh rejected");
        return Err(Error::AuthExpired);
    }

    let payload: AuthData = response.json().await.map_err(|e| Error::Request {
        message: format!("invalid refresh response: {e}"),
    })?;

    let access = payload
        .tokens
        .as_ref()
        .and_then(|t| t.access_token.clone())
        .ok_or_else(|| {
            warn!("refresh response carried no access token");
            Error::AuthExpired
        })?;

    if let Err(e) = store.set_auth_data(&payload) {
        warn!(error = %e, "failed to persist refreshed tokens");
    }
    debug!("token refresh succeeded");
    Ok(access)
}

/// All transport-level failures (no response received) normalize to
/// `Connectivity`; the caller never retries these.
fn map_transport_error(e: reqwest::Error) -> Error {
    if e.is_timeout() {
        Error::Connectivity(format!("request timed out: {e}"))
    } else {
        Error::Connectivity(format!("no response from server: {e}"))
    }
}

/// Extract the server-provided message from an error body, if present.
fn server_message(body: &str) -> Option<String> {
    let value: Value = serde_json::from_str(body).ok()?;
    value["error"]
        .as_str()
        .or_else(|| value["message"].as_str())
        .map(str::to_owned)
}
