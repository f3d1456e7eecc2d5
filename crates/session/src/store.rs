//! File-backed session store
//!
//! Persists three independently addressable entries (`accessToken`,
//! `refreshToken`, `userInfo`) in one JSON file. All writes use atomic
//! temp-file + rename to prevent corruption on crash, and the file is
//! chmod 0600 on unix since it holds live tokens. A std Mutex guards the
//! in-memory copy; every operation completes without suspending.
//!
//! The profile is stored as raw JSON text, not a parsed value. A corrupted
//! entry therefore survives load and only degrades `user_info()` to `None`
//! with a logged diagnostic — it never poisons the tokens next to it.

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::error::{Error, Result};
use crate::types::AuthData;

/// On-disk shape of the session file. Field names match the entries the
/// backend's auth envelope uses, so the file is greppable during debugging.
#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct Entries {
    #[serde(skip_serializing_if = "Option::is_none")]
    access_token: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    refresh_token: Option<String>,
    /// Profile as JSON text. Kept opaque; parsed on read.
    #[serde(skip_serializing_if = "Option::is_none")]
    user_info: Option<String>,
}

/// Thread-safe session file manager.
///
/// Reads clone the in-memory state under a brief lock; writes mutate it and
/// persist synchronously before releasing the lock, so concurrent request
/// flows always observe a consistent token set.
pub struct SessionStore {
    path: PathBuf,
    state: Mutex<Entries>,
}

impl SessionStore {
    /// Load the session from the given file path.
    ///
    /// If the file doesn't exist, creates it empty (cold start: nobody is
    /// logged in). A file that fails to parse is an error — tokens must not
    /// be silently discarded on a read bug.
    pub fn load(path: PathBuf) -> Result<Self> {
        let state = if path.exists() {
            let contents = std::fs::read_to_string(&path)
                .map_err(|e| Error::Io(format!("reading session file: {e}")))?;
            let entries: Entries = serde_json::from_str(&contents)
                .map_err(|e| Error::Parse(format!("parsing session file: {e}")))?;
            info!(path = %path.display(), "loaded session");
            entries
        } else {
            info!(path = %path.display(), "session file not found, starting logged out");
            let entries = Entries::default();
            write_atomic(&path, &entries)?;
            entries
        };

        Ok(Self {
            path,
            state: Mutex::new(state),
        })
    }

    /// Current access token, if any.
    pub fn access_token(&self) -> Option<String> {
        self.lock().access_token.clone()
    }

    /// Store the access token and persist.
    pub fn set_access_token(&self, token: &str) -> Result<()> {
        let mut state = self.lock();
        state.access_token = Some(token.to_owned());
        write_atomic(&self.path, &state)
    }

    /// Current refresh token, if any.
    pub fn refresh_token(&self) -> Option<String> {
        self.lock().refresh_token.clone()
    }

    /// Store the refresh token and persist.
    pub fn set_refresh_token(&self, token: &str) -> Result<()> {
        let mut state = self.lock();
        state.refresh_token = Some(token.to_owned());
        write_atomic(&self.path, &state)
    }

    /// Parsed user profile.
    ///
    /// A corrupted persisted profile is logged and reported as absent;
    /// this never returns an error.
    pub fn user_info(&self) -> Option<Value> {
        let raw = self.lock().user_info.clone()?;
        match serde_json::from_str(&raw) {
            Ok(value) => Some(value),
            Err(e) => {
                warn!(error = %e, "stored user profile is not valid JSON, treating as absent");
                None
            }
        }
    }

    /// Serialize and store the user profile.
    pub fn set_user_info(&self, profile: &Value) -> Result<()> {
        let raw = serde_json::to_string(profile)
            .map_err(|e| Error::Parse(format!("serializing user profile: {e}")))?;
        let mut state = self.lock();
        state.user_info = Some(raw);
        write_atomic(&self.path, &state)
    }

    /// Apply a partial authentication payload.
    ///
    /// Writes only the fields present in `data`; an absent field leaves the
    /// stored value untouched. Single lock, single persist, so a login or
    /// refresh lands as one atomic file update.
    pub fn set_auth_data(&self, data: &AuthData) -> Result<()> {
        let mut state = self.lock();
        if let Some(ref user) = data.user {
            state.user_info = Some(
                serde_json::to_string(user)
                    .map_err(|e| Error::Parse(format!("serializing user profile: {e}")))?,
            );
        }
        if let Some(ref tokens) = data.tokens {
            if let Some(ref access) = tokens.access_token {
                state.access_token = Some(access.clone());
            }
            if let Some(ref refresh) = tokens.refresh_token {
                state.refresh_token = Some(refresh.clone());
            }
        }
        debug!("applied auth data");
        write_atomic(&self.path, &state)
    }

    /// Remove all three entries unconditionally. Idempotent.
    pub fn clear_auth_data(&self) -> Result<()> {
        let mut state = self.lock();
        state.access_token = None;
        state.refresh_token = None;
        state.user_info = None;
        debug!("cleared auth data");
        write_atomic(&self.path, &state)
    }

    /// Whether a non-empty access token is stored. This is the sole
    /// authentication predicate; token contents are never inspected.
    pub fn is_authenticated(&self) -> bool {
        self.lock()
            .access_token
            .as_deref()
            .is_some_and(|t| !t.is_empty())
    }

    /// Whether a non-empty refresh token is stored.
    pub fn has_refresh_token(&self) -> bool {
        self.lock()
            .refresh_token
            .as_deref()
            .is_some_and(|t| !t.is_empty())
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Entries> {
        // A poisoned lock only means a panicking thread held it; the entries
        // themselves are always in a consistent state.
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

// Tokens must not leak through Debug-formatted state dumps.
impl fmt::Debug for SessionStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.lock();
        f.debug_struct("SessionStore")
            .field("path", &self.path)
            .field("access_token", &state.access_token.as_ref().map(|_| "[REDACTED]"))
            .field("refresh_token", &state.refresh_token.as_ref().map(|_| "[REDACTED]"))
            .field("user_info", &state.user_info.is_some())
            .finish()
    }
}

/// Write the session to a file atomically.
///
/// Writes to a temporary file in the same directory, then renames it over
/// the target. File permissions are set to 0600 (owner read/write only)
/// since the file contains live tokens.
fn write_atomic(path: &Path, entries: &Entries) -> Result<()> {
    let json = serde_json::to_string_pretty(entries)
        .map_err(|e| Error::Parse(format!("serializing session: {e}")))?;

    let dir = path
        .parent()
        .ok_or_else(|| Error::Io("session path has no parent directory".into()))?;

    let tmp_path = dir.join(format!(".session.tmp.{}", std::process::id()));

    std::fs::write(&tmp_path, json.as_bytes())
        .map_err(|e| Error::Io(format!("writing temp session file: {e}")))?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let perms = std::fs::Permissions::from_mode(0o600);
        std::fs::set_permissions(&tmp_path, perms)
            .map_err(|e| Error::Io(format!("setting session file permissions: {e}")))?;
    }

    std::fs::rename(&tmp_path, path)
        .map_err(|e| Error::Io(format!("renaming temp session file: {e}")))?;

    debug!(path = %path.display(), "persisted session");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::TokenUpdate;

    fn test_store(dir: &tempfile::TempDir) -> SessionStore {
        SessionStore::load(dir.path().join("session.json")).unwrap()
    }

    fn full_auth_data() -> AuthData {
        AuthData {
            user: Some(serde_json::json!({"id": 1, "username": "admin"})),
            tokens: Some(TokenUpdate {
                access_token: Some("at_1".into()),
                refresh_token: Some("rt_1".into()),
            }),
        }
    }

    #[test]
    fn roundtrip_save_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");

        let store = SessionStore::load(path.clone()).unwrap();
        store.set_auth_data(&full_auth_data()).unwrap();

        // Load into a new store instance — the session survives a restart
        let store2 = SessionStore::load(path).unwrap();
        assert_eq!(store2.access_token().as_deref(), Some("at_1"));
        assert_eq!(store2.refresh_token().as_deref(), Some("rt_1"));
        assert_eq!(store2.user_info().unwrap()["username"], "admin");
        assert!(store2.is_authenticated());
    }

    #[test]
    fn cold_start_creates_empty_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");

        assert!(!path.exists());
        let store = SessionStore::load(path.clone()).unwrap();
        assert!(path.exists());
        assert!(!store.is_authenticated());
        assert!(!store.has_refresh_token());
        assert!(store.user_info().is_none());
    }

    #[test]
    fn partial_update_preserves_untouched_fields() {
        let dir = tempfile::tempdir().unwrap();
        let store = test_store(&dir);
        store.set_auth_data(&full_auth_data()).unwrap();

        // Rotate only the access token
        store
            .set_auth_data(&AuthData {
                user: None,
                tokens: Some(TokenUpdate {
                    access_token: Some("at_2".into()),
                    refresh_token: None,
                }),
            })
            .unwrap();

        assert_eq!(store.access_token().as_deref(), Some("at_2"));
        assert_eq!(
            store.refresh_token().as_deref(),
            Some("rt_1"),
            "absent refreshToken must leave the stored value untouched"
        );
        assert_eq!(store.user_info().unwrap()["username"], "admin");
    }

    #[test]
    fn clear_auth_data_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let store = test_store(&dir);
        store.set_auth_data(&full_auth_data()).unwrap();

        store.clear_auth_data().unwrap();
        assert!(!store.is_authenticated());
        assert!(!store.has_refresh_token());
        assert!(store.user_info().is_none());

        // Clearing an already-empty store must not fail
        store.clear_auth_data().unwrap();
        assert!(!store.is_authenticated());
    }

    #[test]
    fn malformed_user_info_returns_none_without_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");
        std::fs::write(
            &path,
            r#"{"accessToken":"at_ok","userInfo":"{not valid json"}"#,
        )
        .unwrap();

        let store = SessionStore::load(path).unwrap();
        assert!(store.user_info().is_none());
        // The tokens beside the corrupted profile are unaffected
        assert_eq!(store.access_token().as_deref(), Some("at_ok"));
        assert!(store.is_authenticated());
    }

    #[test]
    fn empty_access_token_is_not_authenticated() {
        let dir = tempfile::tempdir().unwrap();
        let store = test_store(&dir);
        store.set_access_token("").unwrap();
        assert!(!store.is_authenticated());

        store.set_refresh_token("").unwrap();
        assert!(!store.has_refresh_token());
    }

    #[test]
    fn individual_setters_persist() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");
        let store = SessionStore::load(path.clone()).unwrap();

        store.set_access_token("at_solo").unwrap();
        store.set_refresh_token("rt_solo").unwrap();
        store
            .set_user_info(&serde_json::json!({"id": 9}))
            .unwrap();

        let store2 = SessionStore::load(path).unwrap();
        assert_eq!(store2.access_token().as_deref(), Some("at_solo"));
        assert_eq!(store2.refresh_token().as_deref(), Some("rt_solo"));
        assert_eq!(store2.user_info().unwrap()["id"], 9);
    }

    #[test]
    fn stale_refresh_token_without_access_token() {
        // The two tokens are independently nullable: a refresh token may
        // exist with no access token, and the predicates disagree.
        let dir = tempfile::tempdir().unwrap();
        let store = test_store(&dir);
        store.set_refresh_token("rt_stale").unwrap();

        assert!(!store.is_authenticated());
        assert!(store.has_refresh_token());
    }

    #[test]
    fn corrupt_session_file_is_a_load_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");
        std::fs::write(&path, "not json at all {{").unwrap();

        let result = SessionStore::load(path);
        assert!(matches!(result, Err(Error::Parse(_))));
    }

    #[cfg(unix)]
    #[test]
    fn file_permissions_are_0600() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");
        let store = SessionStore::load(path.clone()).unwrap();
        store.set_access_token("at_perm").unwrap();

        let metadata = std::fs::metadata(&path).unwrap();
        let mode = metadata.permissions().mode() & 0o777;
        assert_eq!(mode, 0o600, "session file must be 0600, got {mode:o}");
    }

    #[test]
    fn debug_output_redacts_tokens() {
        let dir = tempfile::tempdir().unwrap();
        let store = test_store(&dir);
        store.set_access_token("at_secret_value").unwrap();
        store.set_refresh_token("rt_secret_value").unwrap();

        let debug = format!("{store:?}");
        assert!(!debug.contains("at_secret_value"), "got: {debug}");
        assert!(!debug.contains("rt_secret_value"), "got: {debug}");
        assert!(debug.contains("[REDACTED]"));
    }
}
