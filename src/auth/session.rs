//! Session lifecycle management.
//!
//! The `SessionManager` owns the authentication token and its expiry: it
//! gates access to the dashboard, mediates login and logout, and forces a
//! return to the login screen when the cached expiry passes. Session state
//! lives behind an injected [`SessionStore`] as three entries - token,
//! email, and a string-encoded epoch-millisecond expiry - which are always
//! written and cleared as a unit.

use anyhow::Result;
use chrono::{Duration, Utc};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::api::{ApiClient, ApiError};

use super::claims;
use super::store::{SessionStore, KEY_EMAIL, KEY_EXPIRY, KEY_TOKEN};

/// Role claim required to use the dashboard. Checked client-side as a
/// defense-in-depth re-verification of what the server already enforced.
const ADMIN_ROLE: &str = "ADMIN";

/// Fallback session lifetime in hours, applied when the token carries no
/// `exp` claim of its own.
const DEFAULT_SESSION_HOURS: i64 = 24;

/// Where the caller should navigate after a session transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Navigation {
    /// The authenticated dashboard.
    ProtectedArea,
    /// The login screen.
    EntryPoint,
}

#[derive(Error, Debug)]
pub enum AuthError {
    /// Missing required login input; detected before any network call.
    #[error("{0}")]
    Validation(String),

    /// The backend rejected the credentials or returned a failure envelope.
    #[error("{0}")]
    Authentication(String),

    /// Credentials were valid but the token failed local decode or the
    /// role claim is not admin. No session state is persisted.
    #[error("{0}")]
    Authorization(String),

    /// The network call itself failed.
    #[error("Network error: {0}")]
    Transport(String),

    /// The session store could not be read or written.
    #[error("Session storage error: {0}")]
    Storage(#[from] anyhow::Error),
}

pub struct SessionManager<S: SessionStore> {
    store: S,
}

impl<S: SessionStore> SessionManager<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Reject blank credentials locally. Runs before any network call.
    pub fn validate_credentials(email: &str, password: &str) -> Result<(), AuthError> {
        if email.trim().is_empty() || password.trim().is_empty() {
            return Err(AuthError::Validation(
                "Email and password are required".to_string(),
            ));
        }
        Ok(())
    }

    /// Authenticate against the backend and establish a session.
    pub async fn login(
        &mut self,
        api: &ApiClient,
        email: &str,
        password: &str,
    ) -> Result<Navigation, AuthError> {
        Self::validate_credentials(email, password)?;

        let login = api
            .login(email, password)
            .await
            .map_err(Self::map_login_error)?;

        self.establish(&login.token, &login.email)
    }

    /// Classify a login API failure. Network failures become transport
    /// errors; everything else, including a falsy envelope carrying the
    /// server's message, is an authentication failure.
    fn map_login_error(e: ApiError) -> AuthError {
        match e {
            ApiError::NetworkError(err) => AuthError::Transport(err.to_string()),
            ApiError::Rejected(msg) => AuthError::Authentication(msg),
            other => AuthError::Authentication(other.to_string()),
        }
    }

    /// Validate a freshly issued token and persist the session.
    ///
    /// The role claim is re-checked locally even though the server already
    /// enforced it; a token that fails decode or carries a non-admin role
    /// is discarded without persisting anything.
    pub fn establish(&mut self, token: &str, email: &str) -> Result<Navigation, AuthError> {
        let claims = claims::decode(token).map_err(|e| {
            debug!(error = %e, "Token claims decode failed");
            AuthError::Authorization("Only admins may sign in to this dashboard".to_string())
        })?;

        if claims.role.as_deref() != Some(ADMIN_ROLE) {
            warn!(role = ?claims.role, "Non-admin token rejected");
            return Err(AuthError::Authorization(
                "Only admins may sign in to this dashboard".to_string(),
            ));
        }

        // The exp claim comes from an unverified payload, so the multiply
        // must not be able to overflow
        let expiry_ms = match claims.exp {
            Some(exp_secs) => exp_secs.saturating_mul(1000),
            None => Utc::now().timestamp_millis()
                + Duration::hours(DEFAULT_SESSION_HOURS).num_milliseconds(),
        };

        self.persist(token, email, expiry_ms)?;
        info!(email, expiry_ms, "Session established");
        Ok(Navigation::ProtectedArea)
    }

    /// Write the three session entries in fixed order. The underlying store
    /// is not transactional, so a failed write rolls back by clearing all
    /// entries - partial state must never be left behind.
    fn persist(&mut self, token: &str, email: &str, expiry_ms: i64) -> Result<(), AuthError> {
        let result = self
            .store
            .put(KEY_TOKEN, token)
            .and_then(|_| self.store.put(KEY_EMAIL, email))
            .and_then(|_| self.store.put(KEY_EXPIRY, &expiry_ms.to_string()));

        if let Err(e) = result {
            warn!(error = %e, "Session write failed, rolling back");
            self.clear_all();
            return Err(AuthError::Storage(e));
        }
        Ok(())
    }

    /// Check whether the cached session has expired.
    ///
    /// Returns `Some(Navigation::EntryPoint)` when the session was
    /// invalidated and the caller must show the login screen; `None` when
    /// nothing changed. A token without an expiry entry is partial state
    /// and is cleared defensively.
    pub fn check_validity(&mut self) -> Result<Option<Navigation>> {
        let token = self.store.get(KEY_TOKEN)?;
        if token.is_none() {
            return Ok(None);
        }

        let expiry_ms = match self.store.get(KEY_EXPIRY)? {
            Some(raw) => match raw.parse::<i64>() {
                Ok(ms) => ms,
                Err(_) => {
                    warn!(raw, "Unparseable session expiry, clearing session");
                    self.clear_all();
                    return Ok(Some(Navigation::EntryPoint));
                }
            },
            None => {
                warn!("Session token present without expiry, clearing session");
                self.clear_all();
                return Ok(Some(Navigation::EntryPoint));
            }
        };

        if Utc::now().timestamp_millis() > expiry_ms {
            info!("Session expired, clearing session");
            self.clear_all();
            return Ok(Some(Navigation::EntryPoint));
        }

        Ok(None)
    }

    /// Clear the session unconditionally. Always succeeds.
    pub fn logout(&mut self) -> Navigation {
        info!("Logging out");
        self.clear_all();
        Navigation::EntryPoint
    }

    /// True when a token and an unexpired expiry are both present.
    pub fn is_authenticated(&self) -> bool {
        let token = self.store.get(KEY_TOKEN).ok().flatten();
        let expiry = self
            .store
            .get(KEY_EXPIRY)
            .ok()
            .flatten()
            .and_then(|raw| raw.parse::<i64>().ok());

        match (token, expiry) {
            (Some(_), Some(expiry_ms)) => Utc::now().timestamp_millis() < expiry_ms,
            _ => false,
        }
    }

    /// The raw session token, if one is stored.
    pub fn token(&self) -> Option<String> {
        self.store.get(KEY_TOKEN).ok().flatten()
    }

    /// The cached administrator email, for display only.
    pub fn email(&self) -> Option<String> {
        self.store.get(KEY_EMAIL).ok().flatten()
    }

    /// Remove all three entries together. Removal errors are logged and
    /// swallowed; each entry is still attempted so a single bad entry
    /// cannot keep the others alive.
    fn clear_all(&mut self) {
        for key in [KEY_TOKEN, KEY_EMAIL, KEY_EXPIRY] {
            if let Err(e) = self.store.remove(key) {
                warn!(key, error = %e, "Failed to remove session entry");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::claims::encode_for_test;
    use crate::auth::store::MemorySessionStore;

    fn admin_token(exp_secs: Option<i64>) -> String {
        let mut payload = serde_json::json!({ "role": "ADMIN", "email": "admin@x.com" });
        if let Some(exp) = exp_secs {
            payload["exp"] = serde_json::json!(exp);
        }
        encode_for_test(&payload)
    }

    fn future_exp_secs() -> i64 {
        Utc::now().timestamp() + 3600
    }

    #[test]
    fn test_blank_credentials_rejected_before_network() {
        let err = SessionManager::<MemorySessionStore>::validate_credentials("", "secret")
            .unwrap_err();
        assert!(matches!(err, AuthError::Validation(_)));

        let err = SessionManager::<MemorySessionStore>::validate_credentials("admin@x.com", "  ")
            .unwrap_err();
        assert!(matches!(err, AuthError::Validation(_)));

        SessionManager::<MemorySessionStore>::validate_credentials("admin@x.com", "secret")
            .unwrap();
    }

    #[test]
    fn test_establish_admin_persists_all_fields() {
        let mut manager = SessionManager::new(MemorySessionStore::new());
        let exp = future_exp_secs();

        let nav = manager.establish(&admin_token(Some(exp)), "admin@x.com").unwrap();

        assert_eq!(nav, Navigation::ProtectedArea);
        assert_eq!(manager.token(), Some(admin_token(Some(exp))));
        assert_eq!(manager.email().as_deref(), Some("admin@x.com"));
        assert_eq!(
            manager.store.get(KEY_EXPIRY).unwrap().as_deref(),
            Some((exp * 1000).to_string().as_str())
        );
        assert!(manager.is_authenticated());
    }

    #[test]
    fn test_establish_non_admin_persists_nothing() {
        let mut manager = SessionManager::new(MemorySessionStore::new());
        let token = encode_for_test(&serde_json::json!({ "role": "USER" }));

        let err = manager.establish(&token, "user@x.com").unwrap_err();

        assert!(matches!(err, AuthError::Authorization(_)));
        assert!(manager.store.is_empty());
        assert!(!manager.is_authenticated());
    }

    #[test]
    fn test_establish_malformed_token_persists_nothing() {
        let mut manager = SessionManager::new(MemorySessionStore::new());

        let err = manager.establish("not-a-token", "admin@x.com").unwrap_err();

        assert!(matches!(err, AuthError::Authorization(_)));
        assert!(manager.store.is_empty());
    }

    #[test]
    fn test_login_rejection_maps_to_authentication_with_server_message() {
        let err = SessionManager::<MemorySessionStore>::map_login_error(ApiError::Rejected(
            "Invalid credentials".to_string(),
        ));
        assert!(matches!(err, AuthError::Authentication(ref m) if m == "Invalid credentials"));
    }

    #[test]
    fn test_login_non_network_failures_map_to_authentication() {
        let err = SessionManager::<MemorySessionStore>::map_login_error(ApiError::Unauthorized);
        assert!(matches!(err, AuthError::Authentication(_)));

        let err = SessionManager::<MemorySessionStore>::map_login_error(
            ApiError::InvalidResponse("garbage body".to_string()),
        );
        assert!(matches!(err, AuthError::Authentication(_)));
    }

    #[test]
    fn test_establish_huge_exp_claim_saturates() {
        let mut manager = SessionManager::new(MemorySessionStore::new());

        let nav = manager
            .establish(&admin_token(Some(i64::MAX)), "admin@x.com")
            .unwrap();

        assert_eq!(nav, Navigation::ProtectedArea);
        assert_eq!(
            manager.store.get(KEY_EXPIRY).unwrap().as_deref(),
            Some(i64::MAX.to_string().as_str())
        );
        assert!(manager.is_authenticated());
    }

    #[test]
    fn test_establish_without_exp_claim_applies_default_lifetime() {
        let mut manager = SessionManager::new(MemorySessionStore::new());
        let before = Utc::now().timestamp_millis();

        manager.establish(&admin_token(None), "admin@x.com").unwrap();

        let expiry: i64 = manager
            .store
            .get(KEY_EXPIRY)
            .unwrap()
            .unwrap()
            .parse()
            .unwrap();
        let expected_min = before + Duration::hours(DEFAULT_SESSION_HOURS).num_milliseconds();
        assert!(expiry >= expected_min);
        assert!(manager.is_authenticated());
    }

    #[test]
    fn test_check_validity_expired_clears_and_redirects() {
        let mut manager = SessionManager::new(MemorySessionStore::new());
        manager.store.put(KEY_TOKEN, "tok").unwrap();
        manager.store.put(KEY_EMAIL, "admin@x.com").unwrap();
        let past = Utc::now().timestamp_millis() - 1000;
        manager.store.put(KEY_EXPIRY, &past.to_string()).unwrap();

        let nav = manager.check_validity().unwrap();

        assert_eq!(nav, Some(Navigation::EntryPoint));
        assert!(manager.store.is_empty());
    }

    #[test]
    fn test_check_validity_future_expiry_unchanged() {
        let mut manager = SessionManager::new(MemorySessionStore::new());
        manager.store.put(KEY_TOKEN, "tok").unwrap();
        manager.store.put(KEY_EMAIL, "admin@x.com").unwrap();
        let future = Utc::now().timestamp_millis() + 60_000;
        manager.store.put(KEY_EXPIRY, &future.to_string()).unwrap();

        assert_eq!(manager.check_validity().unwrap(), None);
        assert!(manager.token().is_some());
        assert!(manager.is_authenticated());
    }

    #[test]
    fn test_check_validity_no_session_is_noop() {
        let mut manager = SessionManager::new(MemorySessionStore::new());
        assert_eq!(manager.check_validity().unwrap(), None);
    }

    #[test]
    fn test_check_validity_token_without_expiry_cleared() {
        let mut manager = SessionManager::new(MemorySessionStore::new());
        manager.store.put(KEY_TOKEN, "tok").unwrap();

        let nav = manager.check_validity().unwrap();

        assert_eq!(nav, Some(Navigation::EntryPoint));
        assert!(manager.store.is_empty());
    }

    #[test]
    fn test_logout_always_clears() {
        let mut manager = SessionManager::new(MemorySessionStore::new());
        manager
            .establish(&admin_token(Some(future_exp_secs())), "admin@x.com")
            .unwrap();

        assert_eq!(manager.logout(), Navigation::EntryPoint);
        assert!(manager.store.is_empty());
        assert!(!manager.is_authenticated());

        // Logging out of an already-clear session is fine too
        assert_eq!(manager.logout(), Navigation::EntryPoint);
    }

    /// Store that fails writes to one key, for exercising rollback.
    struct FailingStore {
        inner: MemorySessionStore,
        fail_key: &'static str,
    }

    impl SessionStore for FailingStore {
        fn get(&self, key: &str) -> Result<Option<String>> {
            self.inner.get(key)
        }

        fn put(&mut self, key: &str, value: &str) -> Result<()> {
            if key == self.fail_key {
                anyhow::bail!("disk full");
            }
            self.inner.put(key, value)
        }

        fn remove(&mut self, key: &str) -> Result<()> {
            self.inner.remove(key)
        }
    }

    #[test]
    fn test_persist_failure_rolls_back_earlier_writes() {
        let mut manager = SessionManager::new(FailingStore {
            inner: MemorySessionStore::new(),
            fail_key: KEY_EXPIRY,
        });

        let err = manager
            .establish(&admin_token(Some(future_exp_secs())), "admin@x.com")
            .unwrap_err();

        assert!(matches!(err, AuthError::Storage(_)));
        assert!(manager.store.inner.is_empty());
    }
}
