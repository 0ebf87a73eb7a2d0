//! Session store
//!
//! Owns the single cached [`User`] and the persisted credential. Game and
//! wallet flows read the cached balance and ask the store to refresh it;
//! nothing else mutates the user.

use crate::{
    api::models::{AuthResponse, ProfileUpdate},
    common::{traits::TokenStore, types::User},
    errors::{ClientError, ClientResult},
    services::AuthService,
};
use std::{
    collections::BTreeMap,
    fs,
    path::{Path, PathBuf},
    sync::{
        atomic::{AtomicU64, Ordering},
        Arc, Mutex,
    },
};
use tokio::sync::watch;
use tracing::{debug, info, warn};

const LOGIN_FAILED: &str = "Login failed";
const REGISTRATION_FAILED: &str = "Registration failed";
const SESSION_EXPIRED: &str = "Session expired. Please login again.";
const MISSING_TOKEN: &str = "Authentication response carried no token";

/// Point-in-time view of the session, published to subscribers
#[derive(Debug, Clone, PartialEq)]
pub struct SessionSnapshot {
    pub user: Option<User>,
    pub loading: bool,
    pub error: Option<String>,
}

impl Default for SessionSnapshot {
    fn default() -> Self {
        // Loading until the first restore completes
        Self {
            user: None,
            loading: true,
            error: None,
        }
    }
}

impl SessionSnapshot {
    pub fn is_authenticated(&self) -> bool {
        self.user.is_some()
    }
}

pub struct SessionStore {
    auth: AuthService,
    tokens: Arc<dyn TokenStore>,
    state: watch::Sender<SessionSnapshot>,
    /// Bumped whenever the authenticated identity changes
    generation: AtomicU64,
}

impl SessionStore {
    pub fn new(auth: AuthService, tokens: Arc<dyn TokenStore>) -> Self {
        let (state, _) = watch::channel(SessionSnapshot::default());
        Self {
            auth,
            tokens,
            state,
            generation: AtomicU64::new(0),
        }
    }

    /// Re-establish a session from a persisted token
    pub async fn restore(&self) -> ClientResult<Option<User>> {
        let token = self.tokens.get()?;
        if token.is_none() {
            self.state.send_modify(|s| s.loading = false);
            return Ok(None);
        }

        self.state.send_modify(|s| s.loading = true);
        let generation = self.generation.load(Ordering::SeqCst);
        match self.auth.profile().await {
            Ok(user) => {
                if self.generation.load(Ordering::SeqCst) != generation {
                    debug!("Session changed during restore, discarding profile");
                    self.state.send_modify(|s| s.loading = false);
                    return Ok(None);
                }
                info!(user_id = %user.id, "Session restored");
                self.state.send_modify(|s| {
                    s.user = Some(user.clone());
                    s.loading = false;
                    s.error = None;
                });
                Ok(Some(user))
            }
            Err(_) if self.generation.load(Ordering::SeqCst) != generation => {
                self.state.send_modify(|s| s.loading = false);
                Ok(None)
            }
            Err(e) => {
                warn!(error = %e, "Stored session rejected, clearing token");
                if let Err(e) = self.tokens.clear() {
                    warn!(error = %e, "Failed to clear stored token");
                }
                self.state.send_modify(|s| {
                    s.user = None;
                    s.loading = false;
                    s.error = Some(SESSION_EXPIRED.to_string());
                });
                Ok(None)
            }
        }
    }

    pub async fn login(&self, email: &str, password: &str) -> ClientResult<User> {
        self.begin();
        match self.auth.login(email, password).await {
            Ok(response) => self.establish(response),
            Err(e) => Err(self.reject(e, LOGIN_FAILED)),
        }
    }

    pub async fn register(
        &self,
        username: &str,
        email: &str,
        password: &str,
    ) -> ClientResult<User> {
        self.begin();
        match self.auth.register(username, email, password).await {
            Ok(response) => self.establish(response),
            Err(e) => Err(self.reject(e, REGISTRATION_FAILED)),
        }
    }

    /// Drop the token and cached user. Local only, idempotent.
    pub fn logout(&self) {
        self.generation.fetch_add(1, Ordering::SeqCst);
        if let Err(e) = self.tokens.clear() {
            warn!(error = %e, "Failed to clear stored token");
        }
        self.state.send_modify(|s| {
            if let Some(user) = s.user.take() {
                info!(user_id = %user.id, "Logged out");
            }
            s.loading = false;
            s.error = None;
        });
    }

    /// Re-fetch the profile so the cached balance reflects the server.
    ///
    /// Failures are logged and otherwise ignored.
    pub async fn refresh_balance(&self) {
        if !self.is_authenticated() {
            return;
        }
        let generation = self.generation.load(Ordering::SeqCst);
        match self.auth.profile().await {
            Ok(user) => {
                if self.replace_user(generation, user.clone()) {
                    debug!(balance = user.balance, "Balance refreshed");
                } else {
                    debug!("Session changed during refresh, discarding profile");
                }
            }
            Err(e) => warn!(error = %e, "Balance refresh failed"),
        }
    }

    pub async fn update_profile(&self, update: &ProfileUpdate) -> ClientResult<User> {
        if !self.is_authenticated() {
            return Err(ClientError::AuthRequired);
        }
        let generation = self.generation.load(Ordering::SeqCst);
        let user = self.auth.update_profile(update).await?;
        if !self.replace_user(generation, user.clone()) {
            return Err(ClientError::AuthRequired);
        }
        Ok(user)
    }

    pub fn user(&self) -> Option<User> {
        self.state.borrow().user.clone()
    }

    /// Cached balance; zero when unauthenticated
    pub fn balance(&self) -> f64 {
        self.state.borrow().user.as_ref().map_or(0.0, |u| u.balance)
    }

    pub fn is_authenticated(&self) -> bool {
        self.state.borrow().is_authenticated()
    }

    pub fn is_loading(&self) -> bool {
        self.state.borrow().loading
    }

    pub fn last_error(&self) -> Option<String> {
        self.state.borrow().error.clone()
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        self.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<SessionSnapshot> {
        self.state.subscribe()
    }

    fn begin(&self) {
        self.state.send_modify(|s| {
            s.loading = true;
            s.error = None;
        });
    }

    /// Swap in a fresh profile unless the session changed since `generation`
    fn replace_user(&self, generation: u64, user: User) -> bool {
        self.state.send_if_modified(|s| {
            if s.user.is_none() || self.generation.load(Ordering::SeqCst) != generation {
                return false;
            }
            s.user = Some(user);
            true
        })
    }

    fn establish(&self, response: AuthResponse) -> ClientResult<User> {
        let Some(token) = response.token.as_deref() else {
            warn!("Auth response carried no token");
            self.state.send_modify(|s| {
                s.loading = false;
                s.error = Some(MISSING_TOKEN.to_string());
            });
            return Err(ClientError::Auth(MISSING_TOKEN.to_string()));
        };
        self.tokens.set(token)?;
        self.generation.fetch_add(1, Ordering::SeqCst);
        let user = response.user;
        info!(user_id = %user.id, username = %user.username, "Session established");
        self.state.send_modify(|s| {
            s.user = Some(user.clone());
            s.loading = false;
            s.error = None;
        });
        Ok(user)
    }

    fn reject(&self, error: ClientError, fallback: &str) -> ClientError {
        let message = error.user_message(fallback);
        warn!(error = %error, "Authentication failed");
        self.state.send_modify(|s| {
            s.loading = false;
            s.error = Some(message.clone());
        });
        ClientError::Auth(message)
    }
}

/// In-process credential store
#[derive(Debug, Default)]
pub struct MemoryTokenStore {
    token: Mutex<Option<String>>,
}

impl MemoryTokenStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_token(token: impl Into<String>) -> Self {
        Self {
            token: Mutex::new(Some(token.into())),
        }
    }

    fn slot(&self) -> ClientResult<std::sync::MutexGuard<'_, Option<String>>> {
        self.token
            .lock()
            .map_err(|_| ClientError::Storage("token store lock poisoned".to_string()))
    }
}

impl TokenStore for MemoryTokenStore {
    fn get(&self) -> ClientResult<Option<String>> {
        Ok(self.slot()?.clone())
    }

    fn set(&self, token: &str) -> ClientResult<()> {
        *self.slot()? = Some(token.to_string());
        Ok(())
    }

    fn clear(&self) -> ClientResult<()> {
        *self.slot()? = None;
        Ok(())
    }
}

/// JSON key-value file holding the credential under a fixed key
#[derive(Debug)]
pub struct FileTokenStore {
    path: PathBuf,
    key: String,
    lock: Mutex<()>,
}

impl FileTokenStore {
    pub fn new(path: impl AsRef<Path>, key: impl Into<String>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            key: key.into(),
            lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_entries(&self) -> ClientResult<BTreeMap<String, String>> {
        if !self.path.exists() {
            return Ok(BTreeMap::new());
        }
        let content = fs::read_to_string(&self.path)?;
        if content.trim().is_empty() {
            return Ok(BTreeMap::new());
        }
        serde_json::from_str(&content).map_err(|e| {
            ClientError::Storage(format!("corrupt store {}: {}", self.path.display(), e))
        })
    }

    fn write_entries(&self, entries: &BTreeMap<String, String>) -> ClientResult<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        let content = serde_json::to_string_pretty(entries)
            .map_err(|e| ClientError::Storage(e.to_string()))?;
        fs::write(&self.path, content)?;
        Ok(())
    }

    fn guard(&self) -> ClientResult<std::sync::MutexGuard<'_, ()>> {
        self.lock
            .lock()
            .map_err(|_| ClientError::Storage("token store lock poisoned".to_string()))
    }
}

impl TokenStore for FileTokenStore {
    fn get(&self) -> ClientResult<Option<String>> {
        let _guard = self.guard()?;
        Ok(self.read_entries()?.remove(&self.key))
    }

    fn set(&self, token: &str) -> ClientResult<()> {
        let _guard = self.guard()?;
        let mut entries = self.read_entries()?;
        entries.insert(self.key.clone(), token.to_string());
        self.write_entries(&entries)
    }

    fn clear(&self) -> ClientResult<()> {
        let _guard = self.guard()?;
        let mut entries = self.read_entries()?;
        if entries.remove(&self.key).is_some() {
            self.write_entries(&entries)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::ScriptedTransport;
    use serde_json::json;
    use std::time::Duration;

    fn store(transport: &Arc<ScriptedTransport>, tokens: Arc<dyn TokenStore>) -> SessionStore {
        SessionStore::new(AuthService::new(transport.clone()), tokens)
    }

    fn user_json(balance: f64) -> serde_json::Value {
        json!({"_id": "u1", "username": "ravi", "email": "ravi@example.com", "balance": balance})
    }

    #[tokio::test]
    async fn test_login_persists_token() {
        let transport = Arc::new(ScriptedTransport::new());
        transport.respond("/users/login", json!({"token": "t-1", "user": user_json(1000.0)}));
        let tokens = Arc::new(MemoryTokenStore::new());
        let session = store(&transport, tokens.clone());

        let user = session.login("ravi@example.com", "secret").await.unwrap();
        assert_eq!(user.username, "ravi");
        assert_eq!(tokens.get().unwrap().as_deref(), Some("t-1"));
        assert!(session.is_authenticated());
        assert_eq!(session.balance(), 1000.0);
        assert!(!session.is_loading());
    }

    #[tokio::test]
    async fn test_login_failure_uses_server_message() {
        let transport = Arc::new(ScriptedTransport::new());
        transport.fail("/users/login", 401, Some("Invalid credentials"));
        let session = store(&transport, Arc::new(MemoryTokenStore::new()));

        let err = session.login("ravi@example.com", "wrong").await.unwrap_err();
        assert!(matches!(err, ClientError::Auth(ref m) if m == "Invalid credentials"));
        assert_eq!(session.last_error().as_deref(), Some("Invalid credentials"));
        assert!(!session.is_authenticated());
    }

    #[tokio::test]
    async fn test_register_failure_fallback() {
        let transport = Arc::new(ScriptedTransport::new());
        transport.fail("/users/register", 500, None);
        let session = store(&transport, Arc::new(MemoryTokenStore::new()));

        let err = session.register("ravi", "ravi@example.com", "pw").await.unwrap_err();
        assert_eq!(err.user_message("x"), "Registration failed");
        assert_eq!(session.last_error().as_deref(), Some("Registration failed"));
    }

    #[tokio::test]
    async fn test_logout_is_local_and_idempotent() {
        let transport = Arc::new(ScriptedTransport::new());
        transport.respond("/users/login", json!({"token": "t-1", "user": user_json(10.0)}));
        let tokens = Arc::new(MemoryTokenStore::new());
        let session = store(&transport, tokens.clone());
        session.login("ravi@example.com", "pw").await.unwrap();
        let before = transport.request_count();

        session.logout();
        assert!(session.user().is_none());
        assert!(tokens.get().unwrap().is_none());
        assert_eq!(transport.request_count(), before);

        session.logout();
        assert!(!session.is_authenticated());
    }

    #[tokio::test]
    async fn test_restore_without_token_ends_loading() {
        let transport = Arc::new(ScriptedTransport::new());
        let session = store(&transport, Arc::new(MemoryTokenStore::new()));
        assert!(session.is_loading());

        assert!(session.restore().await.unwrap().is_none());
        assert!(!session.is_loading());
        assert_eq!(transport.request_count(), 0);
    }

    #[tokio::test]
    async fn test_restore_failure_clears_token() {
        let transport = Arc::new(ScriptedTransport::new());
        transport.fail("/users/profile", 401, Some("jwt expired"));
        let tokens = Arc::new(MemoryTokenStore::with_token("stale"));
        let session = store(&transport, tokens.clone());

        assert!(session.restore().await.unwrap().is_none());
        assert!(tokens.get().unwrap().is_none());
        assert_eq!(session.last_error().as_deref(), Some(SESSION_EXPIRED));
        assert!(!session.is_loading());
    }

    #[tokio::test]
    async fn test_refresh_balance_swallows_errors() {
        let transport = Arc::new(ScriptedTransport::new());
        transport.respond("/users/profile", json!({"user": user_json(500.0)}));
        let session = store(&transport, Arc::new(MemoryTokenStore::with_token("t")));

        // Unauthenticated: nothing sent
        session.refresh_balance().await;
        assert_eq!(transport.request_count(), 0);

        session.restore().await.unwrap();
        transport.respond("/users/profile", json!({"user": user_json(695.0)}));
        session.refresh_balance().await;
        assert_eq!(session.balance(), 695.0);

        transport.fail("/users/profile", 503, None);
        session.refresh_balance().await;
        assert_eq!(session.balance(), 695.0);
        assert!(session.last_error().is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_logout_during_refresh_stays_logged_out() {
        let transport = Arc::new(ScriptedTransport::new());
        transport.respond("/users/profile", json!({"user": user_json(500.0)}));
        let tokens = Arc::new(MemoryTokenStore::with_token("t"));
        let session = Arc::new(store(&transport, tokens.clone()));
        session.restore().await.unwrap();

        transport.delay("/users/profile", Duration::from_secs(1));
        let refreshing = tokio::spawn({
            let session = session.clone();
            async move { session.refresh_balance().await }
        });
        tokio::time::sleep(Duration::from_millis(100)).await;
        session.logout();
        refreshing.await.unwrap();

        assert!(session.user().is_none());
        assert!(tokens.get().unwrap().is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_relogin_during_refresh_keeps_new_user() {
        let transport = Arc::new(ScriptedTransport::new());
        transport.respond("/users/profile", json!({"user": user_json(500.0)}));
        let session = Arc::new(store(&transport, Arc::new(MemoryTokenStore::with_token("t"))));
        session.restore().await.unwrap();

        transport.delay("/users/profile", Duration::from_secs(1));
        let refreshing = tokio::spawn({
            let session = session.clone();
            async move { session.refresh_balance().await }
        });
        tokio::time::sleep(Duration::from_millis(100)).await;
        session.logout();
        transport.respond(
            "/users/login",
            json!({
                "token": "t-2",
                "user": {"_id": "u2", "username": "asha", "email": "asha@example.com", "balance": 20}
            }),
        );
        session.login("asha@example.com", "pw").await.unwrap();
        refreshing.await.unwrap();

        assert_eq!(session.user().unwrap().username, "asha");
        assert_eq!(session.balance(), 20.0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_logout_during_restore_stays_logged_out() {
        let transport = Arc::new(ScriptedTransport::new());
        transport.respond("/users/profile", json!({"user": user_json(500.0)}));
        transport.delay("/users/profile", Duration::from_secs(1));
        let session = Arc::new(store(&transport, Arc::new(MemoryTokenStore::with_token("t"))));

        let restoring = tokio::spawn({
            let session = session.clone();
            async move { session.restore().await }
        });
        tokio::time::sleep(Duration::from_millis(100)).await;
        session.logout();

        assert!(restoring.await.unwrap().unwrap().is_none());
        assert!(session.user().is_none());
        assert!(!session.is_loading());
    }

    #[tokio::test]
    async fn test_login_without_token_is_rejected() {
        let transport = Arc::new(ScriptedTransport::new());
        transport.respond("/users/login", json!({"user": user_json(1000.0)}));
        let tokens = Arc::new(MemoryTokenStore::new());
        let session = store(&transport, tokens.clone());

        let err = session.login("ravi@example.com", "pw").await.unwrap_err();
        assert!(matches!(err, ClientError::Auth(ref m) if m == MISSING_TOKEN));
        assert!(!session.is_authenticated());
        assert!(tokens.get().unwrap().is_none());
        assert_eq!(session.last_error().as_deref(), Some(MISSING_TOKEN));
    }

    #[tokio::test]
    async fn test_subscribers_see_updates() {
        let transport = Arc::new(ScriptedTransport::new());
        transport.respond("/users/login", json!({"token": "t", "user": user_json(10.0)}));
        let session = store(&transport, Arc::new(MemoryTokenStore::new()));
        let mut updates = session.subscribe();

        session.login("ravi@example.com", "pw").await.unwrap();
        assert!(updates.has_changed().unwrap());
        assert!(updates.borrow_and_update().is_authenticated());
    }

    #[test]
    fn test_file_store_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("storage.json");
        let tokens = FileTokenStore::new(&path, "token");

        assert!(tokens.get().unwrap().is_none());
        tokens.set("abc").unwrap();
        assert_eq!(tokens.get().unwrap().as_deref(), Some("abc"));

        let reopened = FileTokenStore::new(&path, "token");
        assert_eq!(reopened.get().unwrap().as_deref(), Some("abc"));

        reopened.clear().unwrap();
        reopened.clear().unwrap();
        assert!(tokens.get().unwrap().is_none());
    }

    #[test]
    fn test_file_store_keeps_other_keys() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("storage.json");
        fs::write(&path, r#"{"theme": "dark"}"#).unwrap();

        let tokens = FileTokenStore::new(&path, "token");
        tokens.set("abc").unwrap();
        tokens.clear().unwrap();

        let content = fs::read_to_string(&path).unwrap();
        assert!(content.contains("dark"));
        assert!(!content.contains("abc"));
    }
}
