use std::sync::Arc;

use parking_lot::RwLock;
use tracing::{debug, warn};

use crate::api::Api;
use crate::domain::User;
use crate::session::credentials::CredentialStore;

/// Lifecycle of the viewer's identity for one application run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionState {
    Uninitialized,
    Resolving,
    Resolved(Option<User>),
}

/// Single source of truth for who the current viewer is. Passed
/// explicitly to every controller; there is no ambient singleton.
pub struct SessionStore {
    state: RwLock<SessionState>,
    credentials: Arc<dyn CredentialStore>,
}

impl SessionStore {
    pub fn new(credentials: Arc<dyn CredentialStore>) -> Self {
        Self {
            state: RwLock::new(SessionState::Uninitialized),
            credentials,
        }
    }

    /// Resolve the persisted credential into a user, exactly once.
    ///
    /// No credential means no network call at all. A credential the
    /// identity endpoint rejects is swallowed (logged, not surfaced) and
    /// resolves to no user, so a stale token never blocks startup.
    pub async fn initialize(&self, api: &dyn Api) {
        {
            let mut state = self.state.write();
            if *state != SessionState::Uninitialized {
                return;
            }
            match self.credentials.load() {
                Ok(Some(_)) => *state = SessionState::Resolving,
                Ok(None) => {
                    *state = SessionState::Resolved(None);
                    return;
                }
                Err(e) => {
                    warn!(error = %e, "could not read persisted credential");
                    *state = SessionState::Resolved(None);
                    return;
                }
            }
        }

        let resolved = match api.current_user().await {
            Ok(user) => {
                debug!(user_id = user.id, "session resumed");
                Some(user)
            }
            Err(e) => {
                warn!(error = %e, "silent session resume failed");
                None
            }
        };
        *self.state.write() = SessionState::Resolved(resolved);
    }

    /// Explicit override after login/register/profile-update. Synchronous
    /// and immediately observable.
    pub fn set_user(&self, user: User) {
        *self.state.write() = SessionState::Resolved(Some(user));
    }

    /// Erases the persisted credential and drops the in-memory user.
    pub fn log_out(&self) {
        if let Err(e) = self.credentials.clear() {
            warn!(error = %e, "failed to erase persisted credential");
        }
        *self.state.write() = SessionState::Resolved(None);
    }

    /// True only while the persisted credential is being resolved.
    pub fn is_loading(&self) -> bool {
        matches!(
            *self.state.read(),
            SessionState::Uninitialized | SessionState::Resolving
        )
    }

    pub fn current_user(&self) -> Option<User> {
        match &*self.state.read() {
            SessionState::Resolved(user) => user.clone(),
            _ => None,
        }
    }

    pub fn state(&self) -> SessionState {
        self.state.read().clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::mock::{MockApi, MockFailure, user_json};
    use crate::session::credentials::MemoryCredentialStore;

    fn user() -> User {
        User {
            id: 3,
            name: "Alice".to_string(),
            email: "alice@example.com".to_string(),
            username: "alice".to_string(),
        }
    }

    #[tokio::test]
    async fn test_initialize_without_credential_skips_network() {
        let store = SessionStore::new(Arc::new(MemoryCredentialStore::default()));
        let api = MockApi::new();

        store.initialize(&api).await;

        assert_eq!(store.state(), SessionState::Resolved(None));
        assert!(!store.is_loading());
        assert_eq!(api.call_count("current_user"), 0);
    }

    #[tokio::test]
    async fn test_initialize_with_rejected_credential_resolves_none() {
        let store = SessionStore::new(Arc::new(MemoryCredentialStore::with_token("stale")));
        let api = MockApi::new();
        api.fail(
            "current_user",
            MockFailure::Unauthorized("Unauthenticated.".to_string()),
        );

        store.initialize(&api).await;

        assert_eq!(store.state(), SessionState::Resolved(None));
        assert_eq!(api.call_count("current_user"), 1);
    }

    #[tokio::test]
    async fn test_initialize_resumes_valid_credential() {
        let store = SessionStore::new(Arc::new(MemoryCredentialStore::with_token("good")));
        let api = MockApi::new();
        api.expect(
            "current_user",
            user_json(3, "Alice", "alice@example.com", "alice"),
        );

        store.initialize(&api).await;

        assert_eq!(store.current_user(), Some(user()));
    }

    #[tokio::test]
    async fn test_initialize_is_idempotent() {
        let store = SessionStore::new(Arc::new(MemoryCredentialStore::with_token("good")));
        let api = MockApi::new();
        api.expect(
            "current_user",
            user_json(3, "Alice", "alice@example.com", "alice"),
        );

        store.initialize(&api).await;
        store.initialize(&api).await;

        assert_eq!(api.call_count("current_user"), 1);
        assert_eq!(store.current_user(), Some(user()));
    }

    #[tokio::test]
    async fn test_set_user_is_immediately_observable() {
        let store = SessionStore::new(Arc::new(MemoryCredentialStore::default()));
        store.set_user(user());
        assert_eq!(store.current_user(), Some(user()));
        assert!(!store.is_loading());
    }

    #[tokio::test]
    async fn test_log_out_erases_credential_and_user() {
        let credentials = Arc::new(MemoryCredentialStore::with_token("good"));
        let store = SessionStore::new(credentials.clone());
        store.set_user(user());

        store.log_out();

        assert_eq!(store.current_user(), None);
        assert_eq!(credentials.load().unwrap(), None);
        assert_eq!(store.state(), SessionState::Resolved(None));
    }

    #[test]
    fn test_loading_before_initialize() {
        let store = SessionStore::new(Arc::new(MemoryCredentialStore::default()));
        assert!(store.is_loading());
        assert_eq!(store.current_user(), None);
    }
}
