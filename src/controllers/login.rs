use std::sync::Arc;

use parking_lot::Mutex;
use tracing::debug;

use crate::api::Api;
use crate::controllers::{Navigation, SubmitLock};
use crate::session::credentials::CredentialStore;
use crate::session::{SessionStore, SessionState};

pub struct LoginController {
    api: Arc<dyn Api>,
    session: Arc<SessionStore>,
    credentials: Arc<dyn CredentialStore>,
    error: Mutex<Option<String>>,
    lock: SubmitLock,
}

impl LoginController {
    pub fn new(
        api: Arc<dyn Api>,
        session: Arc<SessionStore>,
        credentials: Arc<dyn CredentialStore>,
    ) -> Self {
        Self {
            api,
            session,
            credentials,
            error: Mutex::new(None),
            lock: SubmitLock::new(),
        }
    }

    /// An already-authenticated viewer lands straight on the dashboard.
    pub fn entry(&self) -> Navigation {
        match self.session.state() {
            SessionState::Resolved(Some(_)) => Navigation::Dashboard,
            _ => Navigation::None,
        }
    }

    pub async fn submit(&self, email: &str, password: &str) -> Navigation {
        let Some(_guard) = self.lock.try_acquire() else {
            return Navigation::None;
        };
        *self.error.lock() = None;

        match self.api.login(email, password).await {
            Ok(auth) => {
                // Persisting the token is the caller's job, not the
                // session store's; a failed write still leaves this run
                // usable, it just won't resume next start.
                if let Err(e) = self.credentials.store(&auth.token) {
                    tracing::warn!(error = %e, "failed to persist credential");
                }
                debug!(user_id = auth.user.id, "login succeeded");
                self.session.set_user(auth.user);
                Navigation::Dashboard
            }
            Err(e) => {
                *self.error.lock() = Some(e.user_message());
                Navigation::None
            }
        }
    }

    pub fn error(&self) -> Option<String> {
        self.error.lock().clone()
    }

    pub fn is_submitting(&self) -> bool {
        self.lock.is_submitting()
    }
}
