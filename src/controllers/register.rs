use std::sync::Arc;

use parking_lot::Mutex;
use tracing::debug;

use crate::api::Api;
use crate::controllers::{Navigation, SubmitLock};
use crate::session::credentials::CredentialStore;
use crate::session::{SessionState, SessionStore};

pub struct RegisterController {
    api: Arc<dyn Api>,
    session: Arc<SessionStore>,
    credentials: Arc<dyn CredentialStore>,
    error: Mutex<Option<String>>,
    lock: SubmitLock,
}

impl RegisterController {
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

    pub fn entry(&self) -> Navigation {
        match self.session.state() {
            SessionState::Resolved(Some(_)) => Navigation::Dashboard,
            _ => Navigation::None,
        }
    }

    pub async fn submit(
        &self,
        name: &str,
        email: &str,
        username: &str,
        password: &str,
    ) -> Navigation {
        let Some(_guard) = self.lock.try_acquire() else {
            return Navigation::None;
        };
        *self.error.lock() = None;

        match self.api.register(name, email, username, password).await {
            Ok(auth) => {
                if let Err(e) = self.credentials.store(&auth.token) {
                    tracing::warn!(error = %e, "failed to persist credential");
                }
                debug!(user_id = auth.user.id, "registration succeeded");
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::mock::{MockApi, MockFailure, user_json};
    use crate::session::MemoryCredentialStore;
    use serde_json::json;

    fn setup() -> (Arc<MockApi>, Arc<MemoryCredentialStore>, RegisterController) {
        let api = Arc::new(MockApi::new());
        let credentials = Arc::new(MemoryCredentialStore::default());
        let session = Arc::new(SessionStore::new(credentials.clone()));
        let controller = RegisterController::new(api.clone(), session, credentials.clone());
        (api, credentials, controller)
    }

    #[tokio::test]
    async fn test_successful_registration_logs_the_user_in() {
        let (api, credentials, controller) = setup();
        api.expect(
            "register",
            json!({
                "user": user_json(5, "Bob", "bob@example.com", "bob"),
                "token": "tok-5",
            }),
        );

        let nav = controller
            .submit("Bob", "bob@example.com", "bob", "secret")
            .await;

        assert_eq!(nav, Navigation::Dashboard);
        assert_eq!(credentials.load().unwrap(), Some("tok-5".to_string()));
        assert_eq!(
            controller.session.current_user().unwrap().username,
            "bob"
        );
    }

    #[tokio::test]
    async fn test_duplicate_email_surfaces_server_message() {
        let (api, credentials, controller) = setup();
        api.fail(
            "register",
            MockFailure::Server(422, "The email has already been taken.".to_string()),
        );

        let nav = controller
            .submit("Bob", "bob@example.com", "bob", "secret")
            .await;

        assert_eq!(nav, Navigation::None);
        assert_eq!(
            controller.error(),
            Some("The email has already been taken.".to_string())
        );
        assert_eq!(credentials.load().unwrap(), None);
    }
}
