use std::sync::Arc;

use parking_lot::Mutex;

use crate::api::Api;
use crate::controllers::SubmitLock;
use crate::domain::user::UserUpdate;
use crate::session::SessionStore;

#[derive(Default)]
struct ProfileForm {
    name: String,
    email: String,
    username: String,
    error: Option<String>,
    saved: bool,
}

/// The profile view: form fields seeded from the session user, saved via
/// a partial update. The session store is the single owner of the user
/// record, so a successful save writes the server's copy back to it.
pub struct ProfileController {
    api: Arc<dyn Api>,
    session: Arc<SessionStore>,
    form: Mutex<ProfileForm>,
    lock: SubmitLock,
}

impl ProfileController {
    pub fn new(api: Arc<dyn Api>, session: Arc<SessionStore>) -> Self {
        let form = match session.current_user() {
            Some(user) => ProfileForm {
                name: user.name,
                email: user.email,
                username: user.username,
                ..Default::default()
            },
            None => ProfileForm::default(),
        };
        Self {
            api,
            session,
            form: Mutex::new(form),
            lock: SubmitLock::new(),
        }
    }

    pub fn set_name(&self, name: &str) {
        self.form.lock().name = name.to_string();
    }

    pub fn set_email(&self, email: &str) {
        self.form.lock().email = email.to_string();
    }

    pub fn set_username(&self, username: &str) {
        self.form.lock().username = username.to_string();
    }

    pub fn fields(&self) -> (String, String, String) {
        let form = self.form.lock();
        (form.name.clone(), form.email.clone(), form.username.clone())
    }

    pub async fn save(&self) {
        let Some(_guard) = self.lock.try_acquire() else {
            return;
        };
        let update = {
            let mut form = self.form.lock();
            form.error = None;
            form.saved = false;
            UserUpdate {
                name: Some(form.name.clone()),
                email: Some(form.email.clone()),
                username: Some(form.username.clone()),
            }
        };

        match self.api.update_user(&update).await {
            Ok(user) => {
                self.session.set_user(user);
                self.form.lock().saved = true;
            }
            Err(e) => {
                self.form.lock().error =
                    Some(format!("Failed to update profile: {}", e.user_message()));
            }
        }
    }

    pub fn error(&self) -> Option<String> {
        self.form.lock().error.clone()
    }

    pub fn saved(&self) -> bool {
        self.form.lock().saved
    }

    pub fn is_submitting(&self) -> bool {
        self.lock.is_submitting()
    }
}
