use std::sync::Arc;

use parking_lot::Mutex;
use tracing::debug;

use crate::api::Api;
use crate::controllers::{Navigation, SubmitLock};
use crate::domain::task::TaskUpdate;
use crate::domain::{SharePermission, TaskList};
use crate::session::credentials::CredentialStore;
use crate::store::EntityStore;

#[derive(Default)]
struct DetailState {
    new_task_title: String,
    new_task_description: String,
    share_username: String,
    loading: bool,
    error: Option<String>,
}

/// One task list's detail view: the task collection plus the add-task
/// and share forms.
pub struct TaskListController {
    api: Arc<dyn Api>,
    credentials: Arc<dyn CredentialStore>,
    store: Arc<EntityStore>,
    list_id: i64,
    state: Mutex<DetailState>,
    lock: SubmitLock,
}

impl TaskListController {
    pub fn new(
        api: Arc<dyn Api>,
        credentials: Arc<dyn CredentialStore>,
        store: Arc<EntityStore>,
        list_id: i64,
    ) -> Self {
        Self {
            api,
            credentials,
            store,
            list_id,
            state: Mutex::new(DetailState::default()),
            lock: SubmitLock::new(),
        }
    }

    /// Fetch the list with its tasks. A missing credential short-circuits
    /// to login without calling; an unauthorized response redirects too.
    pub async fn load(&self) -> Navigation {
        if !matches!(self.credentials.load(), Ok(Some(_))) {
            return Navigation::Login;
        }
        {
            let mut state = self.state.lock();
            state.loading = true;
            state.error = None;
        }
        let result = self.api.task_list(self.list_id).await;
        let mut state = self.state.lock();
        state.loading = false;
        match result {
            Ok(list) => {
                drop(state);
                self.store.insert_list(list);
                Navigation::None
            }
            Err(e) if e.is_unauthorized() => {
                state.error = Some(e.user_message());
                Navigation::Login
            }
            Err(e) => {
                state.error = Some(e.user_message());
                Navigation::None
            }
        }
    }

    pub fn list(&self) -> Option<TaskList> {
        self.store.list(self.list_id)
    }

    pub fn set_new_task_title(&self, title: &str) {
        self.state.lock().new_task_title = title.to_string();
    }

    pub fn new_task_title(&self) -> String {
        self.state.lock().new_task_title.clone()
    }

    pub fn set_new_task_description(&self, description: &str) {
        self.state.lock().new_task_description = description.to_string();
    }

    pub fn new_task_description(&self) -> String {
        self.state.lock().new_task_description.clone()
    }

    pub fn set_share_username(&self, username: &str) {
        self.state.lock().share_username = username.to_string();
    }

    pub fn share_username(&self) -> String {
        self.state.lock().share_username.clone()
    }

    /// Add a task from the input fields. Whitespace-only titles never
    /// reach the API; the inputs are cleared only once the server
    /// accepts. A blank description is sent as no description at all.
    pub async fn add_task(&self) {
        let (title, description) = {
            let state = self.state.lock();
            (
                state.new_task_title.clone(),
                state.new_task_description.clone(),
            )
        };
        if title.trim().is_empty() {
            return;
        }
        let Some(_guard) = self.lock.try_acquire() else {
            return;
        };
        self.state.lock().error = None;

        let description = match description.trim() {
            "" => None,
            trimmed => Some(trimmed),
        };
        match self.api.create_task(self.list_id, &title, description).await {
            Ok(task) => {
                debug!(task_id = task.id, "task created");
                let mut state = self.state.lock();
                state.new_task_title.clear();
                state.new_task_description.clear();
                drop(state);
                self.store.insert_task(task);
            }
            Err(e) => {
                self.state.lock().error = Some(e.user_message());
            }
        }
    }

    /// Flip a task's completed flag. The checkbox keeps its prior state
    /// until the server confirms: only the server-returned entity is
    /// written back, and a failure leaves the collection untouched.
    pub async fn toggle_task(&self, task_id: i64) {
        let Some(_guard) = self.lock.try_acquire() else {
            return;
        };
        let Some(current) = self.store.task(task_id) else {
            return;
        };
        self.state.lock().error = None;

        let update = TaskUpdate::completed(!current.completed);
        match self.api.update_task(task_id, &update).await {
            Ok(task) => self.store.insert_task(task),
            Err(e) => {
                self.state.lock().error = Some(e.user_message());
            }
        }
    }

    pub async fn delete_task(&self, task_id: i64) {
        let Some(_guard) = self.lock.try_acquire() else {
            return;
        };
        self.state.lock().error = None;

        match self.api.delete_task(task_id).await {
            Ok(()) => self.store.remove_task(task_id),
            Err(e) => {
                self.state.lock().error = Some(e.user_message());
            }
        }
    }

    /// Grant another user access. Write-only: nothing is cached locally,
    /// the username field is just cleared on success.
    pub async fn share(&self, permission: SharePermission) {
        let username = self.state.lock().share_username.clone();
        if username.trim().is_empty() {
            return;
        }
        let Some(_guard) = self.lock.try_acquire() else {
            return;
        };
        self.state.lock().error = None;

        match self
            .api
            .share_task_list(self.list_id, &username, permission)
            .await
        {
            Ok(()) => {
                debug!(list_id = self.list_id, username = %username, "list shared");
                self.state.lock().share_username.clear();
            }
            Err(e) => {
                self.state.lock().error = Some(e.user_message());
            }
        }
    }

    /// Rename the list; the server's copy of the record wins.
    pub async fn rename(&self, name: &str) {
        if name.trim().is_empty() {
            return;
        }
        let Some(_guard) = self.lock.try_acquire() else {
            return;
        };
        self.state.lock().error = None;

        match self.api.update_task_list(self.list_id, name).await {
            Ok(list) => self.store.insert_list(list),
            Err(e) => {
                self.state.lock().error = Some(e.user_message());
            }
        }
    }

    pub fn error(&self) -> Option<String> {
        self.state.lock().error.clone()
    }

    pub fn is_loading(&self) -> bool {
        self.state.lock().loading
    }

    pub fn is_submitting(&self) -> bool {
        self.lock.is_submitting()
    }
}
