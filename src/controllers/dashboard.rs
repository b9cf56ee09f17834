use std::sync::Arc;

use parking_lot::Mutex;
use tracing::debug;

use crate::api::Api;
use crate::controllers::{Navigation, SubmitLock};
use crate::domain::TaskList;
use crate::store::EntityStore;

#[derive(Default)]
struct DashboardState {
    /// Owned lists in server order; entities live in the store.
    list_ids: Vec<i64>,
    /// Lists other users shared with the viewer.
    shared_ids: Vec<i64>,
    new_list_name: String,
    loading: bool,
    error: Option<String>,
}

/// The "your task lists" view: owned and shared collections plus the
/// create-list form.
pub struct DashboardController {
    api: Arc<dyn Api>,
    store: Arc<EntityStore>,
    state: Mutex<DashboardState>,
    lock: SubmitLock,
}

impl DashboardController {
    pub fn new(api: Arc<dyn Api>, store: Arc<EntityStore>) -> Self {
        Self {
            api,
            store,
            state: Mutex::new(DashboardState::default()),
            lock: SubmitLock::new(),
        }
    }

    /// Fetch the viewer's own lists. An unauthorized response redirects
    /// to login; any other failure is rendered inline.
    pub async fn load(&self) -> Navigation {
        {
            let mut state = self.state.lock();
            state.loading = true;
            state.error = None;
        }
        let result = self.api.task_lists().await;
        let mut state = self.state.lock();
        state.loading = false;
        match result {
            Ok(lists) => {
                state.list_ids = lists.iter().map(|l| l.id).collect();
                drop(state);
                self.store.insert_lists(lists);
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

    /// Fetch lists shared with the viewer. Kept separate from `load` so
    /// a failure here doesn't blank the owned collection.
    pub async fn load_shared(&self) -> Navigation {
        {
            let mut state = self.state.lock();
            state.loading = true;
            state.error = None;
        }
        let result = self.api.shared_task_lists().await;
        let mut state = self.state.lock();
        state.loading = false;
        match result {
            Ok(lists) => {
                state.shared_ids = lists.iter().map(|l| l.id).collect();
                drop(state);
                self.store.insert_lists(lists);
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

    pub fn set_new_list_name(&self, name: &str) {
        self.state.lock().new_list_name = name.to_string();
    }

    pub fn new_list_name(&self) -> String {
        self.state.lock().new_list_name.clone()
    }

    /// Create a list from the input field. Whitespace-only input issues
    /// no call; on success the returned entity is appended and the input
    /// cleared; on failure the input keeps the user's text.
    pub async fn create_list(&self) {
        let name = self.state.lock().new_list_name.clone();
        if name.trim().is_empty() {
            return;
        }
        let Some(_guard) = self.lock.try_acquire() else {
            return;
        };
        self.state.lock().error = None;

        match self.api.create_task_list(&name).await {
            Ok(list) => {
                debug!(list_id = list.id, "task list created");
                let mut state = self.state.lock();
                state.list_ids.push(list.id);
                state.new_list_name.clear();
                drop(state);
                self.store.insert_list(list);
            }
            Err(e) => {
                self.state.lock().error = Some(e.user_message());
            }
        }
    }

    pub async fn delete_list(&self, list_id: i64) {
        let Some(_guard) = self.lock.try_acquire() else {
            return;
        };
        self.state.lock().error = None;

        match self.api.delete_task_list(list_id).await {
            Ok(()) => {
                let mut state = self.state.lock();
                state.list_ids.retain(|id| *id != list_id);
                state.shared_ids.retain(|id| *id != list_id);
                drop(state);
                self.store.remove_list(list_id);
            }
            Err(e) => {
                self.state.lock().error = Some(e.user_message());
            }
        }
    }

    pub fn lists(&self) -> Vec<TaskList> {
        self.resolve(&self.state.lock().list_ids.clone())
    }

    pub fn shared_lists(&self) -> Vec<TaskList> {
        self.resolve(&self.state.lock().shared_ids.clone())
    }

    fn resolve(&self, ids: &[i64]) -> Vec<TaskList> {
        ids.iter().filter_map(|id| self.store.list(*id)).collect()
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
