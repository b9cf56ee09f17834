//! Normalized client-side cache of server entities. All controllers read
//! and write through one `EntityStore`, and the only values ever written
//! are entities a successful server response returned, so two views of
//! the same list can no longer drift apart.

use std::collections::HashMap;

use parking_lot::RwLock;

use crate::domain::{Task, TaskList};

#[derive(Default)]
struct Entities {
    /// List metadata, keyed by list id. `tasks` is always `None` here;
    /// membership lives in `list_tasks`.
    lists: HashMap<i64, TaskList>,
    /// Tasks keyed by task id.
    tasks: HashMap<i64, Task>,
    /// Ordered task ids per list. Absent until a detail fetch loads the
    /// list's children (a list may stay partially loaded indefinitely).
    list_tasks: HashMap<i64, Vec<i64>>,
}

#[derive(Default)]
pub struct EntityStore {
    inner: RwLock<Entities>,
}

impl EntityStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Upsert a server-returned list. A detail payload (tasks present)
    /// replaces the list's whole child set; a summary payload (tasks
    /// absent) touches only the metadata and leaves loaded children
    /// alone.
    pub fn insert_list(&self, list: TaskList) {
        let mut inner = self.inner.write();
        let TaskList {
            id,
            name,
            user_id,
            tasks,
        } = list;

        if let Some(tasks) = tasks {
            if let Some(old_ids) = inner.list_tasks.remove(&id) {
                for task_id in old_ids {
                    inner.tasks.remove(&task_id);
                }
            }
            let ids: Vec<i64> = tasks.iter().map(|t| t.id).collect();
            for task in tasks {
                inner.tasks.insert(task.id, task);
            }
            inner.list_tasks.insert(id, ids);
        }
        inner.lists.insert(
            id,
            TaskList {
                id,
                name,
                user_id,
                tasks: None,
            },
        );
    }

    pub fn insert_lists(&self, lists: Vec<TaskList>) {
        for list in lists {
            self.insert_list(list);
        }
    }

    pub fn remove_list(&self, id: i64) {
        let mut inner = self.inner.write();
        inner.lists.remove(&id);
        if let Some(task_ids) = inner.list_tasks.remove(&id) {
            for task_id in task_ids {
                inner.tasks.remove(&task_id);
            }
        }
    }

    /// Upsert a server-returned task: full replace by id, never a field
    /// merge. A task new to a loaded list is appended at the end. When
    /// the list's child set was never loaded there is no membership to
    /// attach to, so the task is not cached at all; the next detail load
    /// brings the authoritative set.
    pub fn insert_task(&self, task: Task) {
        let mut inner = self.inner.write();
        let list_id = task.task_list_id;
        let task_id = task.id;
        let Some(ids) = inner.list_tasks.get_mut(&list_id) else {
            return;
        };
        if !ids.contains(&task_id) {
            ids.push(task_id);
        }
        inner.tasks.insert(task_id, task);
    }

    pub fn remove_task(&self, task_id: i64) {
        let mut inner = self.inner.write();
        if let Some(task) = inner.tasks.remove(&task_id) {
            if let Some(ids) = inner.list_tasks.get_mut(&task.task_list_id) {
                ids.retain(|id| *id != task_id);
            }
        }
    }

    /// Denormalized clone of a list: `tasks` is `Some` (in load order)
    /// once the child set has been loaded, `None` before that.
    pub fn list(&self, id: i64) -> Option<TaskList> {
        let inner = self.inner.read();
        let mut list = inner.lists.get(&id).cloned()?;
        if let Some(ids) = inner.list_tasks.get(&id) {
            list.tasks = Some(
                ids.iter()
                    .filter_map(|task_id| inner.tasks.get(task_id).cloned())
                    .collect(),
            );
        }
        Some(list)
    }

    pub fn task(&self, task_id: i64) -> Option<Task> {
        self.inner.read().tasks.get(&task_id).cloned()
    }

    pub fn contains_list(&self, id: i64) -> bool {
        self.inner.read().lists.contains_key(&id)
    }
}
