use serde::{Deserialize, Serialize};

/// A single to-do item. Owned by exactly one task list.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Task {
    pub id: i64,
    pub title: String,
    pub description: Option<String>,
    pub completed: bool,
    pub task_list_id: i64,
}

/// A named collection of tasks. `tasks` stays `None` until the detail
/// endpoint loads it; once present it is the authoritative child set.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TaskList {
    pub id: i64,
    pub name: String,
    pub user_id: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tasks: Option<Vec<Task>>,
}

/// Partial-update payload for `PUT /tasks/{id}`.
#[derive(Debug, Clone, Default, Serialize, PartialEq, Eq)]
pub struct TaskUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed: Option<bool>,
}

impl TaskUpdate {
    pub fn completed(value: bool) -> Self {
        Self {
            completed: Some(value),
            ..Default::default()
        }
    }
}

impl TaskList {
    pub fn task_count(&self) -> usize {
        self.tasks.as_ref().map_or(0, Vec::len)
    }

    pub fn is_loaded(&self) -> bool {
        self.tasks.is_some()
    }

    pub fn task(&self, task_id: i64) -> Option<&Task> {
        self.tasks
            .as_ref()
            .and_then(|tasks| tasks.iter().find(|t| t.id == task_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn list_with_tasks() -> TaskList {
        TaskList {
            id: 1,
            name: "Groceries".to_string(),
            user_id: 3,
            tasks: Some(vec![
                Task {
                    id: 10,
                    title: "Milk".to_string(),
                    description: None,
                    completed: false,
                    task_list_id: 1,
                },
                Task {
                    id: 11,
                    title: "Eggs".to_string(),
                    description: Some("a dozen".to_string()),
                    completed: true,
                    task_list_id: 1,
                },
            ]),
        }
    }

    #[test]
    fn test_unloaded_list_has_zero_tasks() {
        let list = TaskList {
            id: 7,
            name: "Work".to_string(),
            user_id: 3,
            tasks: None,
        };
        assert!(!list.is_loaded());
        assert_eq!(list.task_count(), 0);
    }

    #[test]
    fn test_task_lookup_by_id() {
        let list = list_with_tasks();
        assert_eq!(list.task_count(), 2);
        assert_eq!(list.task(11).unwrap().title, "Eggs");
        assert!(list.task(99).is_none());
    }

    #[test]
    fn test_task_update_completed_payload() {
        let json = serde_json::to_value(TaskUpdate::completed(true)).unwrap();
        assert_eq!(json, serde_json::json!({"completed": true}));
    }

    #[test]
    fn test_task_deserializes_null_description() {
        let task: Task = serde_json::from_str(
            r#"{"id":5,"title":"Call bank","description":null,"completed":false,"task_list_id":2}"#,
        )
        .unwrap();
        assert_eq!(task.description, None);
        assert!(!task.completed);
    }
}
