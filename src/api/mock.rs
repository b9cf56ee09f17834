//! Scripted in-memory implementation of [`Api`] for tests. Responses are
//! queued per operation, every call is recorded, and failures can be
//! injected to exercise the confirm-then-patch error paths.

use std::collections::{HashMap, VecDeque};

use async_trait::async_trait;
use parking_lot::Mutex;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use tokio::time::{Duration, sleep};

use crate::api::client::{Api, AuthResponse};
use crate::api::error::ApiError;
use crate::domain::task::TaskUpdate;
use crate::domain::user::UserUpdate;
use crate::domain::{SharePermission, Task, TaskList, User};

/// Failure to hand back for an operation. Converted to [`ApiError`] at
/// the point of the call (ApiError itself is not Clone).
#[derive(Debug, Clone)]
pub enum MockFailure {
    Unauthorized(String),
    Server(u16, String),
    InvalidResponse,
}

impl From<MockFailure> for ApiError {
    fn from(failure: MockFailure) -> Self {
        match failure {
            MockFailure::Unauthorized(message) => ApiError::Unauthorized { message },
            MockFailure::Server(status, message) => ApiError::Server { status, message },
            MockFailure::InvalidResponse => ApiError::invalid_response(),
        }
    }
}

#[derive(Debug, Clone)]
struct ScriptedResponse {
    outcome: Result<Value, MockFailure>,
    delay_ms: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedCall {
    pub operation: &'static str,
    pub args: Vec<String>,
}

#[derive(Default)]
pub struct MockApi {
    script: Mutex<HashMap<&'static str, VecDeque<ScriptedResponse>>>,
    calls: Mutex<Vec<RecordedCall>>,
}

impl MockApi {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a successful response for `operation`. The value must have
    /// the shape the operation deserializes (e.g. a `TaskList` object for
    /// `create_task_list`).
    pub fn expect(&self, operation: &'static str, value: Value) {
        self.push(operation, Ok(value), 0);
    }

    /// Queue a successful response delivered after `delay_ms`.
    pub fn expect_delayed(&self, operation: &'static str, value: Value, delay_ms: u64) {
        self.push(operation, Ok(value), delay_ms);
    }

    /// Queue a failure for `operation`.
    pub fn fail(&self, operation: &'static str, failure: MockFailure) {
        self.push(operation, Err(failure), 0);
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().clone()
    }

    pub fn call_count(&self, operation: &str) -> usize {
        self.calls
            .lock()
            .iter()
            .filter(|c| c.operation == operation)
            .count()
    }

    fn push(&self, operation: &'static str, outcome: Result<Value, MockFailure>, delay_ms: u64) {
        self.script
            .lock()
            .entry(operation)
            .or_default()
            .push_back(ScriptedResponse { outcome, delay_ms });
    }

    async fn invoke<T: DeserializeOwned>(
        &self,
        operation: &'static str,
        args: Vec<String>,
    ) -> Result<T, ApiError> {
        self.calls.lock().push(RecordedCall { operation, args });

        let scripted = self.script.lock().get_mut(operation).and_then(VecDeque::pop_front);
        let Some(response) = scripted else {
            return Err(ApiError::InvalidResponse {
                reason: format!("no scripted response for `{operation}`"),
            });
        };
        if response.delay_ms > 0 {
            sleep(Duration::from_millis(response.delay_ms)).await;
        }
        let value = response.outcome.map_err(ApiError::from)?;
        serde_json::from_value(value).map_err(|e| ApiError::InvalidResponse {
            reason: format!("mock value for `{operation}` has the wrong shape: {e}"),
        })
    }
}

#[derive(serde::Deserialize)]
struct MockAuth {
    user: User,
    token: String,
}

#[async_trait]
impl Api for MockApi {
    async fn login(&self, email: &str, password: &str) -> Result<AuthResponse, ApiError> {
        let auth: MockAuth = self
            .invoke("login", vec![email.to_string(), password.to_string()])
            .await?;
        Ok(AuthResponse {
            user: auth.user,
            token: auth.token,
        })
    }

    async fn register(
        &self,
        name: &str,
        email: &str,
        username: &str,
        password: &str,
    ) -> Result<AuthResponse, ApiError> {
        let auth: MockAuth = self
            .invoke(
                "register",
                vec![
                    name.to_string(),
                    email.to_string(),
                    username.to_string(),
                    password.to_string(),
                ],
            )
            .await?;
        Ok(AuthResponse {
            user: auth.user,
            token: auth.token,
        })
    }

    async fn current_user(&self) -> Result<User, ApiError> {
        self.invoke("current_user", vec![]).await
    }

    async fn update_user(&self, update: &UserUpdate) -> Result<User, ApiError> {
        let args = vec![serde_json::to_string(update).unwrap_or_default()];
        self.invoke("update_user", args).await
    }

    async fn task_lists(&self) -> Result<Vec<TaskList>, ApiError> {
        self.invoke("task_lists", vec![]).await
    }

    async fn create_task_list(&self, name: &str) -> Result<TaskList, ApiError> {
        self.invoke("create_task_list", vec![name.to_string()]).await
    }

    async fn task_list(&self, id: i64) -> Result<TaskList, ApiError> {
        self.invoke("task_list", vec![id.to_string()]).await
    }

    async fn update_task_list(&self, id: i64, name: &str) -> Result<TaskList, ApiError> {
        self.invoke("update_task_list", vec![id.to_string(), name.to_string()])
            .await
    }

    async fn delete_task_list(&self, id: i64) -> Result<(), ApiError> {
        self.invoke::<Value>("delete_task_list", vec![id.to_string()])
            .await
            .map(|_| ())
    }

    async fn create_task(
        &self,
        list_id: i64,
        title: &str,
        description: Option<&str>,
    ) -> Result<Task, ApiError> {
        self.invoke(
            "create_task",
            vec![
                list_id.to_string(),
                title.to_string(),
                description.unwrap_or_default().to_string(),
            ],
        )
        .await
    }

    async fn update_task(&self, task_id: i64, update: &TaskUpdate) -> Result<Task, ApiError> {
        let args = vec![
            task_id.to_string(),
            serde_json::to_string(update).unwrap_or_default(),
        ];
        self.invoke("update_task", args).await
    }

    async fn delete_task(&self, task_id: i64) -> Result<(), ApiError> {
        self.invoke::<Value>("delete_task", vec![task_id.to_string()])
            .await
            .map(|_| ())
    }

    async fn share_task_list(
        &self,
        list_id: i64,
        username: &str,
        permission: SharePermission,
    ) -> Result<(), ApiError> {
        self.invoke::<Value>(
            "share_task_list",
            vec![
                list_id.to_string(),
                username.to_string(),
                permission.to_string(),
            ],
        )
        .await
        .map(|_| ())
    }

    async fn shared_task_lists(&self) -> Result<Vec<TaskList>, ApiError> {
        self.invoke("shared_task_lists", vec![]).await
    }
}

/// JSON helpers so tests stay terse.
pub fn user_json(id: i64, name: &str, email: &str, username: &str) -> Value {
    json!({ "id": id, "name": name, "email": email, "username": username })
}

pub fn list_json(id: i64, name: &str, user_id: i64) -> Value {
    json!({ "id": id, "name": name, "user_id": user_id })
}

pub fn task_json(id: i64, title: &str, completed: bool, list_id: i64) -> Value {
    json!({
        "id": id,
        "title": title,
        "description": null,
        "completed": completed,
        "task_list_id": list_id,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_scripted_responses_pop_in_order() {
        let api = MockApi::new();
        api.expect("create_task_list", list_json(1, "First", 3));
        api.expect("create_task_list", list_json(2, "Second", 3));

        assert_eq!(api.create_task_list("First").await.unwrap().id, 1);
        assert_eq!(api.create_task_list("Second").await.unwrap().id, 2);
        assert_eq!(api.call_count("create_task_list"), 2);
    }

    #[tokio::test]
    async fn test_unscripted_call_errors() {
        let api = MockApi::new();
        let err = api.task_lists().await.unwrap_err();
        assert!(err.user_message().contains("no scripted response"));
    }

    #[tokio::test]
    async fn test_injected_failure_converts_to_api_error() {
        let api = MockApi::new();
        api.fail(
            "delete_task",
            MockFailure::Unauthorized("Unauthenticated.".to_string()),
        );
        let err = api.delete_task(42).await.unwrap_err();
        assert!(err.is_unauthorized());
    }

    #[tokio::test]
    async fn test_calls_record_arguments() {
        let api = MockApi::new();
        api.expect("delete_task_list", Value::Null);
        api.delete_task_list(9).await.unwrap();
        assert_eq!(
            api.calls(),
            vec![RecordedCall {
                operation: "delete_task_list",
                args: vec!["9".to_string()],
            }]
        );
    }
}
