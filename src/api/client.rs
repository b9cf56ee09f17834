use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::RequestBuilder;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::json;
use tracing::{debug, warn};

use crate::api::error::ApiError;
use crate::domain::task::TaskUpdate;
use crate::domain::user::UserUpdate;
use crate::domain::{SharePermission, Task, TaskList, User};
use crate::session::credentials::CredentialStore;

/// Successful login/register payload. Both fields are mandatory; a 2xx
/// response missing either is an `InvalidResponse`.
#[derive(Debug, Clone)]
pub struct AuthResponse {
    pub user: User,
    pub token: String,
}

/// The TaskShare REST surface. A trait so controllers and the session
/// store can run against a scripted mock in tests.
#[async_trait]
pub trait Api: Send + Sync {
    async fn login(&self, email: &str, password: &str) -> Result<AuthResponse, ApiError>;
    async fn register(
        &self,
        name: &str,
        email: &str,
        username: &str,
        password: &str,
    ) -> Result<AuthResponse, ApiError>;
    async fn current_user(&self) -> Result<User, ApiError>;
    async fn update_user(&self, update: &UserUpdate) -> Result<User, ApiError>;
    async fn task_lists(&self) -> Result<Vec<TaskList>, ApiError>;
    async fn create_task_list(&self, name: &str) -> Result<TaskList, ApiError>;
    async fn task_list(&self, id: i64) -> Result<TaskList, ApiError>;
    async fn update_task_list(&self, id: i64, name: &str) -> Result<TaskList, ApiError>;
    async fn delete_task_list(&self, id: i64) -> Result<(), ApiError>;
    async fn create_task(
        &self,
        list_id: i64,
        title: &str,
        description: Option<&str>,
    ) -> Result<Task, ApiError>;
    async fn update_task(&self, task_id: i64, update: &TaskUpdate) -> Result<Task, ApiError>;
    async fn delete_task(&self, task_id: i64) -> Result<(), ApiError>;
    async fn share_task_list(
        &self,
        list_id: i64,
        username: &str,
        permission: SharePermission,
    ) -> Result<(), ApiError>;
    async fn shared_task_lists(&self) -> Result<Vec<TaskList>, ApiError>;
}

/// Most endpoints wrap their payload as `{ "data": T }`.
#[derive(Deserialize)]
struct Envelope<T> {
    data: T,
}

#[derive(Deserialize)]
struct RawAuth {
    user: Option<User>,
    token: Option<String>,
}

/// reqwest-backed implementation. Stateless beyond the shared client:
/// the bearer credential is re-read from the store on every call, and
/// every call is fire-once (no retries, no caching).
pub struct HttpApi {
    base_url: String,
    http: reqwest::Client,
    timeout: Duration,
    credentials: Arc<dyn CredentialStore>,
}

impl HttpApi {
    pub fn new(
        base_url: impl Into<String>,
        timeout: Duration,
        credentials: Arc<dyn CredentialStore>,
    ) -> Self {
        let base_url = base_url.into();
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            http: reqwest::Client::new(),
            timeout,
            credentials,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Attach `Authorization: Bearer <token>` when a credential exists.
    /// With no credential the request goes out bare and the server's 401
    /// comes back as a typed `Unauthorized`.
    fn with_auth(&self, req: RequestBuilder) -> RequestBuilder {
        match self.credentials.load() {
            Ok(Some(token)) => req.bearer_auth(token),
            Ok(None) => req,
            Err(e) => {
                warn!(error = %e, "failed to read stored credential");
                req
            }
        }
    }

    async fn execute<T: DeserializeOwned>(&self, req: RequestBuilder) -> Result<T, ApiError> {
        let response = req.timeout(self.timeout).send().await?;
        let status = response.status();
        let body = response.text().await?;
        debug!(status = status.as_u16(), "api response");

        if !status.is_success() {
            return Err(ApiError::from_response(status.as_u16(), &body));
        }
        serde_json::from_str::<Envelope<T>>(&body)
            .map(|envelope| envelope.data)
            .map_err(|e| ApiError::InvalidResponse {
                reason: format!("unexpected response body: {e}"),
            })
    }

    /// For endpoints whose `data` is null; only the status matters.
    async fn execute_unit(&self, req: RequestBuilder) -> Result<(), ApiError> {
        let response = req.timeout(self.timeout).send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await?;
            return Err(ApiError::from_response(status.as_u16(), &body));
        }
        Ok(())
    }

    async fn execute_auth(&self, req: RequestBuilder) -> Result<AuthResponse, ApiError> {
        let response = req.timeout(self.timeout).send().await?;
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            return Err(ApiError::from_response(status.as_u16(), &body));
        }
        let raw: RawAuth =
            serde_json::from_str(&body).map_err(|_| ApiError::invalid_response())?;
        match (raw.user, raw.token) {
            (Some(user), Some(token)) => Ok(AuthResponse { user, token }),
            _ => Err(ApiError::invalid_response()),
        }
    }
}

#[async_trait]
impl Api for HttpApi {
    async fn login(&self, email: &str, password: &str) -> Result<AuthResponse, ApiError> {
        let req = self
            .http
            .post(self.url("/login"))
            .json(&json!({ "email": email, "password": password }));
        self.execute_auth(req).await
    }

    async fn register(
        &self,
        name: &str,
        email: &str,
        username: &str,
        password: &str,
    ) -> Result<AuthResponse, ApiError> {
        let req = self.http.post(self.url("/register")).json(&json!({
            "name": name,
            "email": email,
            "username": username,
            "password": password,
        }));
        self.execute_auth(req).await
    }

    async fn current_user(&self) -> Result<User, ApiError> {
        let req = self.with_auth(self.http.get(self.url("/user")));
        self.execute(req).await
    }

    async fn update_user(&self, update: &UserUpdate) -> Result<User, ApiError> {
        let req = self.with_auth(self.http.put(self.url("/user")).json(update));
        self.execute(req).await
    }

    async fn task_lists(&self) -> Result<Vec<TaskList>, ApiError> {
        let req = self.with_auth(self.http.get(self.url("/task-lists")));
        self.execute(req).await
    }

    async fn create_task_list(&self, name: &str) -> Result<TaskList, ApiError> {
        let req = self.with_auth(
            self.http
                .post(self.url("/task-lists"))
                .json(&json!({ "name": name })),
        );
        self.execute(req).await
    }

    async fn task_list(&self, id: i64) -> Result<TaskList, ApiError> {
        let req = self.with_auth(self.http.get(self.url(&format!("/task-lists/{id}"))));
        self.execute(req).await
    }

    async fn update_task_list(&self, id: i64, name: &str) -> Result<TaskList, ApiError> {
        let req = self.with_auth(
            self.http
                .put(self.url(&format!("/task-lists/{id}")))
                .json(&json!({ "name": name })),
        );
        self.execute(req).await
    }

    async fn delete_task_list(&self, id: i64) -> Result<(), ApiError> {
        let req = self.with_auth(self.http.delete(self.url(&format!("/task-lists/{id}"))));
        self.execute_unit(req).await
    }

    async fn create_task(
        &self,
        list_id: i64,
        title: &str,
        description: Option<&str>,
    ) -> Result<Task, ApiError> {
        let req = self.with_auth(
            self.http
                .post(self.url(&format!("/task-lists/{list_id}/tasks")))
                .json(&json!({ "title": title, "description": description })),
        );
        self.execute(req).await
    }

    async fn update_task(&self, task_id: i64, update: &TaskUpdate) -> Result<Task, ApiError> {
        let req = self.with_auth(self.http.put(self.url(&format!("/tasks/{task_id}"))).json(update));
        self.execute(req).await
    }

    async fn delete_task(&self, task_id: i64) -> Result<(), ApiError> {
        let req = self.with_auth(self.http.delete(self.url(&format!("/tasks/{task_id}"))));
        self.execute_unit(req).await
    }

    async fn share_task_list(
        &self,
        list_id: i64,
        username: &str,
        permission: SharePermission,
    ) -> Result<(), ApiError> {
        let req = self.with_auth(
            self.http
                .post(self.url(&format!("/task-lists/{list_id}/share")))
                .json(&json!({ "username": username, "permission": permission })),
        );
        self.execute_unit(req).await
    }

    async fn shared_task_lists(&self) -> Result<Vec<TaskList>, ApiError> {
        let req = self.with_auth(self.http.get(self.url("/shared-lists")));
        self.execute(req).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::credentials::MemoryCredentialStore;

    fn api(base: &str) -> HttpApi {
        HttpApi::new(
            base,
            Duration::from_secs(10),
            Arc::new(MemoryCredentialStore::default()),
        )
    }

    #[test]
    fn test_base_url_trailing_slash_normalized() {
        let api = api("http://localhost:8000/");
        assert_eq!(api.url("/task-lists"), "http://localhost:8000/task-lists");
    }

    #[test]
    fn test_envelope_decodes_data_field() {
        let body = r#"{"data":{"id":7,"name":"Groceries","user_id":3}}"#;
        let envelope: Envelope<TaskList> = serde_json::from_str(body).unwrap();
        assert_eq!(envelope.data.id, 7);
        assert_eq!(envelope.data.tasks, None);
    }

    #[test]
    fn test_raw_auth_requires_both_fields() {
        let raw: RawAuth = serde_json::from_str(r#"{"token":"abc"}"#).unwrap();
        assert!(raw.user.is_none());
        let raw: RawAuth = serde_json::from_str(
            r#"{"user":{"id":1,"name":"A","email":"a@b.c","username":"a"},"token":"t"}"#,
        )
        .unwrap();
        assert!(raw.user.is_some() && raw.token.is_some());
    }
}
