//! Full client flow over the scripted API: silent resume, login, list and
//! task management, sharing, logout and the re-gating that follows.

use std::sync::Arc;

use serde_json::json;

use taskshare::api::mock::{MockApi, MockFailure, list_json, task_json, user_json};
use taskshare::controllers::{
    DashboardController, LoginController, Navigation, TaskListController,
};
use taskshare::domain::SharePermission;
use taskshare::session::{
    AuthGate, CredentialStore, GateDecision, MemoryCredentialStore, SessionStore,
};
use taskshare::store::EntityStore;

#[tokio::test]
async fn test_full_session_and_list_lifecycle() {
    let api = Arc::new(MockApi::new());
    let credentials = Arc::new(MemoryCredentialStore::with_token("stale-token"));
    let session = Arc::new(SessionStore::new(credentials.clone()));
    let store = Arc::new(EntityStore::new());
    let gate = AuthGate::new();

    // Startup: the persisted token is stale; the resume failure is
    // swallowed and the viewer just starts logged out.
    api.fail(
        "current_user",
        MockFailure::Unauthorized("Unauthenticated.".to_string()),
    );
    session.initialize(api.as_ref()).await;
    assert_eq!(gate.evaluate(&session), GateDecision::RedirectToLogin);

    // Login stores the fresh token and resolves the user.
    api.expect(
        "login",
        json!({
            "user": user_json(3, "Alice", "alice@example.com", "alice"),
            "token": "fresh-token",
        }),
    );
    let login = LoginController::new(api.clone(), session.clone(), credentials.clone());
    assert_eq!(
        login.submit("alice@example.com", "secret").await,
        Navigation::Dashboard
    );
    assert_eq!(credentials.load().unwrap(), Some("fresh-token".to_string()));
    assert!(matches!(gate.evaluate(&session), GateDecision::Allow(_)));

    // Dashboard: one existing list, then create a second.
    let dashboard = DashboardController::new(api.clone(), store.clone());
    api.expect("task_lists", json!([list_json(1, "Groceries", 3)]));
    assert_eq!(dashboard.load().await, Navigation::None);

    api.expect("create_task_list", list_json(7, "Chores", 3));
    dashboard.set_new_list_name("Chores");
    dashboard.create_list().await;
    let ids: Vec<i64> = dashboard.lists().into_iter().map(|l| l.id).collect();
    assert_eq!(ids, vec![1, 7]);

    // Detail view: load, add, toggle, delete, share.
    let detail = TaskListController::new(api.clone(), credentials.clone(), store.clone(), 1);
    api.expect(
        "task_list",
        json!({
            "id": 1,
            "name": "Groceries",
            "user_id": 3,
            "tasks": [task_json(10, "Milk", false, 1)],
        }),
    );
    assert_eq!(detail.load().await, Navigation::None);

    api.expect("create_task", task_json(11, "Eggs", false, 1));
    detail.set_new_task_title("Eggs");
    detail.add_task().await;

    api.expect("update_task", task_json(11, "Eggs", true, 1));
    detail.toggle_task(11).await;

    api.expect("delete_task", serde_json::Value::Null);
    detail.delete_task(10).await;

    let tasks = detail.list().unwrap().tasks.unwrap();
    assert_eq!(tasks.len(), 1);
    assert_eq!(tasks[0].id, 11);
    assert!(tasks[0].completed);

    api.expect("share_task_list", serde_json::Value::Null);
    detail.set_share_username("bob");
    detail.share(SharePermission::Edit).await;
    assert_eq!(detail.share_username(), "");

    // The dashboard sees the same entities through the shared store.
    let dashboard_view = dashboard
        .lists()
        .into_iter()
        .find(|l| l.id == 1)
        .unwrap();
    assert_eq!(dashboard_view.task_count(), 1);

    // Logout erases the credential and re-gates protected views with
    // exactly one redirect.
    session.log_out();
    assert_eq!(credentials.load().unwrap(), None);
    assert_eq!(session.current_user(), None);
    assert_eq!(gate.evaluate(&session), GateDecision::RedirectToLogin);
    assert_eq!(gate.evaluate(&session), GateDecision::Denied);
}

#[tokio::test]
async fn test_expired_session_redirects_from_both_collection_views() {
    let api = Arc::new(MockApi::new());
    let credentials = Arc::new(MemoryCredentialStore::with_token("expired"));
    let store = Arc::new(EntityStore::new());

    api.fail(
        "task_lists",
        MockFailure::Unauthorized("Unauthenticated.".to_string()),
    );
    let dashboard = DashboardController::new(api.clone(), store.clone());
    assert_eq!(dashboard.load().await, Navigation::Login);

    api.fail(
        "task_list",
        MockFailure::Unauthorized("Unauthenticated.".to_string()),
    );
    let detail = TaskListController::new(api.clone(), credentials, store, 1);
    assert_eq!(detail.load().await, Navigation::Login);
}
