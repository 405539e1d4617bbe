//! Login flow against a mock backend.

mod fixtures;

use fixtures::{data, user_json};
use purchasedesk::auth::SessionStore;
use purchasedesk::routes::login::{LoginForm, LOGIN_FAILED};
use purchasedesk::routes::users::{LoadState, UserListView};
use purchasedesk::{AppState, Config, Route};
use serde_json::json;
use tempfile::TempDir;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test]
async fn test_login_stores_token_and_sends_it_afterwards() {
    let server = MockServer::start().await;
    let temp_dir = TempDir::new().unwrap();
    let session_path = temp_dir.path().join("session.json");

    Mock::given(method("POST"))
        .and(path("/v1/auth/login"))
        .and(body_json(json!({ "email": "a@b.com", "password": "x" })))
        .respond_with(data(json!("tok123")))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/v1/users"))
        .and(header("Authorization", "tok123"))
        .respond_with(data(json!([user_json(7, "Ada", vec![])])))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/v1/purchases"))
        .and(header("Authorization", "tok123"))
        .respond_with(data(json!([])))
        .expect(1)
        .mount(&server)
        .await;

    let config = Config::for_api(&server.uri(), &session_path).unwrap();
    let session = SessionStore::open(&session_path).unwrap();
    let mut state = AppState::new(config, session, Route::Login);

    assert!(LoginForm::new("a@b.com", "x").submit(&mut state).await);
    assert_eq!(state.navigator.current(), Route::Users);
    assert!(state.notifier.is_empty());

    // Durable across reopen.
    let reopened = SessionStore::open(&session_path).unwrap();
    assert_eq!(reopened.token().as_deref(), Some("tok123"));

    let mut view = UserListView::mount(&state);
    view.load(&mut state).await;
    assert_eq!(view.load_state(), LoadState::Loaded);
    assert_eq!(view.users().len(), 1);
}

#[tokio::test]
async fn test_rejected_login_keeps_user_on_login_screen() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/auth/login"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let config = Config::for_api(&server.uri(), "unused.json").unwrap();
    let mut state = AppState::new(config, SessionStore::in_memory(), Route::Login);

    assert!(!LoginForm::new("a@b.com", "wrong").submit(&mut state).await);
    assert_eq!(state.navigator.current(), Route::Login);
    assert_eq!(state.notifier.visible().unwrap().message, LOGIN_FAILED);
    assert!(state.session().token().is_none());
}

#[tokio::test]
async fn test_requests_go_out_without_token() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/users"))
        .respond_with(ResponseTemplate::new(401))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/v1/purchases"))
        .respond_with(ResponseTemplate::new(401))
        .expect(1)
        .mount(&server)
        .await;

    let config = Config::for_api(&server.uri(), "unused.json").unwrap();
    let mut state = AppState::new(config, SessionStore::in_memory(), Route::Users);
    let mut view = UserListView::mount(&state);
    view.load(&mut state).await;

    let requests = server.received_requests().await.unwrap();
    assert!(requests
        .iter()
        .all(|r| !r.headers.contains_key("authorization")));
    assert_eq!(state.navigator.current(), Route::Login);
    assert!(!view.is_mounted());
}
