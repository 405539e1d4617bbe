//! Backend fixtures shared by the integration tests.

#![allow(dead_code)]

use purchasedesk::auth::SessionStore;
use purchasedesk::{AppState, Config, ErrorPolicy, Route};
use serde_json::{json, Value};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub fn purchase_json(id: i64, name: &str, price: f64, owner: (i64, &str)) -> Value {
    json!({
        "id": id,
        "name": name,
        "price": price,
        "created_at": format!("2024-03-{:02}T10:00:00Z", (id % 28) + 1),
        "user": { "id": owner.0, "name": owner.1 },
    })
}

pub fn user_json(id: i64, name: &str, purchases: Vec<Value>) -> Value {
    json!({
        "id": id,
        "name": name,
        "email": format!("{}@b.com", name.to_lowercase()),
        "purchases": purchases,
    })
}

pub fn data(value: Value) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({ "data": value }))
}

pub fn state_for(server: &MockServer, policy: ErrorPolicy, start: Route) -> AppState {
    let mut config = Config::for_api(&server.uri(), "unused-session.json").unwrap();
    config.error_policy = policy;
    let session = SessionStore::in_memory();
    session.set_token("tok123").unwrap();
    AppState::new(config, session, start)
}

pub async fn mount_get(server: &MockServer, route: &str, body: Value) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(data(body))
        .mount(server)
        .await;
}

/// Requests received so far as `METHOD path` strings.
pub async fn request_log(server: &MockServer) -> Vec<String> {
    server
        .received_requests()
        .await
        .unwrap_or_default()
        .iter()
        .map(|r| format!("{} {}", r.method.as_str(), r.url.path()))
        .collect()
}
