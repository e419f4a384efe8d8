#![allow(dead_code)]

use std::future::Future;
use std::time::Duration;

use datastack_domain::Credentials;
use datastack_infra::{AppClient, DataServiceClient, DataStack};
use serde_json::{json, Value};
use wiremock::matchers::{method, path};
use wiremock::{Match, Mock, MockServer, Request, ResponseTemplate};

pub const USERNAME: &str = "admin@appveen.com";
pub const PASSWORD: &str = "secret";
pub const APP: &str = "Adam";
pub const SERVICE_ID: &str = "SRVC2001";

/// Login response with `extra` merged over a minimal valid body.
pub fn login_body(extra: Value) -> Value {
    let mut body = json!({
        "_id": USERNAME,
        "uuid": "u-1",
        "token": "t1",
        "rToken": "r1",
        "expiresIn": 1_700_000_600_000u64,
        "serverTime": 1_700_000_000_000u64
    });
    if let (Some(base), Value::Object(extra)) = (body.as_object_mut(), extra) {
        base.extend(extra);
    }
    body
}

pub fn credentials(server: &MockServer) -> Credentials {
    Credentials::with_password(server.uri(), USERNAME, PASSWORD)
}

pub async fn mount_login(server: &MockServer, body: Value) {
    Mock::given(method("POST"))
        .and(path("/api/a/rbac/login"))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(server)
        .await;
}

/// Logged-in handle whose policy starts no routines.
pub async fn connect(server: &MockServer) -> DataStack {
    mount_login(server, login_body(json!({}))).await;
    DataStack::authenticate_by_credentials(credentials(server)).await.expect("login should succeed")
}

pub async fn app(server: &MockServer, ds: &DataStack) -> AppClient {
    Mock::given(method("GET"))
        .and(path(format!("/api/a/rbac/app/{APP}")))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"_id": APP, "defaultTimezone": "Zulu"})),
        )
        .mount(server)
        .await;
    ds.app(APP).await.expect("app should load")
}

pub fn service_body() -> Value {
    json!({
        "_id": SERVICE_ID,
        "name": "Employees",
        "api": "/employees",
        "app": APP,
        "status": "Active",
        "definition": [
            {"key": "_id", "type": "String", "properties": {"name": "ID"}},
            {
                "key": "name",
                "type": "String",
                "properties": {"name": "Name", "enum": [], "tokens": []}
            }
        ]
    })
}

pub async fn data_service(server: &MockServer, app: &AppClient) -> DataServiceClient {
    Mock::given(method("GET"))
        .and(path("/api/a/sm/service"))
        .and(JsonQueryParam::new("filter", json!({
            "app": APP,
            "$or": [{"name": "Employees"}, {"_id": "Employees"}]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([service_body()])))
        .mount(server)
        .await;
    app.data_service("Employees").await.expect("data service should load")
}

/// Matches a query parameter holding JSON equal to `expected`, whatever the
/// key order.
pub struct JsonQueryParam {
    key: &'static str,
    expected: Value,
}

impl JsonQueryParam {
    pub fn new(key: &'static str, expected: Value) -> Self {
        Self { key, expected }
    }
}

impl Match for JsonQueryParam {
    fn matches(&self, request: &Request) -> bool {
        request
            .url
            .query_pairs()
            .find(|(k, _)| k == self.key)
            .and_then(|(_, v)| serde_json::from_str::<Value>(&v).ok())
            .is_some_and(|v| v == self.expected)
    }
}

/// Number of requests the server saw for `method` and `path`.
pub async fn hits(server: &MockServer, verb: &str, route: &str) -> usize {
    server
        .received_requests()
        .await
        .unwrap_or_default()
        .iter()
        .filter(|r| r.method.as_str() == verb && r.url.path() == route)
        .count()
}

/// Poll `check` until it holds or `deadline` passes; returns the last result.
pub async fn eventually<F, Fut>(deadline: Duration, mut check: F) -> bool
where
    F: FnMut() -> Fut,
    Fut: Future<Output = bool>,
{
    let started = tokio::time::Instant::now();
    loop {
        if check().await {
            return true;
        }
        if started.elapsed() >= deadline {
            return false;
        }
        tokio::time::sleep(Duration::from_millis(25)).await;
    }
}
