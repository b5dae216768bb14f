#![allow(dead_code)]

use acme_board::config::AppConfig;
use acme_board::lifecycle::BoardSystem;
use axum::body::{to_bytes, Body};
use axum::http::{HeaderMap, Method, Request, StatusCode};
use axum::Router;
use tower::ServiceExt;

pub const ALICE: &str = "alice-token";
pub const BOB: &str = "bob-token";

pub fn start() -> BoardSystem {
    let config = AppConfig::from_yaml(
        r#"
server:
  base_url: "https://board.example.org/"
auth:
  tokens:
    - token: "alice-token"
      username: "alice"
    - token: "bob-token"
      username: "bob"
features:
  spam_words: ["viagra", "hard core"]
"#,
    )
    .expect("test config should parse");
    BoardSystem::start(&config).expect("board should start")
}

pub struct Reply {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Vec<u8>,
}

impl Reply {
    pub fn json(&self) -> serde_json::Value {
        serde_json::from_slice(&self.body).expect("body should be JSON")
    }

    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    /// Field names of a 203 error list, in order.
    pub fn error_fields(&self) -> Vec<String> {
        self.json()
            .as_array()
            .expect("errors should be an array")
            .iter()
            .map(|e| e["field"].as_str().unwrap_or_default().to_owned())
            .collect()
    }
}

pub async fn send(
    router: &Router,
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Option<&str>,
) -> Reply {
    let mut request = Request::builder()
        .method(method)
        .uri(uri)
        .header("origin", "https://board.example.org");
    if let Some(token) = token {
        request = request.header("authorization", format!("Bearer {token}"));
    }
    if body.is_some() {
        request = request.header("content-type", "application/json");
    }
    let request = request
        .body(body.map(|b| Body::from(b.to_owned())).unwrap_or_else(Body::empty))
        .expect("request should build");

    let response = router.clone().oneshot(request).await.expect("router is infallible");
    let status = response.status();
    let headers = response.headers().clone();
    let body = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body should be readable")
        .to_vec();
    Reply {
        status,
        headers,
        body,
    }
}
