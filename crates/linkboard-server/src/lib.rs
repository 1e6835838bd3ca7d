//! HTTP layer for Linkboard.
//!
//! Exposes an axum [`Router`] over any [`LinkStore`]: account signup and
//! signin, bulk link ingestion, browsing, tag listing and open tracking.

pub mod auth;
pub mod error;
pub mod handlers;

pub use error::Error;

use std::{path::PathBuf, sync::Arc};

use axum::{
  Json, Router,
  http::{Method, header},
  routing::{get, post},
};
use linkboard_core::store::LinkStore;
use serde::Deserialize;
use serde_json::{Value, json};
use tower_http::{
  cors::{AllowOrigin, CorsLayer},
  trace::TraceLayer,
};

use auth::TokenSigner;
use handlers::{account, jobs, opens, tags};

// ─── Configuration ────────────────────────────────────────────────────────────

/// Runtime server configuration, deserialised from `config.toml` and
/// `LINKBOARD_*` environment variables.
#[derive(Deserialize, Clone)]
pub struct ServerConfig {
  #[serde(default = "default_host")]
  pub host:            String,
  #[serde(default = "default_port")]
  pub port:            u16,
  #[serde(default = "default_store_path")]
  pub store_path:      PathBuf,
  /// Key for signing bearer tokens. Required.
  pub token_secret:    String,
  #[serde(default = "default_token_ttl_hours")]
  pub token_ttl_hours: i64,
}

fn default_host() -> String { "127.0.0.1".to_string() }

fn default_port() -> u16 { 3001 }

fn default_store_path() -> PathBuf { PathBuf::from("linkboard.sqlite") }

fn default_token_ttl_hours() -> i64 { 24 * 7 }

// ─── Application state ────────────────────────────────────────────────────────

/// Shared state threaded through all axum handlers.
#[derive(Clone)]
pub struct AppState<S: LinkStore> {
  pub store:  Arc<S>,
  pub tokens: Arc<TokenSigner>,
}

// ─── Router ───────────────────────────────────────────────────────────────────

/// Build the axum [`Router`] for the Linkboard API.
pub fn router<S>(state: AppState<S>) -> Router
where
  S: LinkStore + Clone + Send + Sync + 'static,
{
  let cors = CorsLayer::new()
    .allow_origin(AllowOrigin::mirror_request())
    .allow_credentials(true)
    .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
    .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE, Method::OPTIONS]);

  Router::new()
    .route("/health", get(health))
    // Accounts
    .route("/auth/signup", post(account::signup::<S>))
    .route("/auth/signin", post(account::signin::<S>))
    // Links
    .route("/jobs", get(jobs::list::<S>))
    .route("/jobs/bulk", post(jobs::bulk::<S>))
    .route("/tags", get(tags::list::<S>))
    // Opens
    .route("/opens", post(opens::record::<S>))
    .route("/opens/last", post(opens::last::<S>))
    .layer(TraceLayer::new_for_http())
    .layer(cors)
    .with_state(state)
}

async fn health() -> Json<Value> { Json(json!({ "status": "ok" })) }

// ─── Integration tests ────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
  use super::*;

  use axum::{
    body::Body,
    http::{Request, StatusCode},
  };
  use chrono::Duration;
  use linkboard_store_sqlite::SqliteStore;
  use tower::ServiceExt as _;

  async fn make_state() -> AppState<SqliteStore> {
    AppState {
      store:  Arc::new(SqliteStore::open_in_memory().await.unwrap()),
      tokens: Arc::new(TokenSigner::new("test-secret", Duration::hours(1))),
    }
  }

  async fn send(
    state:  &AppState<SqliteStore>,
    method: &str,
    uri:    &str,
    token:  Option<&str>,
    body:   Option<Value>,
  ) -> (StatusCode, axum::http::HeaderMap, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
      builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    let req = match body {
      Some(json) => builder
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(json.to_string()))
        .unwrap(),
      None => builder.body(Body::empty()).unwrap(),
    };

    let resp = router(state.clone()).oneshot(req).await.unwrap();
    let status = resp.status();
    let headers = resp.headers().clone();
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    let value = if bytes.is_empty() {
      Value::Null
    } else {
      serde_json::from_slice(&bytes).unwrap()
    };
    (status, headers, value)
  }

  async fn signup(state: &AppState<SqliteStore>, email: &str) -> String {
    let (status, _, body) = send(
      state,
      "POST",
      "/auth/signup",
      None,
      Some(json!({ "email": email, "password": "correct horse" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    body["token"].as_str().unwrap().to_string()
  }

  // ── Accounts ─────────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn health_is_ok() {
    let state = make_state().await;
    let (status, _, body) = send(&state, "GET", "/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
  }

  #[tokio::test]
  async fn signup_then_signin() {
    let state = make_state().await;
    signup(&state, "ada@example.com").await;

    let (status, _, body) = send(
      &state,
      "POST",
      "/auth/signin",
      None,
      Some(json!({ "email": "ada@example.com", "password": "correct horse" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let actor = state.tokens.verify(body["token"].as_str().unwrap()).unwrap();
    assert_eq!(actor.email, "ada@example.com");
  }

  #[tokio::test]
  async fn duplicate_signup_conflicts() {
    let state = make_state().await;
    signup(&state, "ada@example.com").await;
    let (status, _, _) = send(
      &state,
      "POST",
      "/auth/signup",
      None,
      Some(json!({ "email": "ada@example.com", "password": "other" })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
  }

  #[tokio::test]
  async fn blank_signup_is_rejected() {
    let state = make_state().await;
    let (status, _, _) = send(
      &state,
      "POST",
      "/auth/signup",
      None,
      Some(json!({ "email": "  ", "password": "x" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
  }

  #[tokio::test]
  async fn signin_with_wrong_password_or_unknown_email_is_401() {
    let state = make_state().await;
    signup(&state, "ada@example.com").await;

    for (email, password) in [("ada@example.com", "wrong"), ("bob@example.com", "correct horse")] {
      let (status, _, _) = send(
        &state,
        "POST",
        "/auth/signin",
        None,
        Some(json!({ "email": email, "password": password })),
      )
      .await;
      assert_eq!(status, StatusCode::UNAUTHORIZED, "{email}");
    }
  }

  // ── Jobs ─────────────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn bulk_requires_a_token() {
    let state = make_state().await;
    let (status, headers, _) = send(
      &state,
      "POST",
      "/jobs/bulk",
      None,
      Some(json!({ "urlsText": "https://x.com", "tags": [] })),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert!(headers.contains_key(header::WWW_AUTHENTICATE));

    let (status, _, _) = send(
      &state,
      "POST",
      "/jobs/bulk",
      Some("forged.token"),
      Some(json!({ "urlsText": "https://x.com", "tags": [] })),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
  }

  #[tokio::test]
  async fn bulk_then_browse_by_tag() {
    let state = make_state().await;
    let token = signup(&state, "ada@example.com").await;

    let (status, _, result) = send(
      &state,
      "POST",
      "/jobs/bulk",
      Some(&token),
      Some(json!({
        "urlsText": "https://x.com\nhttps://x.com\n\nhttps://y.com",
        "tags": ["t1"],
      })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(result["created"].as_array().unwrap().len(), 2);
    assert_eq!(result["created"][0]["tags"], json!(["t1"]));
    assert_eq!(result["duplicatesInPaste"], json!(["https://x.com"]));
    assert_eq!(result["duplicatesExisting"], json!([]));
    assert_eq!(result["invalidOrEmpty"].as_array().unwrap().len(), 1);

    let (status, _, page) = send(&state, "GET", "/jobs?tag=t1&pageSize=1", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(page["items"].as_array().unwrap().len(), 1);
    assert_eq!(page["meta"]["totalCount"], 2);
    assert_eq!(page["meta"]["totalPages"], 2);
    assert_eq!(page["meta"]["tags"], json!(["t1"]));
    assert_eq!(page["items"][0]["createdByUserEmail"], "ada@example.com");
    assert!(page["items"][0]["lastOpenedAt"].is_null());

    let (_, _, none) = send(&state, "GET", "/jobs?tag=t1&tag=other", None, None).await;
    assert_eq!(none["meta"]["totalCount"], 0);
    assert_eq!(none["meta"]["totalPages"], 1);
  }

  #[tokio::test]
  async fn oversized_paste_is_reported_in_band() {
    let state = make_state().await;
    let token = signup(&state, "ada@example.com").await;
    let text: Vec<String> = (0..101).map(|i| format!("https://jobs.example/{i}")).collect();

    let (status, _, result) = send(
      &state,
      "POST",
      "/jobs/bulk",
      Some(&token),
      Some(json!({ "urlsText": text.join("\n"), "tags": ["t"] })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(result["created"], json!([]));
    assert_eq!(result["invalidOrEmpty"], json!(["Too many URLs: 101 (max 100)"]));

    let (_, _, tags) = send(&state, "GET", "/tags", None, None).await;
    assert_eq!(tags, json!([]));
  }

  #[tokio::test]
  async fn non_numeric_paging_falls_back_to_defaults() {
    let state = make_state().await;
    let (status, _, page) = send(&state, "GET", "/jobs?page=x&pageSize=abc", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(page["meta"]["page"], 1);
    assert_eq!(page["meta"]["pageSize"], 25);
  }

  #[tokio::test]
  async fn tags_are_listed_by_name() {
    let state = make_state().await;
    let token = signup(&state, "ada@example.com").await;
    send(
      &state,
      "POST",
      "/jobs/bulk",
      Some(&token),
      Some(json!({ "urlsText": "https://x.com", "tags": ["remote", " backend "] })),
    )
    .await;

    let (status, _, tags) = send(&state, "GET", "/tags", None, None).await;
    assert_eq!(status, StatusCode::OK);
    let names: Vec<&str> = tags
      .as_array()
      .unwrap()
      .iter()
      .map(|t| t["name"].as_str().unwrap())
      .collect();
    assert_eq!(names, vec!["backend", "remote"]);
  }

  // ── Opens ────────────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn opens_require_a_token() {
    let state = make_state().await;
    for uri in ["/opens", "/opens/last"] {
      let (status, _, _) =
        send(&state, "POST", uri, None, Some(json!({ "jobLinkIds": [] }))).await;
      assert_eq!(status, StatusCode::UNAUTHORIZED, "{uri}");
    }
  }

  #[tokio::test]
  async fn record_opens_and_read_them_back() {
    let state = make_state().await;
    let token = signup(&state, "ada@example.com").await;

    let (_, _, result) = send(
      &state,
      "POST",
      "/jobs/bulk",
      Some(&token),
      Some(json!({ "urlsText": "https://a.example\nhttps://b.example", "tags": [] })),
    )
    .await;
    let a = result["created"][0]["id"].clone();
    let b = result["created"][1]["id"].clone();

    let (status, _, recorded) = send(
      &state,
      "POST",
      "/opens",
      Some(&token),
      Some(json!({ "jobLinkIds": [a, a] })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(recorded["inserted"], 2);

    let (_, _, last) = send(
      &state,
      "POST",
      "/opens/last",
      Some(&token),
      Some(json!({ "jobLinkIds": [a, b] })),
    )
    .await;
    let last = last.as_array().unwrap();
    assert_eq!(last.len(), 1);
    assert_eq!(last[0]["jobLinkId"], a);
    assert!(last[0]["lastOpenedAt"].is_string());

    // Authenticated browse carries the viewer's last-opened times.
    let (_, _, page) = send(&state, "GET", "/jobs", Some(&token), None).await;
    for item in page["items"].as_array().unwrap() {
      assert_eq!(item["lastOpenedAt"].is_string(), item["id"] == a, "{item}");
    }

    // Anonymous browse does not.
    let (_, _, page) = send(&state, "GET", "/jobs", None, None).await;
    assert!(page["items"].as_array().unwrap().iter().all(|i| i["lastOpenedAt"].is_null()));
  }

  #[tokio::test]
  async fn malformed_bodies_answer_with_json_errors() {
    let state = make_state().await;
    let token = signup(&state, "ada@example.com").await;

    let (status, _, body) = send(
      &state,
      "POST",
      "/opens/last",
      Some(&token),
      Some(json!({ "jobLinkIds": ["not-a-uuid"] })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string(), "{body}");

    let (status, _, body) =
      send(&state, "POST", "/auth/signin", None, Some(json!({ "email": 7 }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string(), "{body}");
  }

  #[tokio::test]
  async fn invalid_token_on_browse_is_treated_as_anonymous() {
    let state = make_state().await;
    let (status, _, _) = send(&state, "GET", "/jobs", Some("garbage"), None).await;
    assert_eq!(status, StatusCode::OK);
  }
}
