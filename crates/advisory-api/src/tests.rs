//! Router tests driven through `tower::ServiceExt::oneshot` against an
//! in-memory SQLite store, plus a store that always fails.

use advisory_core::{
  advisory::{Advisory, NewAdvisory},
  store::{AdvisoryFilter, AdvisoryStore, Insertion},
};
use advisory_store_sqlite::SqliteStore;
use axum::{
  Router,
  body::Body,
  http::{Request, StatusCode, header},
};
use serde_json::{Value, json};
use tower::ServiceExt as _;
use uuid::Uuid;

use crate::{AppState, ServiceAuth, router};

const SECRET: &str = "test-secret-that-is-at-least-32-characters-long";

struct Harness {
  app:    Router,
  bearer: String,
}

async fn harness() -> Harness {
  harness_with(SqliteStore::open_in_memory().await.unwrap())
}

fn harness_with<S: AdvisoryStore + 'static>(store: S) -> Harness {
  let auth = ServiceAuth::new(SECRET, None).unwrap();
  let token = auth.issue("nexus-gateway", 300).unwrap();
  Harness {
    app:    router(AppState::new(store, auth)),
    bearer: format!("Bearer {token}"),
  }
}

/// A store whose every call fails with a backend error carrying a path.
struct FailingStore;

#[derive(Debug, thiserror::Error)]
#[error("disk I/O error at /var/lib/advisories/secret.db")]
struct DiskFailure;

impl AdvisoryStore for FailingStore {
  type Error = DiskFailure;

  async fn insert(&self, _input: NewAdvisory) -> Result<Insertion, DiskFailure> {
    Err(DiskFailure)
  }

  async fn get(&self, _id: Uuid) -> Result<Option<Advisory>, DiskFailure> {
    Err(DiskFailure)
  }

  async fn find_by_upstream_id<'a>(
    &'a self,
    _upstream_request_id: &'a str,
  ) -> Result<Option<Advisory>, DiskFailure> {
    Err(DiskFailure)
  }

  async fn update(&self, _record: Advisory) -> Result<Option<Advisory>, DiskFailure> {
    Err(DiskFailure)
  }

  async fn find_by_citizen<'a>(
    &'a self,
    _citizen_id: &'a str,
    _limit: u32,
  ) -> Result<Vec<Advisory>, DiskFailure> {
    Err(DiskFailure)
  }

  async fn find_all(&self, _filter: AdvisoryFilter) -> Result<Vec<Advisory>, DiskFailure> {
    Err(DiskFailure)
  }
}

fn intake_body(request_id: &str) -> Value {
  json!({
    "requestId": request_id,
    "citizenId": "C1",
    "citizenName": "Asha",
    "data": {
      "cropType": "rice",
      "location": "Pune",
      "landSize": 2,
      "problemDescription": "yellow leaves"
    }
  })
}

impl Harness {
  async fn call(
    &self,
    method:  &str,
    uri:     &str,
    headers: Vec<(&str, &str)>,
    body:    Option<&str>,
  ) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    for (k, v) in headers {
      builder = builder.header(k, v);
    }
    let req = match body {
      Some(b) => builder
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(b.to_owned())),
      None => builder.body(Body::empty()),
    }
    .unwrap();

    let resp = self.app.clone().oneshot(req).await.unwrap();
    let status = resp.status();
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    let json = if bytes.is_empty() {
      Value::Null
    } else {
      serde_json::from_slice(&bytes).unwrap()
    };
    (status, json)
  }

  async fn authed(&self, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let text = body.map(|b| b.to_string());
    self
      .call(method, uri, vec![("authorization", self.bearer.as_str())], text.as_deref())
      .await
  }

  async fn submit(&self, request_id: &str, citizen_id: &str, crop: &str) -> Value {
    let (status, json) = self
      .authed(
        "POST",
        "/internal/advisory",
        Some(json!({
          "requestId": request_id,
          "citizenId": citizen_id,
          "citizenName": "Asha",
          "data": {
            "cropType": crop,
            "location": "Pune",
            "landSize": 2,
            "problemDescription": "yellow leaves"
          }
        })),
      )
      .await;
    assert_eq!(status, StatusCode::OK, "{json}");
    json
  }
}

// ── Intake ───────────────────────────────────────────────────────────────────

#[tokio::test]
async fn intake_returns_accepted_envelope() {
  let h = harness().await;
  let json = h.submit("R1", "C1", "rice").await;

  assert_eq!(json["success"], true);
  assert_eq!(json["status"], "ACCEPTED");
  let data = &json["responseData"];
  assert_eq!(data["cropType"], "rice");
  assert_eq!(data["location"], "Pune");
  let text = data["advisoryText"].as_str().unwrap();
  assert!(text.contains("yellow leaves"));
  assert!(text.contains("rice cultivation"));
  assert!(data["advisoryId"].as_str().is_some());
}

#[tokio::test]
async fn intake_missing_field_is_400() {
  let h = harness().await;
  let (status, json) = h
    .authed(
      "POST",
      "/internal/advisory",
      Some(json!({ "requestId": "R1", "citizenName": "Asha", "data": {} })),
    )
    .await;
  assert_eq!(status, StatusCode::BAD_REQUEST);
  assert_eq!(json["success"], false);
  assert_eq!(json["message"], "citizenId is required");

  let (_, listed) = h.authed("GET", "/internal/advisories", None).await;
  assert_eq!(listed["data"].as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn malformed_json_is_400_envelope() {
  let h = harness().await;
  let (status, json) = h
    .call(
      "POST",
      "/internal/advisory",
      vec![("authorization", h.bearer.as_str())],
      Some("{not json"),
    )
    .await;
  assert_eq!(status, StatusCode::BAD_REQUEST);
  assert_eq!(json["success"], false);
}

#[tokio::test]
async fn repeated_intake_returns_same_advisory() {
  let h = harness().await;
  let first = h.submit("R1", "C1", "rice").await;
  let second = h.submit("R1", "C1", "rice").await;
  assert_eq!(
    first["responseData"]["advisoryId"],
    second["responseData"]["advisoryId"]
  );
}

// ── Status update ────────────────────────────────────────────────────────────

#[tokio::test]
async fn update_then_filter_by_status() {
  let h = harness().await;
  h.submit("R1", "C1", "rice").await;
  h.submit("R2", "C2", "wheat").await;

  let (status, json) = h
    .authed(
      "POST",
      "/internal/update-status",
      Some(json!({
        "requestId": "R1",
        "status": "REJECTED",
        "remarks": "needs inspection",
        "processedBy": "OFFICER1"
      })),
    )
    .await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(json["success"], true);
  assert_eq!(json["data"]["status"], "REJECTED");
  assert_eq!(json["data"]["remarks"], "needs inspection");
  assert!(json["data"]["processedAt"].is_string());

  let (status, json) = h
    .authed("GET", "/internal/advisories?status=REJECTED", None)
    .await;
  assert_eq!(status, StatusCode::OK);
  let data = json["data"].as_array().unwrap();
  assert_eq!(data.len(), 1);
  assert_eq!(data[0]["processedBy"], "OFFICER1");
  assert_eq!(data[0]["upstreamRequestId"], "R1");
}

#[tokio::test]
async fn update_unknown_request_is_404() {
  let h = harness().await;
  let (status, json) = h
    .authed(
      "POST",
      "/internal/update-status",
      Some(json!({ "requestId": "nope", "status": "ACCEPTED", "processedBy": "O1" })),
    )
    .await;
  assert_eq!(status, StatusCode::NOT_FOUND);
  assert_eq!(json["success"], false);
}

#[tokio::test]
async fn update_with_unknown_status_is_400() {
  let h = harness().await;
  h.submit("R1", "C1", "rice").await;
  let (status, _) = h
    .authed(
      "POST",
      "/internal/update-status",
      Some(json!({ "requestId": "R1", "status": "maybe", "processedBy": "O1" })),
    )
    .await;
  assert_eq!(status, StatusCode::BAD_REQUEST);
}

// ── Queries ──────────────────────────────────────────────────────────────────

#[tokio::test]
async fn citizen_header_takes_precedence_over_query() {
  let h = harness().await;
  h.submit("R1", "C1", "rice").await;
  h.submit("R2", "C2", "corn").await;
  h.submit("R3", "C2", "corn").await;

  let (status, json) = h
    .call(
      "GET",
      "/internal/advisories/citizen?citizenId=C1",
      vec![("authorization", h.bearer.as_str()), ("x-citizen-id", "C2")],
      None,
    )
    .await;
  assert_eq!(status, StatusCode::OK);
  let data = json["data"].as_array().unwrap();
  assert_eq!(data.len(), 2);
  assert!(data.iter().all(|a| a["citizenId"] == "C2"));
  assert_eq!(data[0]["upstreamRequestId"], "R3");

  let (_, json) = h
    .authed("GET", "/internal/advisories/citizen?citizenId=C1", None)
    .await;
  assert_eq!(json["data"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn blank_citizen_header_falls_back_to_query() {
  let h = harness().await;
  h.submit("R1", "C1", "rice").await;

  let (status, json) = h
    .call(
      "GET",
      "/internal/advisories/citizen?citizenId=C1",
      vec![("authorization", h.bearer.as_str()), ("x-citizen-id", "")],
      None,
    )
    .await;
  assert_eq!(status, StatusCode::OK, "{json}");
  let data = json["data"].as_array().unwrap();
  assert_eq!(data.len(), 1);
  assert_eq!(data[0]["citizenId"], "C1");
}

#[tokio::test]
async fn citizen_query_without_identity_is_400() {
  let h = harness().await;
  let (status, _) = h.authed("GET", "/internal/advisories/citizen", None).await;
  assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn global_query_honours_limit() {
  let h = harness().await;
  for i in 0..4 {
    h.submit(&format!("R{i}"), "C1", "fruits").await;
  }
  let (_, json) = h.authed("GET", "/internal/advisories?limit=2", None).await;
  let data = json["data"].as_array().unwrap();
  assert_eq!(data.len(), 2);
  assert_eq!(data[0]["upstreamRequestId"], "R3");

  let (status, _) = h.authed("GET", "/internal/advisories?status=DONE", None).await;
  assert_eq!(status, StatusCode::BAD_REQUEST);

  let (status, _) = h.authed("GET", "/internal/advisories?limit=many", None).await;
  assert_eq!(status, StatusCode::BAD_REQUEST);
}

// ── Store failures ───────────────────────────────────────────────────────────

#[tokio::test]
async fn store_failures_are_generic_500s() {
  let h = harness_with(FailingStore);
  let cases = [
    ("POST", "/internal/advisory", Some(intake_body("R1")), "Failed to process advisory request"),
    (
      "POST",
      "/internal/update-status",
      Some(json!({ "requestId": "R1", "status": "REJECTED", "processedBy": "O1" })),
      "Failed to update advisory status",
    ),
    ("GET", "/internal/advisories", None, "Failed to fetch advisories"),
    ("GET", "/internal/advisories/citizen?citizenId=C1", None, "Failed to fetch advisories"),
  ];

  for (method, uri, body, message) in cases {
    let (status, json) = h.authed(method, uri, body).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR, "{method} {uri}");
    assert_eq!(json["success"], false);
    assert_eq!(json["message"], message);
    let text = json.to_string();
    assert!(!text.contains("disk I/O"), "{text}");
    assert!(!text.contains("secret.db"), "{text}");
  }
}

#[tokio::test]
async fn validation_runs_before_the_store() {
  let h = harness_with(FailingStore);
  let mut body = intake_body("R1");
  body["data"]["location"] = json!("");
  let (status, json) = h.authed("POST", "/internal/advisory", Some(body)).await;
  assert_eq!(status, StatusCode::BAD_REQUEST);
  assert_eq!(json["message"], "location is required");
}

// ── Auth ─────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn internal_routes_require_a_token() {
  let h = harness().await;
  for (method, uri) in [
    ("POST", "/internal/advisory"),
    ("POST", "/internal/update-status"),
    ("GET", "/internal/advisories"),
    ("GET", "/internal/advisories/citizen?citizenId=C1"),
  ] {
    let (status, json) = h.call(method, uri, vec![], Some("{}")).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED, "{method} {uri}");
    assert_eq!(json["success"], false);
  }
}

#[tokio::test]
async fn invalid_token_is_403_and_nothing_is_stored() {
  let h = harness().await;
  let forged = ServiceAuth::new("a-different-secret-of-decent-length", None)
    .unwrap()
    .issue("intruder", 300)
    .unwrap();
  let body = json!({
    "requestId": "R1", "citizenId": "C1", "citizenName": "Asha",
    "data": { "cropType": "rice", "location": "Pune", "landSize": 2, "problemDescription": "x" }
  })
  .to_string();

  let forged = format!("Bearer {forged}");
  let (status, _) = h
    .call(
      "POST",
      "/internal/advisory",
      vec![("authorization", forged.as_str())],
      Some(&body),
    )
    .await;
  assert_eq!(status, StatusCode::FORBIDDEN);

  let (_, listed) = h.authed("GET", "/internal/advisories", None).await;
  assert!(listed["data"].as_array().unwrap().is_empty());
}

// ── Legacy shims ─────────────────────────────────────────────────────────────

#[tokio::test]
async fn legacy_broadcast_echoes_input() {
  let h = harness().await;
  let (status, json) = h
    .call(
      "POST",
      "/api/advisory",
      vec![],
      Some(r#"{"crop":"wheat","advisory":"irrigate tonight"}"#),
    )
    .await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(json["crop"], "wheat");
  assert_eq!(json["advisory"], "irrigate tonight");
  assert_eq!(json["message"], "Advisory broadcasted to registered farmers");
  assert!(json["timestamp"].is_string());
}

#[tokio::test]
async fn legacy_water_alert_is_informational() {
  let h = harness().await;
  let (status, json) = h
    .call(
      "POST",
      "/api/internal/water-alert",
      vec![],
      Some(r#"{"location":"Latur","severity":"high"}"#),
    )
    .await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(json["success"], true);
  assert_eq!(json["data"]["deprecated"], true);
  assert_eq!(json["data"]["location"], "Latur");
}

#[tokio::test]
async fn legacy_routes_reject_malformed_json() {
  let h = harness().await;
  for uri in ["/api/advisory", "/api/internal/water-alert"] {
    let (status, json) = h.call("POST", uri, vec![], Some("{not json")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST, "{uri}");
    assert_eq!(json["success"], false);
  }

  let (status, json) = h.call("POST", "/api/advisory", vec![], None).await;
  assert_eq!(status, StatusCode::OK);
  assert!(json["crop"].is_null());
}
