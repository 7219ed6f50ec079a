//! Deprecated public shims kept for older clients.
//!
//! Neither route touches the advisory store or requires a service token.

use axum::{
  Json, Router,
  extract::rejection::JsonRejection,
  routing::post,
};
use chrono::Utc;
use serde::Deserialize;
use serde_json::{Value, json};

use crate::error::ApiError;

pub fn router() -> Router<()> {
  Router::new()
    .route("/advisory", post(broadcast))
    .route("/internal/water-alert", post(water_alert))
}

#[derive(Debug, Default, Deserialize)]
pub struct BroadcastBody {
  pub crop:     Option<Value>,
  pub advisory: Option<Value>,
}

/// `POST /api/advisory` — echo the advisory back with a fixed message.
pub async fn broadcast(
  payload: Result<Json<BroadcastBody>, JsonRejection>,
) -> Result<Json<Value>, ApiError> {
  let body = lenient_body(payload)?;
  Ok(Json(json!({
    "success":   true,
    "service":   "agriculture",
    "type":      "advisory",
    "crop":      body.crop,
    "advisory":  body.advisory,
    "message":   "Advisory broadcasted to registered farmers",
    "timestamp": Utc::now().to_rfc3339(),
  })))
}

#[derive(Debug, Default, Deserialize)]
pub struct WaterAlertBody {
  pub location: Option<Value>,
  pub severity: Option<Value>,
}

/// `POST /api/internal/water-alert` — deprecated; answers with a fixed
/// informational payload.
pub async fn water_alert(
  payload: Result<Json<WaterAlertBody>, JsonRejection>,
) -> Result<Json<Value>, ApiError> {
  tracing::warn!("deprecated water-alert endpoint called");
  let body = lenient_body(payload)?;
  Ok(Json(json!({
    "success": true,
    "message": "Water alerts are no longer handled by the agriculture service",
    "data": {
      "service":    "agriculture",
      "deprecated": true,
      "location":   body.location,
      "severity":   body.severity,
    },
  })))
}

/// Bodies sent without a JSON content type are treated as empty; anything
/// declared as JSON must parse.
fn lenient_body<T: Default>(
  payload: Result<Json<T>, JsonRejection>,
) -> Result<T, ApiError> {
  match payload {
    Ok(Json(body)) => Ok(body),
    Err(JsonRejection::MissingJsonContentType(_)) => Ok(T::default()),
    Err(e) => Err(ApiError::BadRequest(e.body_text())),
  }
}
