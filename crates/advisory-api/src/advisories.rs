//! Handlers for the internal advisory lifecycle routes.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `POST` | `/internal/advisory` | Intake; body: [`IntakeRequest`] |
//! | `POST` | `/internal/update-status` | Body: [`StatusUpdate`]; 404 if the request id is unknown |
//! | `GET`  | `/internal/advisories/citizen` | `x-citizen-id` header or `?citizenId=` |
//! | `GET`  | `/internal/advisories` | Optional `?status=` and `?limit=` (default 50) |

use advisory_core::{
  advisory::{Advisory, AdvisoryStatus, CropType},
  lifecycle::{IntakeRequest, StatusUpdate},
  store::AdvisoryStore,
};
use axum::{
  Json,
  extract::{
    Query, State,
    rejection::{JsonRejection, QueryRejection},
  },
  http::HeaderMap,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{AppState, auth::ServiceCaller, error::ApiError};

/// Header the gateway uses to pass the authenticated citizen's id.
pub const CITIZEN_ID_HEADER: &str = "x-citizen-id";

// ─── Envelopes ───────────────────────────────────────────────────────────────

/// `{"success": true, "message"?: ..., "data": ...}`
#[derive(Debug, Serialize)]
pub struct DataResponse<T> {
  pub success: bool,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub message: Option<String>,
  pub data:    T,
}

impl<T> DataResponse<T> {
  fn ok(data: T) -> Self { Self { success: true, message: None, data } }

  fn with_message(message: &str, data: T) -> Self {
    Self { success: true, message: Some(message.to_owned()), data }
  }
}

fn body<T>(extracted: Result<Json<T>, JsonRejection>) -> Result<T, ApiError> {
  extracted
    .map(|Json(v)| v)
    .map_err(|e| ApiError::BadRequest(e.body_text()))
}

// ─── Intake ──────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IntakeResponse {
  pub success:       bool,
  pub status:        AdvisoryStatus,
  pub remarks:       String,
  pub response_data: IntakeResponseData,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IntakeResponseData {
  pub advisory_id:   Uuid,
  pub advisory_text: String,
  pub crop_type:     CropType,
  pub location:      String,
}

/// `POST /internal/advisory`
pub async fn process<S>(
  _caller: ServiceCaller,
  State(state): State<AppState<S>>,
  payload: Result<Json<IntakeRequest>, JsonRejection>,
) -> Result<Json<IntakeResponse>, ApiError>
where
  S: AdvisoryStore + 'static,
{
  let outcome = state
    .service
    .process_advisory(body(payload)?)
    .await
    .map_err(|e| ApiError::from_core(e, "Failed to process advisory request"))?;

  let remarks = if outcome.created {
    "Advisory generated and accepted"
  } else {
    "Advisory already processed for this request"
  };
  let advisory = outcome.advisory;

  Ok(Json(IntakeResponse {
    success:       true,
    status:        advisory.status,
    remarks:       remarks.to_owned(),
    response_data: IntakeResponseData {
      advisory_id:   advisory.id,
      advisory_text: advisory.advisory_text,
      crop_type:     advisory.crop_type,
      location:      advisory.location,
    },
  }))
}

// ─── Status update ───────────────────────────────────────────────────────────

/// `POST /internal/update-status`
pub async fn update_status<S>(
  _caller: ServiceCaller,
  State(state): State<AppState<S>>,
  payload: Result<Json<StatusUpdate>, JsonRejection>,
) -> Result<Json<DataResponse<Advisory>>, ApiError>
where
  S: AdvisoryStore + 'static,
{
  let advisory = state
    .service
    .update_advisory_status(body(payload)?)
    .await
    .map_err(|e| ApiError::from_core(e, "Failed to update advisory status"))?;

  Ok(Json(DataResponse::with_message("Advisory status updated", advisory)))
}

// ─── Citizen view ────────────────────────────────────────────────────────────

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CitizenParams {
  pub citizen_id: Option<String>,
}

/// `GET /internal/advisories/citizen`. A non-blank header wins over the
/// query parameter.
pub async fn list_for_citizen<S>(
  _caller: ServiceCaller,
  State(state): State<AppState<S>>,
  headers: HeaderMap,
  params: Result<Query<CitizenParams>, QueryRejection>,
) -> Result<Json<DataResponse<Vec<Advisory>>>, ApiError>
where
  S: AdvisoryStore + 'static,
{
  let Query(params) = params.map_err(|e| ApiError::BadRequest(e.body_text()))?;

  let citizen_id = headers
    .get(CITIZEN_ID_HEADER)
    .and_then(|v| v.to_str().ok())
    .map(str::trim)
    .filter(|v| !v.is_empty())
    .map(str::to_owned)
    .or(params.citizen_id)
    .unwrap_or_default();

  let advisories = state
    .service
    .citizen_advisories(&citizen_id)
    .await
    .map_err(|e| ApiError::from_core(e, "Failed to fetch advisories"))?;

  Ok(Json(DataResponse::ok(advisories)))
}

// ─── Global view ─────────────────────────────────────────────────────────────

#[derive(Debug, Default, Deserialize)]
pub struct ListParams {
  /// One of `PENDING`, `ACCEPTED`, `REJECTED`.
  pub status: Option<String>,
  pub limit:  Option<u32>,
}

/// `GET /internal/advisories[?status=<status>][&limit=<n>]`
pub async fn list_all<S>(
  _caller: ServiceCaller,
  State(state): State<AppState<S>>,
  params: Result<Query<ListParams>, QueryRejection>,
) -> Result<Json<DataResponse<Vec<Advisory>>>, ApiError>
where
  S: AdvisoryStore + 'static,
{
  let Query(params) = params.map_err(|e| ApiError::BadRequest(e.body_text()))?;

  let status = params
    .status
    .as_deref()
    .filter(|s| !s.is_empty())
    .map(AdvisoryStatus::parse_strict)
    .transpose()
    .map_err(|e| ApiError::from_core(e, "Failed to fetch advisories"))?;

  let advisories = state
    .service
    .all_advisories(status, params.limit)
    .await
    .map_err(|e| ApiError::from_core(e, "Failed to fetch advisories"))?;

  Ok(Json(DataResponse::ok(advisories)))
}
