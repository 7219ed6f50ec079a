//! API error type and [`axum::response::IntoResponse`] implementation.
//!
//! Every failure is rendered as `{"success": false, "message": ...}`. Store
//! failures carry a caller-facing message; the underlying error is only
//! logged.

use axum::{
  Json,
  http::StatusCode,
  response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

use crate::auth::AuthError;

/// An error returned by an API handler.
#[derive(Debug, Error)]
pub enum ApiError {
  #[error("bad request: {0}")]
  BadRequest(String),

  #[error("not found: {0}")]
  NotFound(String),

  #[error("unauthorized: {0}")]
  Unauthorized(String),

  #[error("forbidden: {0}")]
  Forbidden(String),

  #[error("{message}: {source}")]
  Internal {
    message: &'static str,
    #[source]
    source:  Box<dyn std::error::Error + Send + Sync>,
  },
}

impl ApiError {
  /// Map a lifecycle error, using `message` as the response text if the
  /// failure is internal.
  pub fn from_core(err: advisory_core::Error, message: &'static str) -> Self {
    match err {
      advisory_core::Error::Validation(m) => ApiError::BadRequest(m),
      advisory_core::Error::RequestNotFound(_) => {
        ApiError::NotFound("Advisory request not found".into())
      }
      advisory_core::Error::Store(source) => ApiError::Internal { message, source },
    }
  }
}

impl From<AuthError> for ApiError {
  fn from(err: AuthError) -> Self {
    match err {
      AuthError::MissingToken => ApiError::Unauthorized(err.to_string()),
      other => ApiError::Forbidden(other.to_string()),
    }
  }
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    let (status, message) = match self {
      ApiError::BadRequest(m) => (StatusCode::BAD_REQUEST, m),
      ApiError::NotFound(m) => (StatusCode::NOT_FOUND, m),
      ApiError::Unauthorized(m) => (StatusCode::UNAUTHORIZED, m),
      ApiError::Forbidden(m) => (StatusCode::FORBIDDEN, m),
      ApiError::Internal { message, source } => {
        tracing::error!(error = %source, "{message}");
        (StatusCode::INTERNAL_SERVER_ERROR, message.to_owned())
      }
    };
    (status, Json(json!({ "success": false, "message": message }))).into_response()
  }
}
