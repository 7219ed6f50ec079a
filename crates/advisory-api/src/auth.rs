//! Service-to-service token gate.
//!
//! Internal routes only accept calls from the upstream gateway, which signs
//! short-lived HS256 JWTs with a secret shared with this service. The
//! [`ServiceCaller`] extractor rejects a request before its handler runs.

use axum::{
  extract::FromRequestParts,
  http::{HeaderMap, header, request::Parts},
};
use chrono::Utc;
use jsonwebtoken::{
  Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode,
  errors::ErrorKind,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{AppState, error::ApiError};
use advisory_core::store::AdvisoryStore;

#[derive(Debug, Error)]
pub enum AuthError {
  #[error("service token required")]
  MissingToken,

  #[error("invalid service token: {0}")]
  InvalidToken(&'static str),

  #[error("service token secret must not be empty")]
  EmptySecret,

  #[error("failed to sign service token: {0}")]
  Signing(#[from] jsonwebtoken::errors::Error),
}

/// Claims carried by a service token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceClaims {
  /// Name of the calling service, e.g. `"nexus-gateway"`.
  pub sub: String,
  pub iat: u64,
  pub exp: u64,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub iss: Option<String>,
}

/// Verifies (and, for tooling, issues) service tokens.
#[derive(Clone)]
pub struct ServiceAuth {
  encoding:   EncodingKey,
  decoding:   DecodingKey,
  validation: Validation,
  issuer:     Option<String>,
}

impl ServiceAuth {
  /// Build a gate for `secret`. When `issuer` is set, tokens must carry a
  /// matching `iss` claim.
  pub fn new(secret: &str, issuer: Option<String>) -> Result<Self, AuthError> {
    if secret.is_empty() {
      return Err(AuthError::EmptySecret);
    }

    let mut validation = Validation::new(Algorithm::HS256);
    if let Some(iss) = &issuer {
      validation.set_issuer(&[iss]);
      validation.set_required_spec_claims(&["exp", "iss"]);
    }

    Ok(Self {
      encoding: EncodingKey::from_secret(secret.as_bytes()),
      decoding: DecodingKey::from_secret(secret.as_bytes()),
      validation,
      issuer,
    })
  }

  pub fn verify(&self, token: &str) -> Result<ServiceClaims, AuthError> {
    decode::<ServiceClaims>(token, &self.decoding, &self.validation)
      .map(|data| data.claims)
      .map_err(|e| {
        AuthError::InvalidToken(match e.kind() {
          ErrorKind::ExpiredSignature => "token expired",
          ErrorKind::InvalidSignature => "bad signature",
          ErrorKind::InvalidIssuer => "unexpected issuer",
          _ => "malformed token",
        })
      })
  }

  pub fn sign(&self, claims: &ServiceClaims) -> Result<String, AuthError> {
    Ok(encode(&Header::new(Algorithm::HS256), claims, &self.encoding)?)
  }

  /// Issue a token for `subject` valid for `ttl_secs` seconds.
  pub fn issue(&self, subject: &str, ttl_secs: u64) -> Result<String, AuthError> {
    let now = u64::try_from(Utc::now().timestamp()).unwrap_or_default();
    self.sign(&ServiceClaims {
      sub: subject.to_owned(),
      iat: now,
      exp: now.saturating_add(ttl_secs),
      iss: self.issuer.clone(),
    })
  }
}

/// Pull the bearer token out of `Authorization` and verify it.
pub fn verify_headers(
  headers: &HeaderMap,
  auth: &ServiceAuth,
) -> Result<ServiceClaims, AuthError> {
  let token = headers
    .get(header::AUTHORIZATION)
    .and_then(|v| v.to_str().ok())
    .and_then(|v| v.split_once(' '))
    .filter(|(scheme, _)| scheme.eq_ignore_ascii_case("bearer"))
    .map(|(_, token)| token.trim())
    .filter(|t| !t.is_empty())
    .ok_or(AuthError::MissingToken)?;

  auth.verify(token)
}

/// Present in a handler's arguments: the request came from a trusted service.
#[derive(Debug, Clone)]
pub struct ServiceCaller {
  pub claims: ServiceClaims,
}

impl<S> FromRequestParts<AppState<S>> for ServiceCaller
where
  S: AdvisoryStore + 'static,
{
  type Rejection = ApiError;

  async fn from_request_parts(
    parts: &mut Parts,
    state: &AppState<S>,
  ) -> Result<Self, Self::Rejection> {
    match verify_headers(&parts.headers, &state.auth) {
      Ok(claims) => {
        tracing::debug!(caller = %claims.sub, "service token accepted");
        Ok(ServiceCaller { claims })
      }
      Err(e) => {
        tracing::warn!(path = %parts.uri.path(), error = %e, "rejected internal call");
        Err(e.into())
      }
    }
  }
}
