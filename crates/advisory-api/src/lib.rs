//! HTTP surface of the agriculture advisory service.
//!
//! Exposes an axum [`Router`] backed by any
//! [`advisory_core::store::AdvisoryStore`]. Internal lifecycle routes live
//! under `/internal` and require a service token; the deprecated public
//! shims live under `/api`.
//!
//! # Mounting
//!
//! ```rust,ignore
//! let app = advisory_api::router(AppState::new(store, auth));
//! axum::serve(listener, app).await?;
//! ```

pub mod advisories;
pub mod auth;
pub mod error;
pub mod legacy;

use std::sync::Arc;

use advisory_core::{lifecycle::AdvisoryService, store::AdvisoryStore};
use axum::{
  Router,
  routing::{get, post},
};
use tower_http::trace::TraceLayer;

pub use auth::{ServiceAuth, ServiceCaller};
pub use error::ApiError;

// ─── Application state ───────────────────────────────────────────────────────

/// Shared state threaded through all internal handlers.
pub struct AppState<S> {
  pub service: Arc<AdvisoryService<S>>,
  pub auth:    Arc<ServiceAuth>,
}

impl<S: AdvisoryStore> AppState<S> {
  /// State with the default (static template) advisory generator.
  pub fn new(store: S, auth: ServiceAuth) -> Self {
    Self::with_service(AdvisoryService::new(store), auth)
  }

  pub fn with_service(service: AdvisoryService<S>, auth: ServiceAuth) -> Self {
    Self { service: Arc::new(service), auth: Arc::new(auth) }
  }
}

impl<S> Clone for AppState<S> {
  fn clone(&self) -> Self {
    Self { service: Arc::clone(&self.service), auth: Arc::clone(&self.auth) }
  }
}

// ─── Router ──────────────────────────────────────────────────────────────────

/// Routes reachable only with a valid service token.
pub fn internal_router<S>(state: AppState<S>) -> Router<()>
where
  S: AdvisoryStore + 'static,
{
  Router::new()
    .route("/advisory", post(advisories::process::<S>))
    .route("/update-status", post(advisories::update_status::<S>))
    .route("/advisories", get(advisories::list_all::<S>))
    .route("/advisories/citizen", get(advisories::list_for_citizen::<S>))
    .with_state(state)
}

/// Build the complete service router with request tracing.
pub fn router<S>(state: AppState<S>) -> Router<()>
where
  S: AdvisoryStore + 'static,
{
  Router::new()
    .nest("/internal", internal_router(state))
    .nest("/api", legacy::router())
    .layer(TraceLayer::new_for_http())
}

#[cfg(test)]
mod tests;
