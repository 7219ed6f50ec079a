//! The `AdvisoryStore` trait and supporting query types.
//!
//! The trait is implemented by storage backends (e.g.
//! `advisory-store-sqlite`). The lifecycle service depends on this
//! abstraction, not on any concrete backend.

use std::future::Future;

use uuid::Uuid;

use crate::advisory::{Advisory, AdvisoryStatus, NewAdvisory};

// ─── Query types ─────────────────────────────────────────────────────────────

/// Parameters for [`AdvisoryStore::find_all`].
#[derive(Debug, Clone, Copy, Default)]
pub struct AdvisoryFilter {
  /// Only return advisories in this status.
  pub status: Option<AdvisoryStatus>,
  /// Maximum number of rows. `0` means unbounded.
  pub limit:  u32,
}

/// Outcome of [`AdvisoryStore::insert`].
#[derive(Debug, Clone)]
pub enum Insertion {
  /// A new record was written.
  Created(Advisory),
  /// A record with the same upstream request id already existed; it is
  /// returned unchanged and nothing was written.
  Existing(Advisory),
}

impl Insertion {
  pub fn into_inner(self) -> Advisory {
    match self {
      Self::Created(a) | Self::Existing(a) => a,
    }
  }

  pub fn is_created(&self) -> bool { matches!(self, Self::Created(_)) }
}

// ─── Trait ───────────────────────────────────────────────────────────────────

/// Abstraction over an advisory store backend.
///
/// Single-record writes are atomic. `upstream_request_id` is unique across
/// the store, which makes [`AdvisoryStore::insert`] idempotent per request.
///
/// All methods return `Send` futures so the trait can be used in
/// multi-threaded async runtimes (e.g. tokio with `axum`).
pub trait AdvisoryStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  /// Validate and persist a new advisory, assigning its id and timestamps.
  fn insert(
    &self,
    input: NewAdvisory,
  ) -> impl Future<Output = Result<Insertion, Self::Error>> + Send + '_;

  /// Retrieve an advisory by store id. Returns `None` if not found.
  fn get(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<Advisory>, Self::Error>> + Send + '_;

  /// Exact-match lookup on the upstream request id.
  fn find_by_upstream_id<'a>(
    &'a self,
    upstream_request_id: &'a str,
  ) -> impl Future<Output = Result<Option<Advisory>, Self::Error>> + Send + 'a;

  /// Persist the review fields (`status`, `remarks`, `processed_by`,
  /// `processed_at`) of an existing record and refresh `updated_at`.
  ///
  /// Intake fields and `advisory_text` are never written. Returns `None` if
  /// the record no longer exists.
  fn update(
    &self,
    record: Advisory,
  ) -> impl Future<Output = Result<Option<Advisory>, Self::Error>> + Send + '_;

  /// Up to `limit` advisories for one citizen, newest first.
  fn find_by_citizen<'a>(
    &'a self,
    citizen_id: &'a str,
    limit: u32,
  ) -> impl Future<Output = Result<Vec<Advisory>, Self::Error>> + Send + 'a;

  /// Advisories across all citizens matching `filter`, newest first.
  fn find_all(
    &self,
    filter: AdvisoryFilter,
  ) -> impl Future<Output = Result<Vec<Advisory>, Self::Error>> + Send + '_;
}
