//! Error types for `advisory-core`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  /// A required field is missing or malformed.
  #[error("validation failed: {0}")]
  Validation(String),

  /// No advisory carries the given upstream request id.
  #[error("advisory request not found: {0}")]
  RequestNotFound(String),

  #[error("store error: {0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl Error {
  /// Box a backend error into [`Error::Store`].
  pub fn store<E>(err: E) -> Self
  where
    E: std::error::Error + Send + Sync + 'static,
  {
    Self::Store(Box::new(err))
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
