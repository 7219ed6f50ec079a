//! Error type for `advisory-store-sqlite`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("core error: {0}")]
  Core(#[from] advisory_core::Error),

  #[error("database error: {0}")]
  Database(#[from] tokio_rusqlite::Error),

  #[error("uuid parse error: {0}")]
  Uuid(#[from] uuid::Error),

  #[error("date/time parse error: {0}")]
  DateParse(String),

  #[error("unknown {column} value: {value:?}")]
  UnknownEnum { column: &'static str, value: String },

  /// A conflicting insert found no stored row to return.
  #[error("advisory not found: {0}")]
  AdvisoryNotFound(uuid::Uuid),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
