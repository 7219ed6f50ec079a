//! Advisory records — the single persisted entity of the service.
//!
//! An advisory is created once at intake, carries generated text that is
//! never rewritten, and afterwards only changes through a status update.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString, IntoStaticStr};
use uuid::Uuid;

use crate::{Error, Result};

// ─── Crop categories ─────────────────────────────────────────────────────────

/// The closed set of crop categories the advisory templates know about.
#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Hash,
  Default,
  Serialize,
  Deserialize,
  Display,
  EnumString,
  EnumIter,
  IntoStaticStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum CropType {
  Rice,
  Wheat,
  Corn,
  Vegetables,
  Fruits,
  Cotton,
  #[default]
  Other,
}

impl CropType {
  /// Map a free-form label onto a category. Never fails: absent, blank and
  /// unrecognised labels all become [`CropType::Other`].
  pub fn from_label(label: Option<&str>) -> Self {
    label
      .map(str::trim)
      .and_then(|l| l.parse().ok())
      .unwrap_or_default()
  }

  pub fn as_str(self) -> &'static str { self.into() }
}

// ─── Status ──────────────────────────────────────────────────────────────────

/// Review state of an advisory request.
#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Default,
  Serialize,
  Deserialize,
  Display,
  EnumString,
  EnumIter,
  IntoStaticStr,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum AdvisoryStatus {
  #[default]
  Pending,
  Accepted,
  Rejected,
}

impl AdvisoryStatus {
  pub fn as_str(self) -> &'static str { self.into() }

  /// Parse a caller-supplied status, rejecting anything outside the closed
  /// set with [`Error::Validation`].
  pub fn parse_strict(raw: &str) -> Result<Self> {
    raw.parse().map_err(|_| {
      Error::Validation(format!(
        "status must be one of PENDING, ACCEPTED, REJECTED (got {raw:?})"
      ))
    })
  }
}

// ─── Advisory ────────────────────────────────────────────────────────────────

/// A stored advisory request.
///
/// `id`, `created_at` and `updated_at` are assigned by the store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Advisory {
  pub id:                  Uuid,
  /// Correlation id issued by the upstream gateway. Unique per store.
  pub upstream_request_id: String,
  pub citizen_id:          String,
  pub citizen_name:        String,
  pub citizen_email:       Option<String>,
  pub crop_type:           CropType,
  pub location:            String,
  /// Land area in hectares.
  pub land_size:           f64,
  pub problem_description: String,
  pub advisory_text:       String,
  pub status:              AdvisoryStatus,
  pub remarks:             String,
  pub processed_by:        Option<String>,
  pub processed_at:        Option<DateTime<Utc>>,
  pub created_at:          DateTime<Utc>,
  pub updated_at:          DateTime<Utc>,
}

// ─── NewAdvisory ─────────────────────────────────────────────────────────────

/// Input to [`crate::store::AdvisoryStore::insert`].
#[derive(Debug, Clone, PartialEq)]
pub struct NewAdvisory {
  pub upstream_request_id: String,
  pub citizen_id:          String,
  pub citizen_name:        String,
  pub citizen_email:       Option<String>,
  pub crop_type:           CropType,
  pub location:            String,
  pub land_size:           f64,
  pub problem_description: String,
  pub advisory_text:       String,
  pub status:              AdvisoryStatus,
}

impl NewAdvisory {
  /// Check every required field. Blank strings count as missing.
  pub fn validate(&self) -> Result<()> {
    let required = [
      ("requestId", &self.upstream_request_id),
      ("citizenId", &self.citizen_id),
      ("citizenName", &self.citizen_name),
      ("location", &self.location),
      ("problemDescription", &self.problem_description),
    ];
    for (field, value) in required {
      if value.trim().is_empty() {
        return Err(Error::Validation(format!("{field} is required")));
      }
    }
    if !self.land_size.is_finite() {
      return Err(Error::Validation("landSize must be a number".into()));
    }
    Ok(())
  }
}
