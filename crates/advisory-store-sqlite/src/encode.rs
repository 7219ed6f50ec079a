//! Encoding and decoding helpers between domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! Timestamps are stored as RFC 3339 UTC strings with a fixed microsecond
//! precision, so lexical order matches chronological order. UUIDs are stored
//! as hyphenated lowercase strings. Enums use their wire spelling.

use advisory_core::advisory::{Advisory, AdvisoryStatus, CropType};
use chrono::{DateTime, SecondsFormat, SubsecRound as _, Utc};
use uuid::Uuid;

use crate::{Error, Result};

// ─── Uuid ────────────────────────────────────────────────────────────────────

pub fn encode_uuid(id: Uuid) -> String { id.hyphenated().to_string() }

pub fn decode_uuid(s: &str) -> Result<Uuid> { Ok(Uuid::parse_str(s)?) }

// ─── DateTime<Utc> ───────────────────────────────────────────────────────────

/// The current time at the precision the store keeps.
pub fn now() -> DateTime<Utc> { Utc::now().trunc_subsecs(6) }

pub fn encode_dt(dt: DateTime<Utc>) -> String {
  dt.to_rfc3339_opts(SecondsFormat::Micros, true)
}

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

// ─── Enums ───────────────────────────────────────────────────────────────────

pub fn decode_crop_type(s: &str) -> Result<CropType> {
  s.parse().map_err(|_| Error::UnknownEnum {
    column: "crop_type",
    value:  s.to_owned(),
  })
}

pub fn decode_status(s: &str) -> Result<AdvisoryStatus> {
  s.parse().map_err(|_| Error::UnknownEnum {
    column: "status",
    value:  s.to_owned(),
  })
}

// ─── Row type ────────────────────────────────────────────────────────────────

/// Column list matching [`RawAdvisory::from_row`].
pub const COLUMNS: &str = "id, upstream_request_id, citizen_id, citizen_name, \
  citizen_email, crop_type, location, land_size, problem_description, \
  advisory_text, status, remarks, processed_by, processed_at, created_at, \
  updated_at";

/// Raw values read directly from an `advisories` row.
pub struct RawAdvisory {
  pub id:                  String,
  pub upstream_request_id: String,
  pub citizen_id:          String,
  pub citizen_name:        String,
  pub citizen_email:       Option<String>,
  pub crop_type:           String,
  pub location:            String,
  pub land_size:           f64,
  pub problem_description: String,
  pub advisory_text:       String,
  pub status:              String,
  pub remarks:             String,
  pub processed_by:        Option<String>,
  pub processed_at:        Option<String>,
  pub created_at:          String,
  pub updated_at:          String,
}

impl RawAdvisory {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      id:                  row.get(0)?,
      upstream_request_id: row.get(1)?,
      citizen_id:          row.get(2)?,
      citizen_name:        row.get(3)?,
      citizen_email:       row.get(4)?,
      crop_type:           row.get(5)?,
      location:            row.get(6)?,
      land_size:           row.get(7)?,
      problem_description: row.get(8)?,
      advisory_text:       row.get(9)?,
      status:              row.get(10)?,
      remarks:             row.get(11)?,
      processed_by:        row.get(12)?,
      processed_at:        row.get(13)?,
      created_at:          row.get(14)?,
      updated_at:          row.get(15)?,
    })
  }

  pub fn into_advisory(self) -> Result<Advisory> {
    Ok(Advisory {
      id:                  decode_uuid(&self.id)?,
      upstream_request_id: self.upstream_request_id,
      citizen_id:          self.citizen_id,
      citizen_name:        self.citizen_name,
      citizen_email:       self.citizen_email,
      crop_type:           decode_crop_type(&self.crop_type)?,
      location:            self.location,
      land_size:           self.land_size,
      problem_description: self.problem_description,
      advisory_text:       self.advisory_text,
      status:              decode_status(&self.status)?,
      remarks:             self.remarks,
      processed_by:        self.processed_by,
      processed_at:        self.processed_at.as_deref().map(decode_dt).transpose()?,
      created_at:          decode_dt(&self.created_at)?,
      updated_at:          decode_dt(&self.updated_at)?,
    })
  }
}
