//! The advisory lifecycle: intake, status update and the two read views.
//!
//! [`AdvisoryService`] is the single orchestration point between the
//! generator and the store. It validates raw gateway input, so the request
//! types here keep every field optional and report what is missing.

use chrono::Utc;
use serde::Deserialize;
use serde_json::Value;

use crate::{
  Error, Result,
  advisory::{Advisory, AdvisoryStatus, CropType, NewAdvisory},
  generator::{AdvisoryGenerator, StaticAdvisoryGenerator},
  store::{AdvisoryFilter, AdvisoryStore},
};

/// Maximum number of records returned by the citizen view.
pub const CITIZEN_QUERY_LIMIT: u32 = 20;

/// Default page size of the global view.
pub const DEFAULT_QUERY_LIMIT: u32 = 50;

// ─── Inputs ──────────────────────────────────────────────────────────────────

/// An advisory request as forwarded by the upstream gateway.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IntakeRequest {
  pub request_id:    Option<String>,
  pub citizen_id:    Option<String>,
  pub citizen_name:  Option<String>,
  pub citizen_email: Option<String>,
  pub data:          Option<IntakeData>,
}

/// The crop-specific part of an [`IntakeRequest`].
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IntakeData {
  pub crop_type:           Option<String>,
  pub location:            Option<String>,
  /// Hectares; a JSON number or a numeric string.
  pub land_size:           Option<Value>,
  pub problem_description: Option<String>,
}

impl IntakeRequest {
  /// Check the raw request and build an accepted [`NewAdvisory`] with empty
  /// advisory text.
  pub fn into_new_advisory(self) -> Result<NewAdvisory> {
    let upstream_request_id = required("requestId", self.request_id)?;
    let citizen_id = required("citizenId", self.citizen_id)?;
    let citizen_name = required("citizenName", self.citizen_name)?;

    let data = self.data.unwrap_or_default();
    let crop_label = required("cropType", data.crop_type)?;
    let location = required("location", data.location)?;
    let land_size = parse_land_size(data.land_size.as_ref())?;
    let problem_description =
      required("problemDescription", data.problem_description)?;

    let input = NewAdvisory {
      upstream_request_id,
      citizen_id,
      citizen_name,
      citizen_email: self.citizen_email.filter(|e| !e.trim().is_empty()),
      crop_type: CropType::from_label(Some(&crop_label)),
      location,
      land_size,
      problem_description,
      advisory_text: String::new(),
      status: AdvisoryStatus::Accepted,
    };
    input.validate()?;
    Ok(input)
  }
}

/// A review decision relayed by an operator or the gateway.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusUpdate {
  pub request_id:   Option<String>,
  pub status:       Option<String>,
  pub remarks:      Option<String>,
  pub processed_by: Option<String>,
}

fn required(field: &str, value: Option<String>) -> Result<String> {
  value
    .filter(|v| !v.trim().is_empty())
    .ok_or_else(|| Error::Validation(format!("{field} is required")))
}

fn parse_land_size(raw: Option<&Value>) -> Result<f64> {
  let parsed = match raw {
    None | Some(Value::Null) => {
      return Err(Error::Validation("landSize is required".into()));
    }
    Some(Value::Number(n)) => n.as_f64(),
    Some(Value::String(s)) => s.trim().parse::<f64>().ok(),
    Some(_) => None,
  };
  parsed
    .filter(|v| v.is_finite())
    .ok_or_else(|| Error::Validation("landSize must be a number".into()))
}

// ─── Outputs ─────────────────────────────────────────────────────────────────

/// Result of [`AdvisoryService::process_advisory`].
#[derive(Debug, Clone)]
pub struct IntakeOutcome {
  pub advisory: Advisory,
  /// `false` when the request id was already known and the stored record
  /// was returned instead.
  pub created:  bool,
}

// ─── Service ─────────────────────────────────────────────────────────────────

/// Ties an [`AdvisoryGenerator`] to an [`AdvisoryStore`].
pub struct AdvisoryService<S> {
  store:     S,
  generator: Box<dyn AdvisoryGenerator>,
}

impl<S: AdvisoryStore> AdvisoryService<S> {
  /// A service using the built-in [`StaticAdvisoryGenerator`].
  pub fn new(store: S) -> Self {
    Self::with_generator(store, StaticAdvisoryGenerator)
  }

  pub fn with_generator(
    store: S,
    generator: impl AdvisoryGenerator + 'static,
  ) -> Self {
    Self { store, generator: Box::new(generator) }
  }

  pub fn store(&self) -> &S { &self.store }

  /// Intake: generate advisory text and persist an auto-accepted record.
  ///
  /// A repeated `requestId` returns the record already stored for it.
  pub async fn process_advisory(
    &self,
    request: IntakeRequest,
  ) -> Result<IntakeOutcome> {
    let mut input = request.into_new_advisory()?;
    input.advisory_text = self
      .generator
      .generate(input.crop_type, &input.problem_description);

    let insertion = self.store.insert(input).await.map_err(Error::store)?;
    let created = insertion.is_created();
    let advisory = insertion.into_inner();

    if created {
      tracing::info!(
        request_id = %advisory.upstream_request_id,
        advisory_id = %advisory.id,
        crop = %advisory.crop_type,
        "advisory accepted"
      );
    } else {
      tracing::info!(
        request_id = %advisory.upstream_request_id,
        advisory_id = %advisory.id,
        "duplicate advisory request; returning stored record"
      );
    }

    Ok(IntakeOutcome { advisory, created })
  }

  /// Record a review decision against the advisory for `requestId`.
  pub async fn update_advisory_status(
    &self,
    update: StatusUpdate,
  ) -> Result<Advisory> {
    let request_id = required("requestId", update.request_id)?;
    let status = AdvisoryStatus::parse_strict(&required("status", update.status)?)?;
    let processed_by = required("processedBy", update.processed_by)?;

    let mut record = self
      .store
      .find_by_upstream_id(&request_id)
      .await
      .map_err(Error::store)?
      .ok_or_else(|| Error::RequestNotFound(request_id.clone()))?;

    record.status = status;
    record.remarks = update.remarks.unwrap_or_default();
    record.processed_by = Some(processed_by);
    record.processed_at = Some(Utc::now());

    let updated = self
      .store
      .update(record)
      .await
      .map_err(Error::store)?
      .ok_or(Error::RequestNotFound(request_id))?;

    tracing::info!(
      request_id = %updated.upstream_request_id,
      status = %updated.status,
      processed_by = updated.processed_by.as_deref().unwrap_or_default(),
      "advisory status updated"
    );
    Ok(updated)
  }

  /// The most recent advisories of one citizen.
  pub async fn citizen_advisories(&self, citizen_id: &str) -> Result<Vec<Advisory>> {
    if citizen_id.trim().is_empty() {
      return Err(Error::Validation("citizenId is required".into()));
    }
    self
      .store
      .find_by_citizen(citizen_id, CITIZEN_QUERY_LIMIT)
      .await
      .map_err(Error::store)
  }

  /// The most recent advisories across all citizens.
  pub async fn all_advisories(
    &self,
    status: Option<AdvisoryStatus>,
    limit: Option<u32>,
  ) -> Result<Vec<Advisory>> {
    let filter = AdvisoryFilter {
      status,
      limit: limit.unwrap_or(DEFAULT_QUERY_LIMIT),
    };
    self.store.find_all(filter).await.map_err(Error::store)
  }
}
