//! [`SqliteStore`] — the SQLite implementation of [`AdvisoryStore`].

use std::path::Path;

use advisory_core::{
  advisory::{Advisory, NewAdvisory},
  store::{AdvisoryFilter, AdvisoryStore, Insertion},
};
use rusqlite::OptionalExtension as _;
use uuid::Uuid;

use crate::{
  Error, Result,
  encode::{COLUMNS, RawAdvisory, encode_dt, encode_uuid, now},
  schema::SCHEMA,
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// An advisory store backed by a single SQLite file.
///
/// Cloning is cheap — the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store — useful for testing.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  /// Fetch at most one row matching `predicate` (a `WHERE` fragment with a
  /// single `?1` parameter).
  async fn select_one(
    &self,
    predicate: &'static str,
    param: String,
  ) -> Result<Option<Advisory>> {
    let sql = format!("SELECT {COLUMNS} FROM advisories WHERE {predicate}");

    let raw: Option<RawAdvisory> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(&sql, rusqlite::params![param], RawAdvisory::from_row)
            .optional()?,
        )
      })
      .await?;

    raw.map(RawAdvisory::into_advisory).transpose()
  }

  /// Run a newest-first listing query. `limit` binds to the placeholder
  /// after the predicate's own parameters.
  async fn select_many(
    &self,
    predicate: &'static str,
    mut params: Vec<rusqlite::types::Value>,
    limit: u32,
  ) -> Result<Vec<Advisory>> {
    params.push(sql_limit(limit));
    let sql = format!(
      "SELECT {COLUMNS} FROM advisories
       WHERE {predicate}
       ORDER BY created_at DESC, rowid DESC
       LIMIT ?{}",
      params.len(),
    );

    let raws: Vec<RawAdvisory> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
          .query_map(rusqlite::params_from_iter(params.iter()), RawAdvisory::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawAdvisory::into_advisory).collect()
  }
}

/// SQLite treats a negative `LIMIT` as unbounded.
fn sql_limit(limit: u32) -> rusqlite::types::Value {
  let value = if limit == 0 { -1 } else { i64::from(limit) };
  rusqlite::types::Value::Integer(value)
}

// ─── AdvisoryStore impl ──────────────────────────────────────────────────────

impl AdvisoryStore for SqliteStore {
  type Error = Error;

  async fn insert(&self, input: NewAdvisory) -> Result<Insertion> {
    input.validate()?;

    let created_at = now();
    let advisory = Advisory {
      id:                  Uuid::new_v4(),
      upstream_request_id: input.upstream_request_id,
      citizen_id:          input.citizen_id,
      citizen_name:        input.citizen_name,
      citizen_email:       input.citizen_email,
      crop_type:           input.crop_type,
      location:            input.location,
      land_size:           input.land_size,
      problem_description: input.problem_description,
      advisory_text:       input.advisory_text,
      status:              input.status,
      remarks:             String::new(),
      processed_by:        None,
      processed_at:        None,
      created_at,
      updated_at:          created_at,
    };

    let id_str       = encode_uuid(advisory.id);
    let upstream_id  = advisory.upstream_request_id.clone();
    let citizen_id   = advisory.citizen_id.clone();
    let citizen_name = advisory.citizen_name.clone();
    let email        = advisory.citizen_email.clone();
    let crop         = advisory.crop_type.as_str();
    let location     = advisory.location.clone();
    let land_size    = advisory.land_size;
    let problem      = advisory.problem_description.clone();
    let text         = advisory.advisory_text.clone();
    let status       = advisory.status.as_str();
    let at_str       = encode_dt(created_at);

    // The unique index on upstream_request_id turns a repeated request into
    // a no-op; the caller then gets the stored row back.
    let inserted: bool = self
      .conn
      .call(move |conn| {
        let changed = conn.execute(
          "INSERT INTO advisories (
             id, upstream_request_id, citizen_id, citizen_name, citizen_email,
             crop_type, location, land_size, problem_description,
             advisory_text, status, remarks, created_at, updated_at
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, '', ?12, ?12)
           ON CONFLICT (upstream_request_id) DO NOTHING",
          rusqlite::params![
            id_str,
            upstream_id,
            citizen_id,
            citizen_name,
            email,
            crop,
            location,
            land_size,
            problem,
            text,
            status,
            at_str,
          ],
        )?;
        Ok(changed == 1)
      })
      .await?;

    if inserted {
      return Ok(Insertion::Created(advisory));
    }

    tracing::debug!(
      request_id = %advisory.upstream_request_id,
      "upstream request id already stored"
    );
    let existing = self
      .find_by_upstream_id(&advisory.upstream_request_id)
      .await?
      .ok_or(Error::AdvisoryNotFound(advisory.id))?;
    Ok(Insertion::Existing(existing))
  }

  async fn get(&self, id: Uuid) -> Result<Option<Advisory>> {
    self.select_one("id = ?1", encode_uuid(id)).await
  }

  async fn find_by_upstream_id(
    &self,
    upstream_request_id: &str,
  ) -> Result<Option<Advisory>> {
    self
      .select_one("upstream_request_id = ?1", upstream_request_id.to_owned())
      .await
  }

  async fn update(&self, record: Advisory) -> Result<Option<Advisory>> {
    let id           = record.id;
    let id_str       = encode_uuid(id);
    let status       = record.status.as_str();
    let remarks      = record.remarks;
    let processed_by = record.processed_by;
    let processed_at = record.processed_at.map(encode_dt);
    let updated_at   = encode_dt(now());

    let changed: usize = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "UPDATE advisories
           SET status = ?2, remarks = ?3, processed_by = ?4,
               processed_at = ?5, updated_at = ?6
           WHERE id = ?1",
          rusqlite::params![
            id_str,
            status,
            remarks,
            processed_by,
            processed_at,
            updated_at,
          ],
        )?)
      })
      .await?;

    if changed == 0 {
      return Ok(None);
    }

    self.get(id).await
  }

  async fn find_by_citizen(
    &self,
    citizen_id: &str,
    limit:      u32,
  ) -> Result<Vec<Advisory>> {
    self
      .select_many("citizen_id = ?1", vec![citizen_id.to_owned().into()], limit)
      .await
  }

  async fn find_all(&self, filter: AdvisoryFilter) -> Result<Vec<Advisory>> {
    let status = match filter.status {
      Some(s) => s.as_str().to_owned().into(),
      None    => rusqlite::types::Value::Null,
    };
    self
      .select_many("(?1 IS NULL OR status = ?1)", vec![status], filter.limit)
      .await
  }
}
