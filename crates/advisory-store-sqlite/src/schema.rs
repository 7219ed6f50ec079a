//! SQL schema for the advisory SQLite store.
//!
//! Executed once at connection startup. Future migrations will be gated on
//! `PRAGMA user_version`.

/// Full schema DDL; idempotent thanks to `CREATE ... IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;

CREATE TABLE IF NOT EXISTS advisories (
    id                  TEXT PRIMARY KEY,
    upstream_request_id TEXT NOT NULL,
    citizen_id          TEXT NOT NULL,
    citizen_name        TEXT NOT NULL,
    citizen_email       TEXT,
    crop_type           TEXT NOT NULL,   -- lowercase CropType
    location            TEXT NOT NULL,
    land_size           REAL NOT NULL,   -- hectares
    problem_description TEXT NOT NULL,
    advisory_text       TEXT NOT NULL DEFAULT '',
    status              TEXT NOT NULL DEFAULT 'PENDING'
                        CHECK (status IN ('PENDING', 'ACCEPTED', 'REJECTED')),
    remarks             TEXT NOT NULL DEFAULT '',
    processed_by        TEXT,
    processed_at        TEXT,            -- RFC 3339 UTC or NULL
    created_at          TEXT NOT NULL,   -- RFC 3339 UTC, fixed width
    updated_at          TEXT NOT NULL
);

CREATE UNIQUE INDEX IF NOT EXISTS advisories_upstream_idx
    ON advisories(upstream_request_id);
CREATE INDEX IF NOT EXISTS advisories_citizen_idx
    ON advisories(citizen_id, created_at);
CREATE INDEX IF NOT EXISTS advisories_status_idx
    ON advisories(status, created_at);

PRAGMA user_version = 1;
";
