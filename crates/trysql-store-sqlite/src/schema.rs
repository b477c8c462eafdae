//! SQL schema for the tenant registry.
//!
//! Tenant databases carry no schema of their own; their contents are entirely
//! caller-defined.

/// Registry DDL; idempotent thanks to `IF NOT EXISTS`.
pub const REGISTRY_SCHEMA: &str = "
PRAGMA journal_mode = WAL;

-- One row per live tenant. Deleting the row retires the tenant.
CREATE TABLE IF NOT EXISTS databases (
    id            INTEGER PRIMARY KEY AUTOINCREMENT,
    public_id     TEXT NOT NULL UNIQUE,
    last_queried  TEXT NOT NULL      -- RFC 3339 UTC, fixed width
);

CREATE INDEX IF NOT EXISTS idx_databases_public_id ON databases(public_id);
CREATE INDEX IF NOT EXISTS idx_databases_last_queried ON databases(last_queried);

PRAGMA user_version = 1;
";
