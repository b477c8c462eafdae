//! [`SqliteRegistry`] — the shared table of live tenants and their freshness.

use std::{collections::HashSet, path::Path};

use chrono::{DateTime, TimeDelta, Utc};
use rusqlite::OptionalExtension as _;
use trysql_core::PublicId;

use crate::{
  Error, Result,
  encode::{decode_dt, decode_public_id, encode_dt},
  schema::REGISTRY_SCHEMA,
};

/// Attempts [`SqliteRegistry::create`] makes before giving up on collisions.
pub const MAX_ID_ATTEMPTS: usize = 8;

/// The instant `max_age` ago. Negative ages and ages past the calendar's
/// range are rejected.
pub(crate) fn cutoff(max_age: TimeDelta) -> Result<DateTime<Utc>> {
  if max_age < TimeDelta::zero() {
    return Err(Error::RetentionOutOfRange(max_age));
  }
  Utc::now()
    .checked_sub_signed(max_age)
    .ok_or(Error::RetentionOutOfRange(max_age))
}

/// The tenant registry, backed by a single SQLite file.
///
/// Cloning is cheap — every clone shares one connection, and SQLite
/// serialises the writers.
#[derive(Clone)]
pub struct SqliteRegistry {
  pub(crate) conn: tokio_rusqlite::Connection,
}

impl SqliteRegistry {
  /// Open (or create) the registry at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let registry = Self { conn };
    registry.init_schema().await?;
    Ok(registry)
  }

  /// Open an in-memory registry — useful for testing.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let registry = Self { conn };
    registry.init_schema().await?;
    Ok(registry)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(REGISTRY_SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  pub async fn exists(&self, id: &PublicId) -> Result<bool> {
    let id_str = id.to_string();
    let exists = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT 1 FROM databases WHERE public_id = ?1",
              rusqlite::params![id_str],
              |_| Ok(true),
            )
            .optional()?
            .unwrap_or(false),
        )
      })
      .await?;
    Ok(exists)
  }

  /// Set `last_queried` to now. Zero matched rows means the id is unknown.
  pub async fn touch(&self, id: &PublicId) -> Result<()> {
    self.touch_at(id, Utc::now()).await
  }

  pub(crate) async fn touch_at(&self, id: &PublicId, at: DateTime<Utc>) -> Result<()> {
    let id_str = id.to_string();
    let at_str = encode_dt(at);

    let updated = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "UPDATE databases SET last_queried = ?2 WHERE public_id = ?1",
          rusqlite::params![id_str, at_str],
        )?)
      })
      .await?;

    if updated == 0 {
      return Err(Error::NotFound(id.clone()));
    }
    Ok(())
  }

  /// When `id` was last touched, or `None` if it is not registered.
  pub async fn last_queried(&self, id: &PublicId) -> Result<Option<DateTime<Utc>>> {
    let id_str = id.to_string();
    let raw: Option<String> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT last_queried FROM databases WHERE public_id = ?1",
              rusqlite::params![id_str],
              |row| row.get(0),
            )
            .optional()?,
        )
      })
      .await?;
    raw.as_deref().map(decode_dt).transpose()
  }

  /// Register a freshly generated identifier.
  pub async fn create(&self) -> Result<PublicId> {
    self.create_with(PublicId::generate).await
  }

  /// Register an identifier drawn from `generate`, drawing again whenever the
  /// candidate is already taken.
  pub async fn create_with<G>(&self, mut generate: G) -> Result<PublicId>
  where
    G: FnMut() -> PublicId + Send + 'static,
  {
    let at_str = encode_dt(Utc::now());

    let created = self
      .conn
      .call(move |conn| {
        for _ in 0..MAX_ID_ATTEMPTS {
          let candidate = generate();
          let inserted = conn.execute(
            "INSERT INTO databases (public_id, last_queried) VALUES (?1, ?2)",
            rusqlite::params![candidate.as_str(), at_str],
          );
          match inserted {
            Ok(_) => return Ok(Some(candidate)),
            Err(e) if is_unique_violation(&e) => {
              tracing::debug!(%candidate, "public id collision, regenerating");
            }
            Err(e) => return Err(e.into()),
          }
        }
        Ok(None)
      })
      .await?;

    created.ok_or(Error::IdsExhausted(MAX_ID_ATTEMPTS))
  }

  /// Identifiers whose `last_queried` is older than `max_age`.
  pub async fn list_stale(&self, max_age: TimeDelta) -> Result<Vec<PublicId>> {
    self.list_stale_before(cutoff(max_age)?).await
  }

  pub async fn list_stale_before(&self, cutoff: DateTime<Utc>) -> Result<Vec<PublicId>> {
    let cutoff_str = encode_dt(cutoff);

    let raws: Vec<String> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(
          "SELECT public_id FROM databases WHERE last_queried < ?1 ORDER BY id",
        )?;
        let rows = stmt
          .query_map(rusqlite::params![cutoff_str], |row| row.get(0))?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.iter().map(|s| decode_public_id(s)).collect()
  }

  /// Remove every entry older than `max_age`; returns how many went.
  pub async fn delete_stale(&self, max_age: TimeDelta) -> Result<usize> {
    self.delete_stale_before(cutoff(max_age)?).await
  }

  pub async fn delete_stale_before(&self, cutoff: DateTime<Utc>) -> Result<usize> {
    let cutoff_str = encode_dt(cutoff);

    let deleted = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "DELETE FROM databases WHERE last_queried < ?1",
          rusqlite::params![cutoff_str],
        )?)
      })
      .await?;
    Ok(deleted)
  }

  /// Every registered identifier.
  pub async fn list_public_ids(&self) -> Result<HashSet<PublicId>> {
    let raws: Vec<String> = self
      .conn
      .call(|conn| {
        let mut stmt = conn.prepare("SELECT public_id FROM databases")?;
        let rows = stmt
          .query_map([], |row| row.get(0))?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.iter().map(|s| decode_public_id(s)).collect()
  }

  /// Delete the entry for `id`; `false` if there was none.
  pub async fn remove(&self, id: &PublicId) -> Result<bool> {
    let id_str = id.to_string();
    let deleted = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "DELETE FROM databases WHERE public_id = ?1",
          rusqlite::params![id_str],
        )?)
      })
      .await?;
    Ok(deleted > 0)
  }
}

fn is_unique_violation(e: &rusqlite::Error) -> bool {
  matches!(
    e,
    rusqlite::Error::SqliteFailure(f, _)
      if f.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE
  )
}
