//! Conversions between Rust values and what SQLite stores or returns.
//!
//! Registry timestamps are fixed-width RFC 3339 strings in UTC with
//! microsecond precision, so string order matches time order and the
//! staleness predicate can compare them directly in SQL.

use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::types::ValueRef;
use trysql_core::{PublicId, Row, Value};

use crate::{Error, Result};

// ─── DateTime<Utc> ───────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String {
  dt.to_rfc3339_opts(SecondsFormat::Micros, true)
}

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

// ─── PublicId ────────────────────────────────────────────────────────────────

pub fn decode_public_id(s: &str) -> Result<PublicId> { Ok(PublicId::parse(s)?) }

// ─── Cells ───────────────────────────────────────────────────────────────────

pub fn decode_value(v: ValueRef<'_>) -> Value {
  match v {
    ValueRef::Null => Value::Null,
    ValueRef::Integer(i) => Value::Integer(i),
    ValueRef::Real(f) => Value::Real(f),
    // SQLite does not enforce TEXT encoding; keep invalid UTF-8 as raw bytes.
    ValueRef::Text(t) => match std::str::from_utf8(t) {
      Ok(s) => Value::Text(s.to_owned()),
      Err(_) => Value::Blob(t.to_vec()),
    },
    ValueRef::Blob(b) => Value::Blob(b.to_vec()),
  }
}

pub fn decode_row(row: &rusqlite::Row<'_>, width: usize) -> rusqlite::Result<Row> {
  (0..width).map(|i| row.get_ref(i).map(decode_value)).collect()
}

/// Quote an identifier for interpolation into SQL.
pub fn quote_ident(name: &str) -> String {
  format!("\"{}\"", name.replace('"', "\"\""))
}

#[cfg(test)]
mod tests {
  use chrono::TimeZone as _;

  use super::*;

  #[test]
  fn timestamps_sort_lexically() {
    let early = Utc.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).unwrap();
    let late = early + chrono::TimeDelta::microseconds(1);
    assert!(encode_dt(early) < encode_dt(late));
    assert_eq!(encode_dt(early), "2024-01-02T03:04:05.000000Z");
    assert_eq!(decode_dt(&encode_dt(late)).unwrap(), late);
  }

  #[test]
  fn identifiers_are_double_quoted() {
    assert_eq!(quote_ident("t"), "\"t\"");
    assert_eq!(quote_ident("we\"ird"), "\"we\"\"ird\"");
  }

  #[test]
  fn invalid_utf8_text_keeps_its_bytes() {
    assert_eq!(decode_value(ValueRef::Text(b"caf\xc3\xa9")), Value::from("café"));
    assert_eq!(decode_value(ValueRef::Text(&[0xff, 0x41])), Value::Blob(vec![0xff, 0x41]));
  }
}
