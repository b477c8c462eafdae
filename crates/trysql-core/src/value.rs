//! Dynamically typed cell values.

use base64::{Engine as _, engine::general_purpose::STANDARD as B64};
use serde::{Serialize, Serializer};

/// One cell of a result row, carrying the engine's native storage class.
///
/// Serialises untagged: integers and reals as JSON numbers, text as a string,
/// blobs as a base64 string and null as `null`.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
  Null,
  Integer(i64),
  Real(f64),
  Text(String),
  Blob(Vec<u8>),
}

impl Value {
  pub fn is_null(&self) -> bool { matches!(self, Value::Null) }

  pub fn as_i64(&self) -> Option<i64> {
    match self {
      Value::Integer(i) => Some(*i),
      _ => None,
    }
  }

  pub fn as_str(&self) -> Option<&str> {
    match self {
      Value::Text(s) => Some(s),
      _ => None,
    }
  }
}

impl Serialize for Value {
  fn serialize<S: Serializer>(&self, ser: S) -> Result<S::Ok, S::Error> {
    match self {
      Value::Null => ser.serialize_unit(),
      Value::Integer(i) => ser.serialize_i64(*i),
      Value::Real(f) => ser.serialize_f64(*f),
      Value::Text(s) => ser.serialize_str(s),
      Value::Blob(b) => ser.serialize_str(&B64.encode(b)),
    }
  }
}

impl From<i64> for Value {
  fn from(v: i64) -> Self { Value::Integer(v) }
}

impl From<f64> for Value {
  fn from(v: f64) -> Self { Value::Real(v) }
}

impl From<&str> for Value {
  fn from(v: &str) -> Self { Value::Text(v.to_owned()) }
}

impl From<String> for Value {
  fn from(v: String) -> Self { Value::Text(v) }
}

impl From<Vec<u8>> for Value {
  fn from(v: Vec<u8>) -> Self { Value::Blob(v) }
}

impl<T: Into<Value>> From<Option<T>> for Value {
  fn from(v: Option<T>) -> Self { v.map_or(Value::Null, Into::into) }
}

#[cfg(test)]
mod tests {
  use serde_json::json;

  use super::*;

  #[test]
  fn integers_stay_integers() {
    let v = serde_json::to_value(Value::Integer(9_007_199_254_740_993)).unwrap();
    assert_eq!(v, json!(9_007_199_254_740_993_i64));
    assert!(v.is_i64());
  }

  #[test]
  fn every_storage_class_serialises() {
    let row = vec![
      Value::Null,
      Value::Integer(1),
      Value::Real(1.5),
      Value::from("x"),
      Value::Blob(vec![0xde, 0xad, 0xbe, 0xef]),
    ];
    assert_eq!(
      serde_json::to_value(&row).unwrap(),
      json!([null, 1, 1.5, "x", "3q2+7w=="])
    );
  }
}
