//! The uniform columns-plus-rows shape shared by schema introspection and
//! ad-hoc query execution.

use serde::Serialize;

use crate::value::Value;

/// One row, positionally aligned with [`Tabular::columns`].
pub type Row = Vec<Value>;

/// Column names and fully materialised rows.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Tabular {
  pub columns: Vec<String>,
  pub rows:    Vec<Row>,
}

impl Tabular {
  pub fn new(columns: Vec<String>, rows: Vec<Row>) -> Self {
    Self { columns, rows }
  }

  pub fn column_count(&self) -> usize { self.columns.len() }

  pub fn row_count(&self) -> usize { self.rows.len() }
}

/// A user table together with its full contents.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TableDescription {
  pub name: String,
  #[serde(flatten)]
  pub data: Tabular,
}

#[cfg(test)]
mod tests {
  use serde_json::json;

  use super::*;

  #[test]
  fn description_flattens_into_one_object() {
    let table = TableDescription {
      name: "t".to_owned(),
      data: Tabular::new(
        vec!["a".to_owned(), "b".to_owned()],
        vec![vec![Value::Integer(1), Value::from("x")]],
      ),
    };
    assert_eq!(
      serde_json::to_value(&table).unwrap(),
      json!({ "name": "t", "columns": ["a", "b"], "rows": [[1, "x"]] })
    );
  }
}
