//! Schema introspection and ad-hoc execution against a single tenant
//! connection. Everything here is synchronous and runs on the connection's
//! own thread inside `tokio_rusqlite::Connection::call`.

use rusqlite::{Batch, Connection};
use trysql_core::{TableDescription, Tabular};

use crate::{
  Error, Result,
  encode::{decode_row, quote_ident},
};

const USER_TABLES: &str = "SELECT name FROM sqlite_master
   WHERE type = 'table' AND name NOT LIKE 'sqlite\\_%' ESCAPE '\\'
   ORDER BY name";

const TABLE_COLUMNS: &str =
  "SELECT name FROM pragma_table_info(?1) ORDER BY cid";

/// Every user table with its columns in declared order and all of its rows.
pub fn describe(conn: &Connection) -> rusqlite::Result<Vec<TableDescription>> {
  let mut stmt = conn.prepare(USER_TABLES)?;
  let names = stmt
    .query_map([], |row| row.get::<_, String>(0))?
    .collect::<rusqlite::Result<Vec<_>>>()?;

  let mut tables = Vec::with_capacity(names.len());
  for name in names {
    let mut stmt = conn.prepare(TABLE_COLUMNS)?;
    let columns = stmt
      .query_map(rusqlite::params![name], |row| row.get::<_, String>(0))?
      .collect::<rusqlite::Result<Vec<_>>>()?;

    let projection = columns
      .iter()
      .map(|c| quote_ident(c))
      .collect::<Vec<_>>()
      .join(", ");
    let sql = format!("SELECT {projection} FROM {}", quote_ident(&name));
    let mut stmt = conn.prepare(&sql)?;
    let rows = read_rows(&mut stmt, columns.len())?;

    tables.push(TableDescription { name, data: Tabular::new(columns, rows) });
  }
  Ok(tables)
}

/// Run exactly one statement and materialise whatever it returns.
///
/// Statements without a result set yield no columns and no rows.
pub fn execute(conn: &Connection, sql: &str) -> Result<Tabular> {
  let mut batch = Batch::new(conn, sql);
  let mut stmt = batch
    .next()
    .map_err(Error::Execution)?
    .ok_or(Error::EmptyStatement)?;

  // A trailing statement that fails to prepare is still a second statement.
  if !matches!(batch.next(), Ok(None)) {
    return Err(Error::MultipleStatements);
  }

  let columns = stmt
    .column_names()
    .into_iter()
    .map(str::to_owned)
    .collect::<Vec<_>>();
  let rows = read_rows(&mut stmt, columns.len()).map_err(Error::Execution)?;
  Ok(Tabular::new(columns, rows))
}

fn read_rows(
  stmt:  &mut rusqlite::Statement<'_>,
  width: usize,
) -> rusqlite::Result<Vec<trysql_core::Row>> {
  let mut rows = stmt.query([])?;
  let mut out = Vec::new();
  while let Some(row) = rows.next()? {
    out.push(decode_row(row, width)?);
  }
  Ok(out)
}
