//! `POST /api` — run one SQL statement against a tenant database.
//!
//! Failures of the SQL itself answer 400 with the engine's message and the
//! elapsed time; they are the caller's problem, not the server's.

use axum::{
  Json,
  extract::{State, rejection::JsonRejection},
  http::StatusCode,
  response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use tokio::time::Instant;
use trysql_core::{Classify, ErrorKind, PublicId, Row, Tabular, TenantStore};

use crate::{AppState, error::ApiError};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryBody {
  pub database_id: PublicId,
  pub query:       String,
}

/// Wire shape of a query result.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryResults {
  pub name:         &'static str,
  pub columns:      Vec<String>,
  pub column_count: usize,
  pub rows:         Vec<Row>,
  pub row_count:    usize,
}

impl From<Tabular> for QueryResults {
  fn from(t: Tabular) -> Self {
    Self {
      name:         "QueryResult",
      column_count: t.column_count(),
      row_count:    t.row_count(),
      columns:      t.columns,
      rows:         t.rows,
    }
  }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryResponse {
  /// Milliseconds spent executing the statement.
  pub execution_time: u64,
  pub results:        QueryResults,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryFailure {
  pub execution_time: u64,
  pub error:          String,
}

pub async fn execute<S>(
  State(state): State<AppState<S>>,
  body: Result<Json<QueryBody>, JsonRejection>,
) -> Result<Response, ApiError>
where
  S: TenantStore,
{
  let Json(body) = body.map_err(|e| {
    tracing::debug!(error = %e, "rejected query body");
    ApiError::BadRequest("Invalid request body".to_owned())
  })?;
  let id = body.database_id;

  state.store.touch(id.clone()).await.map_err(|e| {
    tracing::warn!(%id, error = %e, "failed to update last queried time");
    ApiError::Internal("Failed to update last queried time".to_owned())
  })?;

  let started = Instant::now();
  let outcome = state.store.execute(id.clone(), body.query).await;
  let execution_time = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);

  match outcome {
    Ok(table) => {
      tracing::debug!(%id, execution_time, rows = table.row_count(), "query executed");
      Ok(Json(QueryResponse { execution_time, results: table.into() }).into_response())
    }
    Err(e) if e.kind() == ErrorKind::Execution => {
      tracing::debug!(%id, error = %e, "query failed");
      let failure = QueryFailure { execution_time, error: e.to_string() };
      Ok((StatusCode::BAD_REQUEST, Json(failure)).into_response())
    }
    Err(e) => {
      tracing::error!(%id, error = %e, "query could not run");
      Err(ApiError::from_store(e))
    }
  }
}
