//! `GET /api?databaseId=<id>` — describe every table in a tenant database.

use axum::{
  Json,
  extract::{Query, State},
};
use serde::{Deserialize, Serialize};
use trysql_core::{PublicId, TableDescription, TenantStore};

use crate::{AppState, error::ApiError};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DescribeParams {
  pub database_id: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct DescribeResponse {
  pub tables: Vec<TableDescription>,
}

pub async fn describe<S>(
  State(state): State<AppState<S>>,
  Query(params): Query<DescribeParams>,
) -> Result<Json<DescribeResponse>, ApiError>
where
  S: TenantStore,
{
  let raw = params
    .database_id
    .filter(|s| !s.is_empty())
    .ok_or_else(|| ApiError::BadRequest("Missing databaseId query parameter".to_owned()))?;
  let id = PublicId::parse(&raw).map_err(|e| ApiError::BadRequest(e.to_string()))?;

  let exists = state.store.exists(id.clone()).await.map_err(|e| {
    tracing::error!(%id, error = %e, "existence check failed");
    ApiError::Internal("Failed to check if database exists".to_owned())
  })?;
  if !exists {
    return Err(ApiError::NotFound("Database not found".to_owned()));
  }

  state.store.touch(id.clone()).await.map_err(|e| {
    tracing::error!(%id, error = %e, "failed to update last queried time");
    ApiError::Internal("Failed to update last queried time".to_owned())
  })?;

  let tables = state
    .store
    .describe(id)
    .await
    .map_err(ApiError::from_store)?;
  Ok(Json(DescribeResponse { tables }))
}
