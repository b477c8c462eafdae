//! Tenant lifecycle endpoints.
//!
//! | Method | Path         | Notes |
//! |--------|--------------|-------|
//! | `POST` | `/api/new`   | Sweeps stale tenants first; sweep failures are only logged |
//! | `POST` | `/api/reset` | Body: `{"databaseId":"abcDE"}`; 404 if unknown |

use axum::{
  Json,
  extract::{State, rejection::JsonRejection},
};
use serde::{Deserialize, Serialize};
use trysql_core::{PublicId, TenantStore};

use crate::{AppState, error::ApiError};

// ─── Create ──────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateResponse {
  pub database_id: PublicId,
}

/// `POST /api/new`
pub async fn create<S>(
  State(state): State<AppState<S>>,
) -> Result<Json<CreateResponse>, ApiError>
where
  S: TenantStore,
{
  // Best-effort cleanup; never blocks creation.
  match state.store.sweep(state.retention).await {
    Ok(report) => tracing::debug!(
      stale = report.stale.len(),
      orphaned = report.orphaned.len(),
      "pre-creation sweep finished"
    ),
    Err(e) => tracing::warn!(error = %e, "failed to delete stale databases"),
  }

  let database_id = state.store.create_tenant().await.map_err(|e| {
    tracing::error!(error = %e, "failed to register tenant");
    ApiError::Internal("Failed to create new database".to_owned())
  })?;
  Ok(Json(CreateResponse { database_id }))
}

// ─── Reset ───────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResetBody {
  pub database_id: PublicId,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
  pub message: String,
}

/// `POST /api/reset`
pub async fn reset<S>(
  State(state): State<AppState<S>>,
  body: Result<Json<ResetBody>, JsonRejection>,
) -> Result<Json<MessageResponse>, ApiError>
where
  S: TenantStore,
{
  let Json(body) =
    body.map_err(|_| ApiError::BadRequest("Invalid request body".to_owned()))?;

  state
    .store
    .reset(body.database_id)
    .await
    .map_err(ApiError::from_store)?;
  Ok(Json(MessageResponse { message: "Database reset successfully".to_owned() }))
}
