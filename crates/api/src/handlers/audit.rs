//! Handler for reading the audit trail (`/audit-logs`).

use axum::extract::{Query, State};
use axum::Json;
use serde::Deserialize;
use tna_core::types::DbId;
use tna_db::models::audit::{AuditLog, AuditQuery};
use tna_db::repositories::AuditRepo;

use crate::error::AppResult;
use crate::middleware::rbac::RequireStaff;
use crate::query::{clamp_limit, clamp_offset};
use crate::response::PageResponse;
use crate::state::AppState;

/// Query parameters for `GET /audit-logs`. `user_id` filters by actor.
#[derive(Debug, Deserialize)]
pub struct AuditLogParams {
    pub entity: Option<String>,
    pub entity_id: Option<String>,
    pub user_id: Option<DbId>,
    pub action: Option<String>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

/// GET /api/v1/audit-logs
pub async fn list_audit_logs(
    RequireStaff(_user): RequireStaff,
    State(state): State<AppState>,
    Query(params): Query<AuditLogParams>,
) -> AppResult<Json<PageResponse<AuditLog>>> {
    let limit = clamp_limit(params.limit);
    let offset = clamp_offset(params.offset);
    let query = AuditQuery {
        entity: params.entity,
        entity_id: params.entity_id,
        actor_id: params.user_id,
        action: params.action,
        limit: Some(limit),
        offset: Some(offset),
    };

    let data = AuditRepo::query(&state.pool, &query).await?;
    let total = AuditRepo::count(&state.pool, &query).await?;
    Ok(Json(PageResponse {
        data,
        total,
        limit,
        offset,
    }))
}
