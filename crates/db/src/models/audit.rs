//! Audit log model.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use tna_core::types::{DbId, Timestamp};

/// One row of the append-only `audit_logs` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct AuditLog {
    pub id: DbId,
    pub actor_id: Option<DbId>,
    pub action: String,
    pub entity: String,
    pub entity_id: String,
    pub metadata: Option<serde_json::Value>,
    pub signature: String,
    pub created_at: Timestamp,
}

/// DTO for inserting an entry. Metadata must already be sanitized.
#[derive(Debug, Clone)]
pub struct CreateAuditLog {
    pub actor_id: Option<DbId>,
    pub action: String,
    pub entity: String,
    pub entity_id: String,
    pub metadata: Option<serde_json::Value>,
    pub signature: String,
}

/// Filters for listing entries.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AuditQuery {
    pub entity: Option<String>,
    pub entity_id: Option<String>,
    pub actor_id: Option<DbId>,
    pub action: Option<String>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}
