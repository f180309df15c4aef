//! Architect write-session model.

use serde::Serialize;
use sqlx::FromRow;
use tna_core::types::{DbId, Timestamp};

/// One login session of an ARQUITETO. At most one per user is active.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct ArquitetoSession {
    pub id: DbId,
    pub user_id: DbId,
    pub session_id: String,
    pub is_active: bool,
    pub expires_at: Timestamp,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}
