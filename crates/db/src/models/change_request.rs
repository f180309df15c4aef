//! Profile change request model.

use serde::Serialize;
use sqlx::FromRow;
use tna_core::types::{DbId, Timestamp};

/// A request by a MODELO or CLIENTE to change one profile field.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct ChangeRequest {
    pub id: DbId,
    pub user_id: DbId,
    pub field: String,
    pub old_value: Option<String>,
    pub new_value: String,
    pub status: String,
    pub motivo: Option<String>,
    pub reviewed_by_id: Option<DbId>,
    pub reviewed_at: Option<Timestamp>,
    pub created_at: Timestamp,
}

/// DTO for creating a change request.
#[derive(Debug, Clone)]
pub struct CreateChangeRequest {
    pub user_id: DbId,
    pub field: String,
    pub old_value: Option<String>,
    pub new_value: String,
}
