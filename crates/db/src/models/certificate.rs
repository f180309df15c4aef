//! Admin signing certificate (ICP-Brasil A1) model.

use serde::Serialize;
use sqlx::FromRow;
use tna_core::types::{DbId, Timestamp};

/// Certificate metadata. The sealed file and password columns are never
/// selected into this struct.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct AdminCertificate {
    pub id: DbId,
    pub user_id: DbId,
    pub certificate_hash: String,
    pub serial_number: String,
    pub issuer: String,
    pub valid_from: Timestamp,
    pub valid_until: Timestamp,
    pub is_active: bool,
    pub created_by_id: Option<DbId>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for registering (or replacing) a user's certificate.
#[derive(Debug, Clone)]
pub struct CreateCertificate {
    pub user_id: DbId,
    pub certificate_hash: String,
    pub serial_number: String,
    pub issuer: String,
    pub valid_from: Timestamp,
    pub valid_until: Timestamp,
    pub sealed_file: Option<Vec<u8>>,
    pub sealed_password: Option<Vec<u8>>,
    pub created_by_id: DbId,
}
