//! Purchase intent (`intencoes_compra`) model.

use serde::Serialize;
use sqlx::FromRow;
use tna_core::types::{DbId, Timestamp};

/// A purchase intent row.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Intencao {
    pub id: DbId,
    pub modelo_id: DbId,
    pub produto_id: DbId,
    pub status: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// A purchase intent joined with the names shown in listings.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct IntencaoDetail {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub intencao: Intencao,
    pub produto_nome: String,
    pub produto_slug: String,
    pub produto_preco_euro: Option<f64>,
    pub modelo_name: Option<String>,
    pub modelo_email: String,
}
