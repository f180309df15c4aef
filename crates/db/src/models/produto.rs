//! Produto (product) entity model and DTOs.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use tna_core::types::{DbId, Timestamp};

/// A produto row from the `produtos` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Produto {
    pub id: DbId,
    pub slug: String,
    pub nome: String,
    pub short_description: Option<String>,
    pub full_description: Option<String>,
    pub preco_euro: Option<f64>,
    pub categoria: Option<String>,
    pub is_active: bool,
    pub cover_image_key: Option<String>,
    pub display_order: i32,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// A produto with the number of linked ensaios and purchase intents.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct ProdutoWithCounts {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub produto: Produto,
    pub ensaio_count: i64,
    pub intencao_count: i64,
}

/// A gallery image of a produto.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct ProdutoPhoto {
    pub id: DbId,
    pub produto_id: DbId,
    pub storage_key: String,
    pub sort_order: i32,
    pub created_at: Timestamp,
}

/// DTO for creating a new produto. `slug` is derived by the caller.
#[derive(Debug, Clone)]
pub struct CreateProduto {
    pub slug: String,
    pub nome: String,
    pub short_description: Option<String>,
    pub full_description: Option<String>,
    pub preco_euro: Option<f64>,
    pub categoria: Option<String>,
    pub cover_image_key: Option<String>,
    pub display_order: Option<i32>,
}

/// DTO for updating an existing produto. All fields are optional.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateProduto {
    pub slug: Option<String>,
    pub nome: Option<String>,
    pub short_description: Option<String>,
    pub full_description: Option<String>,
    pub preco_euro: Option<f64>,
    pub categoria: Option<String>,
    pub is_active: Option<bool>,
    pub cover_image_key: Option<String>,
    pub display_order: Option<i32>,
}
