//! Projeto entity model and DTOs.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use tna_core::types::{DbId, Timestamp};

/// A projeto row from the `projetos` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Projeto {
    pub id: DbId,
    pub name: String,
    pub slug: String,
    pub description: Option<String>,
    pub active: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// A projeto with the number of live ensaios tagged with it.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct ProjetoWithCount {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub projeto: Projeto,
    pub ensaio_count: i64,
}

/// DTO for creating a new projeto.
#[derive(Debug, Clone)]
pub struct CreateProjeto {
    pub name: String,
    pub slug: String,
    pub description: Option<String>,
    /// Defaults to `true` if omitted.
    pub active: Option<bool>,
}

/// DTO for updating an existing projeto. All fields are optional.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateProjeto {
    pub name: Option<String>,
    pub slug: Option<String>,
    pub description: Option<String>,
    pub active: Option<bool>,
}
