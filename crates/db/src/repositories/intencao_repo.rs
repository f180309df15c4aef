//! Repository for the `intencoes_compra` table.

use sqlx::PgPool;
use tna_core::types::DbId;

use crate::models::intencao::{Intencao, IntencaoDetail};

const COLUMNS: &str = "id, modelo_id, produto_id, status, created_at, updated_at";

/// Provides operations for purchase intents.
pub struct IntencaoRepo;

impl IntencaoRepo {
    /// Record a new PENDENTE intent.
    pub async fn create(
        pool: &PgPool,
        modelo_id: DbId,
        produto_id: DbId,
    ) -> Result<Intencao, sqlx::Error> {
        let query = format!(
            "INSERT INTO intencoes_compra (modelo_id, produto_id)
             VALUES ($1, $2)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Intencao>(&query)
            .bind(modelo_id)
            .bind(produto_id)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Intencao>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM intencoes_compra WHERE id = $1");
        sqlx::query_as::<_, Intencao>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Whether the modelo already has a PENDENTE intent for the produto.
    pub async fn has_pending(
        pool: &PgPool,
        modelo_id: DbId,
        produto_id: DbId,
    ) -> Result<bool, sqlx::Error> {
        sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(
                SELECT 1 FROM intencoes_compra
                WHERE modelo_id = $1 AND produto_id = $2 AND status = 'PENDENTE'
             )",
        )
        .bind(modelo_id)
        .bind(produto_id)
        .fetch_one(pool)
        .await
    }

    /// Intents with produto and modelo names, newest first.
    pub async fn list(
        pool: &PgPool,
        modelo_id: Option<DbId>,
    ) -> Result<Vec<IntencaoDetail>, sqlx::Error> {
        sqlx::query_as::<_, IntencaoDetail>(
            "SELECT i.id, i.modelo_id, i.produto_id, i.status, i.created_at, i.updated_at,
                    p.nome AS produto_nome, p.slug AS produto_slug,
                    p.preco_euro AS produto_preco_euro,
                    u.name AS modelo_name, u.email AS modelo_email
             FROM intencoes_compra i
             JOIN produtos p ON p.id = i.produto_id
             JOIN users u ON u.id = i.modelo_id
             WHERE ($1::BIGINT IS NULL OR i.modelo_id = $1)
             ORDER BY i.created_at DESC",
        )
        .bind(modelo_id)
        .fetch_all(pool)
        .await
    }

    /// Set the status when it still equals `expected`.
    ///
    /// Returns `None` when the row is missing or its status changed meanwhile.
    pub async fn update_status(
        pool: &PgPool,
        id: DbId,
        expected: &str,
        status: &str,
    ) -> Result<Option<Intencao>, sqlx::Error> {
        let query = format!(
            "UPDATE intencoes_compra SET status = $3
             WHERE id = $1 AND status = $2
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Intencao>(&query)
            .bind(id)
            .bind(expected)
            .bind(status)
            .fetch_optional(pool)
            .await
    }
}
