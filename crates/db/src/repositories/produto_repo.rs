//! Repository for the `produtos` and `produto_photos` tables.

use sqlx::PgPool;
use tna_core::types::DbId;

use crate::models::produto::{CreateProduto, Produto, ProdutoPhoto, ProdutoWithCounts, UpdateProduto};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, slug, nome, short_description, full_description, preco_euro, \
                        categoria, is_active, cover_image_key, display_order, created_at, updated_at";

/// Same columns qualified with the `p` alias, for joins.
const P_COLUMNS: &str = "p.id, p.slug, p.nome, p.short_description, p.full_description, \
                          p.preco_euro, p.categoria, p.is_active, p.cover_image_key, \
                          p.display_order, p.created_at, p.updated_at";

const PHOTO_COLUMNS: &str = "id, produto_id, storage_key, sort_order, created_at";

/// Provides CRUD operations for produtos.
pub struct ProdutoRepo;

impl ProdutoRepo {
    /// Insert a new produto, returning the created row.
    pub async fn create(pool: &PgPool, input: &CreateProduto) -> Result<Produto, sqlx::Error> {
        let query = format!(
            "INSERT INTO produtos
                (slug, nome, short_description, full_description, preco_euro, categoria,
                 cover_image_key, display_order)
             VALUES ($1, $2, $3, $4, $5, $6, $7, COALESCE($8, 0))
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Produto>(&query)
            .bind(&input.slug)
            .bind(&input.nome)
            .bind(&input.short_description)
            .bind(&input.full_description)
            .bind(input.preco_euro)
            .bind(&input.categoria)
            .bind(&input.cover_image_key)
            .bind(input.display_order)
            .fetch_one(pool)
            .await
    }

    /// Find a produto by ID. Excludes soft-deleted rows.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Produto>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM produtos WHERE id = $1 AND deleted_at IS NULL");
        sqlx::query_as::<_, Produto>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Active, live produtos with usage counts, in catalog order.
    pub async fn list_active(
        pool: &PgPool,
        categoria: Option<&str>,
    ) -> Result<Vec<ProdutoWithCounts>, sqlx::Error> {
        let query = format!(
            "SELECT {P_COLUMNS},
                (SELECT COUNT(*) FROM ensaio_produtos ep
                   JOIN ensaios e ON e.id = ep.ensaio_id
                  WHERE ep.produto_id = p.id AND e.deleted_at IS NULL)::BIGINT AS ensaio_count,
                (SELECT COUNT(*) FROM intencoes_compra i
                  WHERE i.produto_id = p.id)::BIGINT AS intencao_count
             FROM produtos p
             WHERE p.deleted_at IS NULL
               AND p.is_active
               AND ($1::TEXT IS NULL OR p.categoria = $1)
             ORDER BY p.display_order ASC, p.categoria ASC NULLS LAST, p.nome ASC"
        );
        sqlx::query_as::<_, ProdutoWithCounts>(&query)
            .bind(categoria)
            .fetch_all(pool)
            .await
    }

    /// Whether a produto (other than `exclude_id`) uses this slug.
    pub async fn slug_exists(
        pool: &PgPool,
        slug: &str,
        exclude_id: Option<DbId>,
    ) -> Result<bool, sqlx::Error> {
        sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(
                SELECT 1 FROM produtos WHERE slug = $1 AND ($2::BIGINT IS NULL OR id <> $2)
             )",
        )
        .bind(slug)
        .bind(exclude_id)
        .fetch_one(pool)
        .await
    }

    /// Number of the given ids that refer to live produtos.
    pub async fn count_existing(pool: &PgPool, ids: &[DbId]) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*)::BIGINT FROM produtos WHERE id = ANY($1) AND deleted_at IS NULL",
        )
        .bind(ids)
        .fetch_one(pool)
        .await
    }

    /// Update a produto. Only non-`None` fields in `input` are applied.
    ///
    /// Returns `None` if no live row with the given `id` exists.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateProduto,
    ) -> Result<Option<Produto>, sqlx::Error> {
        let query = format!(
            "UPDATE produtos SET
                slug = COALESCE($2, slug),
                nome = COALESCE($3, nome),
                short_description = COALESCE($4, short_description),
                full_description = COALESCE($5, full_description),
                preco_euro = COALESCE($6, preco_euro),
                categoria = COALESCE($7, categoria),
                is_active = COALESCE($8, is_active),
                cover_image_key = COALESCE($9, cover_image_key),
                display_order = COALESCE($10, display_order)
             WHERE id = $1 AND deleted_at IS NULL
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Produto>(&query)
            .bind(id)
            .bind(&input.slug)
            .bind(&input.nome)
            .bind(&input.short_description)
            .bind(&input.full_description)
            .bind(input.preco_euro)
            .bind(&input.categoria)
            .bind(input.is_active)
            .bind(&input.cover_image_key)
            .bind(input.display_order)
            .fetch_optional(pool)
            .await
    }

    /// Soft-delete a produto by ID. Returns `true` if a row was marked deleted.
    pub async fn soft_delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE produtos SET deleted_at = NOW(), is_active = false
             WHERE id = $1 AND deleted_at IS NULL",
        )
        .bind(id)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    // -----------------------------------------------------------------------
    // Photos
    // -----------------------------------------------------------------------

    /// Append a photo after the existing ones unless the produto already has
    /// `max` of them.
    ///
    /// The produto row is locked while counting, so concurrent uploads cannot
    /// both take the last slot. Returns `None` when full.
    pub async fn add_photo_capped(
        pool: &PgPool,
        produto_id: DbId,
        storage_key: &str,
        max: i64,
    ) -> Result<Option<ProdutoPhoto>, sqlx::Error> {
        let mut tx = pool.begin().await?;

        sqlx::query("SELECT id FROM produtos WHERE id = $1 FOR UPDATE")
            .bind(produto_id)
            .execute(&mut *tx)
            .await?;

        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM produto_photos WHERE produto_id = $1")
                .bind(produto_id)
                .fetch_one(&mut *tx)
                .await?;
        if count >= max {
            return Ok(None);
        }

        let query = format!(
            "INSERT INTO produto_photos (produto_id, storage_key, sort_order)
             VALUES ($1, $2,
                     (SELECT COALESCE(MAX(sort_order) + 1, 0) FROM produto_photos WHERE produto_id = $1))
             RETURNING {PHOTO_COLUMNS}"
        );
        let photo = sqlx::query_as::<_, ProdutoPhoto>(&query)
            .bind(produto_id)
            .bind(storage_key)
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(Some(photo))
    }

    pub async fn list_photos(
        pool: &PgPool,
        produto_id: DbId,
    ) -> Result<Vec<ProdutoPhoto>, sqlx::Error> {
        let query = format!(
            "SELECT {PHOTO_COLUMNS} FROM produto_photos
             WHERE produto_id = $1
             ORDER BY sort_order ASC, id ASC"
        );
        sqlx::query_as::<_, ProdutoPhoto>(&query)
            .bind(produto_id)
            .fetch_all(pool)
            .await
    }

    /// Remove a photo of the given produto, returning its storage key.
    pub async fn delete_photo(
        pool: &PgPool,
        produto_id: DbId,
        photo_id: DbId,
    ) -> Result<Option<String>, sqlx::Error> {
        sqlx::query_scalar::<_, String>(
            "DELETE FROM produto_photos WHERE id = $1 AND produto_id = $2 RETURNING storage_key",
        )
        .bind(photo_id)
        .bind(produto_id)
        .fetch_optional(pool)
        .await
    }
}
