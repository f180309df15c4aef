//! Repository for the `projetos` table.

use sqlx::PgPool;
use tna_core::types::DbId;

use crate::models::projeto::{CreateProjeto, Projeto, ProjetoWithCount, UpdateProjeto};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, name, slug, description, active, created_at, updated_at";

/// Provides CRUD operations for projetos.
pub struct ProjetoRepo;

impl ProjetoRepo {
    /// Insert a new projeto, returning the created row.
    ///
    /// If `active` is `None` in the input, defaults to `true`.
    pub async fn create(pool: &PgPool, input: &CreateProjeto) -> Result<Projeto, sqlx::Error> {
        let query = format!(
            "INSERT INTO projetos (name, slug, description, active)
             VALUES ($1, $2, $3, COALESCE($4, true))
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Projeto>(&query)
            .bind(&input.name)
            .bind(&input.slug)
            .bind(&input.description)
            .bind(input.active)
            .fetch_one(pool)
            .await
    }

    /// Find a projeto by ID. Excludes soft-deleted rows.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Projeto>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM projetos WHERE id = $1 AND deleted_at IS NULL");
        sqlx::query_as::<_, Projeto>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List live projetos by name with the count of live ensaios tagged.
    pub async fn list(
        pool: &PgPool,
        active_only: bool,
    ) -> Result<Vec<ProjetoWithCount>, sqlx::Error> {
        sqlx::query_as::<_, ProjetoWithCount>(
            "SELECT p.id, p.name, p.slug, p.description, p.active, p.created_at, p.updated_at,
                (SELECT COUNT(*) FROM ensaio_projetos ep
                   JOIN ensaios e ON e.id = ep.ensaio_id
                  WHERE ep.projeto_id = p.id AND e.deleted_at IS NULL)::BIGINT AS ensaio_count
             FROM projetos p
             WHERE p.deleted_at IS NULL
               AND (NOT $1 OR p.active)
             ORDER BY p.name ASC",
        )
        .bind(active_only)
        .fetch_all(pool)
        .await
    }

    /// Whether a projeto (other than `exclude_id`) uses this slug.
    pub async fn slug_exists(
        pool: &PgPool,
        slug: &str,
        exclude_id: Option<DbId>,
    ) -> Result<bool, sqlx::Error> {
        sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(
                SELECT 1 FROM projetos WHERE slug = $1 AND ($2::BIGINT IS NULL OR id <> $2)
             )",
        )
        .bind(slug)
        .bind(exclude_id)
        .fetch_one(pool)
        .await
    }

    /// Number of the given ids that refer to live projetos.
    pub async fn count_existing(pool: &PgPool, ids: &[DbId]) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*)::BIGINT FROM projetos WHERE id = ANY($1) AND deleted_at IS NULL",
        )
        .bind(ids)
        .fetch_one(pool)
        .await
    }

    /// Update a projeto. Only non-`None` fields in `input` are applied.
    ///
    /// Returns `None` if no live row with the given `id` exists.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateProjeto,
    ) -> Result<Option<Projeto>, sqlx::Error> {
        let query = format!(
            "UPDATE projetos SET
                name = COALESCE($2, name),
                slug = COALESCE($3, slug),
                description = COALESCE($4, description),
                active = COALESCE($5, active)
             WHERE id = $1 AND deleted_at IS NULL
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Projeto>(&query)
            .bind(id)
            .bind(&input.name)
            .bind(&input.slug)
            .bind(&input.description)
            .bind(input.active)
            .fetch_optional(pool)
            .await
    }

    /// Soft-delete a projeto by ID. Returns `true` if a row was marked deleted.
    pub async fn soft_delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE projetos SET deleted_at = NOW() WHERE id = $1 AND deleted_at IS NULL",
        )
        .bind(id)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }
}
