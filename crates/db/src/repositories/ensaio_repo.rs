//! Repository for the `ensaios` table and its project/product links.

use sqlx::PgPool;
use tna_core::types::{DbId, Timestamp};

use crate::models::ensaio::{CreateEnsaio, Ensaio, UpdateEnsaio};
use crate::repositories::EnsaioPhotoRepo;

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, title, slug, description, shoot_date, status, created_by_id, \
                        subject_cpf, cover_image_key, term_pdf_key, sync_folder_url, \
                        deleted_at, created_at, updated_at";

/// Join tables linking an ensaio to catalog rows.
#[derive(Debug, Clone, Copy)]
enum Link {
    Projetos,
    Produtos,
}

impl Link {
    fn table_and_column(self) -> (&'static str, &'static str) {
        match self {
            Link::Projetos => ("ensaio_projetos", "projeto_id"),
            Link::Produtos => ("ensaio_produtos", "produto_id"),
        }
    }
}

/// Provides CRUD operations for ensaios.
pub struct EnsaioRepo;

impl EnsaioRepo {
    /// Insert an ensaio together with its projeto/produto links and initial
    /// photos. Everything is committed in one transaction or not at all.
    ///
    /// If `status` is `None` in the input, defaults to `PUBLISHED`.
    ///
    /// Returns the ensaio and the number of photos inserted.
    pub async fn create_with_links(
        pool: &PgPool,
        input: &CreateEnsaio,
        projeto_ids: &[DbId],
        produto_ids: &[DbId],
        photo_keys: &[String],
    ) -> Result<(Ensaio, u64), sqlx::Error> {
        let mut tx = pool.begin().await?;

        let query = format!(
            "INSERT INTO ensaios
                (title, slug, description, shoot_date, status, created_by_id, subject_cpf,
                 cover_image_key, term_pdf_key, sync_folder_url)
             VALUES ($1, $2, $3, $4, COALESCE($5, 'PUBLISHED'), $6, $7, $8, $9, $10)
             RETURNING {COLUMNS}"
        );
        let ensaio = sqlx::query_as::<_, Ensaio>(&query)
            .bind(&input.title)
            .bind(&input.slug)
            .bind(&input.description)
            .bind(input.shoot_date)
            .bind(&input.status)
            .bind(input.created_by_id)
            .bind(&input.subject_cpf)
            .bind(&input.cover_image_key)
            .bind(&input.term_pdf_key)
            .bind(&input.sync_folder_url)
            .fetch_one(&mut *tx)
            .await?;

        Self::replace_links_inner(&mut tx, Link::Projetos, ensaio.id, projeto_ids).await?;
        Self::replace_links_inner(&mut tx, Link::Produtos, ensaio.id, produto_ids).await?;
        let photos = EnsaioPhotoRepo::create_many_inner(&mut tx, ensaio.id, photo_keys).await?;

        tx.commit().await?;
        Ok((ensaio, photos))
    }

    /// Find an ensaio by ID. Excludes soft-deleted rows.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Ensaio>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM ensaios
             WHERE id = $1 AND deleted_at IS NULL AND status <> 'DELETED'"
        );
        sqlx::query_as::<_, Ensaio>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Find an ensaio by ID, including soft-deleted rows.
    pub async fn find_by_id_include_deleted(
        pool: &PgPool,
        id: DbId,
    ) -> Result<Option<Ensaio>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM ensaios WHERE id = $1");
        sqlx::query_as::<_, Ensaio>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List live ensaios, newest first.
    ///
    /// `created_by` restricts to one architect; `status` to one status.
    pub async fn list(
        pool: &PgPool,
        created_by: Option<DbId>,
        status: Option<&str>,
    ) -> Result<Vec<Ensaio>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM ensaios
             WHERE deleted_at IS NULL AND status <> 'DELETED'
               AND ($1::BIGINT IS NULL OR created_by_id = $1)
               AND ($2::TEXT IS NULL OR status = $2)
             ORDER BY created_at DESC"
        );
        sqlx::query_as::<_, Ensaio>(&query)
            .bind(created_by)
            .bind(status)
            .fetch_all(pool)
            .await
    }

    /// Published, live ensaios whose subject has the given CPF.
    pub async fn list_published_for_subject(
        pool: &PgPool,
        cpf: &str,
    ) -> Result<Vec<Ensaio>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM ensaios
             WHERE subject_cpf = $1 AND status = 'PUBLISHED' AND deleted_at IS NULL
             ORDER BY shoot_date DESC NULLS LAST, created_at DESC"
        );
        sqlx::query_as::<_, Ensaio>(&query)
            .bind(cpf)
            .fetch_all(pool)
            .await
    }

    /// Whether another ensaio (other than `exclude_id`) uses this slug.
    ///
    /// Deleted ensaios still hold their slug until purged.
    pub async fn slug_exists(
        pool: &PgPool,
        slug: &str,
        exclude_id: Option<DbId>,
    ) -> Result<bool, sqlx::Error> {
        sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(
                SELECT 1 FROM ensaios WHERE slug = $1 AND ($2::BIGINT IS NULL OR id <> $2)
             )",
        )
        .bind(slug)
        .bind(exclude_id)
        .fetch_one(pool)
        .await
    }

    /// Update an ensaio and, when given, replace its link sets, in one
    /// transaction. Only non-`None` fields in `input` are applied.
    ///
    /// Returns `None` (and changes nothing) if no live row with `id` exists.
    pub async fn update_with_links(
        pool: &PgPool,
        id: DbId,
        input: &UpdateEnsaio,
        projeto_ids: Option<&[DbId]>,
        produto_ids: Option<&[DbId]>,
    ) -> Result<Option<Ensaio>, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let query = format!(
            "UPDATE ensaios SET
                title = COALESCE($2, title),
                slug = COALESCE($3, slug),
                description = COALESCE($4, description),
                shoot_date = COALESCE($5, shoot_date),
                status = COALESCE($6, status),
                cover_image_key = COALESCE($7, cover_image_key),
                term_pdf_key = COALESCE($8, term_pdf_key),
                sync_folder_url = COALESCE($9, sync_folder_url)
             WHERE id = $1 AND deleted_at IS NULL
             RETURNING {COLUMNS}"
        );
        let Some(ensaio) = sqlx::query_as::<_, Ensaio>(&query)
            .bind(id)
            .bind(&input.title)
            .bind(&input.slug)
            .bind(&input.description)
            .bind(input.shoot_date)
            .bind(&input.status)
            .bind(&input.cover_image_key)
            .bind(&input.term_pdf_key)
            .bind(&input.sync_folder_url)
            .fetch_optional(&mut *tx)
            .await?
        else {
            return Ok(None);
        };

        if let Some(ids) = projeto_ids {
            Self::replace_links_inner(&mut tx, Link::Projetos, id, ids).await?;
        }
        if let Some(ids) = produto_ids {
            Self::replace_links_inner(&mut tx, Link::Produtos, id, ids).await?;
        }

        tx.commit().await?;
        Ok(Some(ensaio))
    }

    /// Point a live ensaio at a newly uploaded term PDF.
    pub async fn set_term_pdf_key(pool: &PgPool, id: DbId, key: &str) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE ensaios SET term_pdf_key = $2 WHERE id = $1 AND deleted_at IS NULL",
        )
        .bind(id)
        .bind(key)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Mark an ensaio deleted. Returns `true` if a live row was marked.
    pub async fn soft_delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE ensaios SET status = 'DELETED', deleted_at = NOW()
             WHERE id = $1 AND deleted_at IS NULL",
        )
        .bind(id)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Undo a soft delete. The ensaio comes back as DRAFT.
    pub async fn restore(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE ensaios SET status = 'DRAFT', deleted_at = NULL
             WHERE id = $1 AND deleted_at IS NOT NULL",
        )
        .bind(id)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Deleted ensaios of one architect whose deletion is older than `cutoff`.
    pub async fn list_purgeable(
        pool: &PgPool,
        created_by: DbId,
        cutoff: Timestamp,
    ) -> Result<Vec<Ensaio>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM ensaios
             WHERE created_by_id = $1
               AND deleted_at IS NOT NULL
               AND deleted_at <= $2
             ORDER BY deleted_at"
        );
        sqlx::query_as::<_, Ensaio>(&query)
            .bind(created_by)
            .bind(cutoff)
            .fetch_all(pool)
            .await
    }

    /// Permanently delete an ensaio. Photos and links cascade.
    pub async fn hard_delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM ensaios WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    // -----------------------------------------------------------------------
    // Project / product links
    // -----------------------------------------------------------------------

    /// Replace one link set of an ensaio within an existing transaction.
    async fn replace_links_inner(
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        link: Link,
        ensaio_id: DbId,
        ids: &[DbId],
    ) -> Result<(), sqlx::Error> {
        let (table, column) = link.table_and_column();
        sqlx::query(&format!("DELETE FROM {table} WHERE ensaio_id = $1"))
            .bind(ensaio_id)
            .execute(&mut **tx)
            .await?;
        if ids.is_empty() {
            return Ok(());
        }
        sqlx::query(&format!(
            "INSERT INTO {table} (ensaio_id, {column})
             SELECT $1, UNNEST($2::BIGINT[])
             ON CONFLICT DO NOTHING"
        ))
        .bind(ensaio_id)
        .bind(ids)
        .execute(&mut **tx)
        .await?;
        Ok(())
    }

    pub async fn list_projeto_ids(pool: &PgPool, ensaio_id: DbId) -> Result<Vec<DbId>, sqlx::Error> {
        sqlx::query_scalar::<_, DbId>(
            "SELECT projeto_id FROM ensaio_projetos WHERE ensaio_id = $1 ORDER BY projeto_id",
        )
        .bind(ensaio_id)
        .fetch_all(pool)
        .await
    }

    pub async fn list_produto_ids(pool: &PgPool, ensaio_id: DbId) -> Result<Vec<DbId>, sqlx::Error> {
        sqlx::query_scalar::<_, DbId>(
            "SELECT produto_id FROM ensaio_produtos WHERE ensaio_id = $1 ORDER BY produto_id",
        )
        .bind(ensaio_id)
        .fetch_all(pool)
        .await
    }
}
