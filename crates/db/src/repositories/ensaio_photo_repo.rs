//! Repository for the `ensaio_photos` table.

use sqlx::PgPool;
use tna_core::types::DbId;

use crate::models::ensaio::{EnsaioPhoto, PhotoOrder};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, ensaio_id, storage_key, sort_order, deleted_at, created_at";

/// Outcome of [`EnsaioPhotoRepo::reserve_slot`].
#[derive(Debug)]
pub enum PhotoSlot {
    Reserved(EnsaioPhoto),
    Full,
}

/// Provides CRUD operations for ensaio photos.
pub struct EnsaioPhotoRepo;

impl EnsaioPhotoRepo {
    /// Insert several photos in order; `sort_order` is the index in `keys`.
    pub(crate) async fn create_many_inner(
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        ensaio_id: DbId,
        keys: &[String],
    ) -> Result<u64, sqlx::Error> {
        if keys.is_empty() {
            return Ok(0);
        }
        let result = sqlx::query(
            "INSERT INTO ensaio_photos (ensaio_id, storage_key, sort_order)
             SELECT $1, k.key, (k.ord - 1)::INT
             FROM UNNEST($2::TEXT[]) WITH ORDINALITY AS k(key, ord)",
        )
        .bind(ensaio_id)
        .bind(keys)
        .execute(&mut **tx)
        .await?;
        Ok(result.rows_affected())
    }

    /// Claim the next photo slot of an ensaio before its object is uploaded.
    ///
    /// The ensaio row is locked while the slot is computed, so concurrent
    /// uploads get distinct sequence numbers. `key_for` receives the 1-based
    /// sequence (soft-deleted photos included) and returns the storage key.
    /// `sort_order` defaults to the number of live photos. Returns
    /// [`PhotoSlot::Full`] once `max_live` live photos exist.
    pub async fn reserve_slot(
        pool: &PgPool,
        ensaio_id: DbId,
        max_live: i64,
        sort_order: Option<i32>,
        key_for: impl FnOnce(u32) -> String,
    ) -> Result<PhotoSlot, sqlx::Error> {
        let mut tx = pool.begin().await?;

        sqlx::query("SELECT id FROM ensaios WHERE id = $1 FOR UPDATE")
            .bind(ensaio_id)
            .execute(&mut *tx)
            .await?;

        let (total, live) = sqlx::query_as::<_, (i64, i64)>(
            "SELECT COUNT(*)::BIGINT,
                    COUNT(*) FILTER (WHERE deleted_at IS NULL)::BIGINT
             FROM ensaio_photos WHERE ensaio_id = $1",
        )
        .bind(ensaio_id)
        .fetch_one(&mut *tx)
        .await?;
        if live >= max_live {
            return Ok(PhotoSlot::Full);
        }

        let key = key_for(total as u32 + 1);
        let query = format!(
            "INSERT INTO ensaio_photos (ensaio_id, storage_key, sort_order)
             VALUES ($1, $2, $3)
             RETURNING {COLUMNS}"
        );
        let photo = sqlx::query_as::<_, EnsaioPhoto>(&query)
            .bind(ensaio_id)
            .bind(&key)
            .bind(sort_order.unwrap_or(live as i32))
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(PhotoSlot::Reserved(photo))
    }

    /// Remove a photo row outright. Used to release a slot whose upload failed.
    pub async fn hard_delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM ensaio_photos WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Find a live photo by ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<EnsaioPhoto>, sqlx::Error> {
        let query =
            format!("SELECT {COLUMNS} FROM ensaio_photos WHERE id = $1 AND deleted_at IS NULL");
        sqlx::query_as::<_, EnsaioPhoto>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Live photos of an ensaio in display order.
    pub async fn list_for_ensaio(
        pool: &PgPool,
        ensaio_id: DbId,
    ) -> Result<Vec<EnsaioPhoto>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM ensaio_photos
             WHERE ensaio_id = $1 AND deleted_at IS NULL
             ORDER BY sort_order ASC, created_at DESC"
        );
        sqlx::query_as::<_, EnsaioPhoto>(&query)
            .bind(ensaio_id)
            .fetch_all(pool)
            .await
    }

    /// Every storage key of an ensaio, including soft-deleted photos.
    pub async fn list_all_keys(pool: &PgPool, ensaio_id: DbId) -> Result<Vec<String>, sqlx::Error> {
        sqlx::query_scalar::<_, String>(
            "SELECT storage_key FROM ensaio_photos WHERE ensaio_id = $1 ORDER BY id",
        )
        .bind(ensaio_id)
        .fetch_all(pool)
        .await
    }

    /// Number of live photos of an ensaio.
    pub async fn count_for_ensaio(pool: &PgPool, ensaio_id: DbId) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*)::BIGINT FROM ensaio_photos WHERE ensaio_id = $1 AND deleted_at IS NULL",
        )
        .bind(ensaio_id)
        .fetch_one(pool)
        .await
    }

    /// Apply new sort positions in one transaction.
    ///
    /// Only photos of `ensaio_id` are touched. Returns the number of rows updated.
    pub async fn reorder(
        pool: &PgPool,
        ensaio_id: DbId,
        orders: &[PhotoOrder],
    ) -> Result<u64, sqlx::Error> {
        let mut tx = pool.begin().await?;
        let mut updated = 0;
        for order in orders {
            let result = sqlx::query(
                "UPDATE ensaio_photos SET sort_order = $3
                 WHERE id = $1 AND ensaio_id = $2 AND deleted_at IS NULL",
            )
            .bind(order.id)
            .bind(ensaio_id)
            .bind(order.sort_order)
            .execute(&mut *tx)
            .await?;
            updated += result.rows_affected();
        }
        tx.commit().await?;
        Ok(updated)
    }

    /// Soft-delete a photo. Returns `true` if a live row was marked deleted.
    pub async fn soft_delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE ensaio_photos SET deleted_at = NOW() WHERE id = $1 AND deleted_at IS NULL",
        )
        .bind(id)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }
}
