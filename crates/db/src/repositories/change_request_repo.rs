//! Repository for the `change_requests` table.

use sqlx::PgPool;
use tna_core::types::DbId;

use crate::models::change_request::{ChangeRequest, CreateChangeRequest};
use crate::models::user::UpdateUser;
use crate::repositories::UserRepo;

const COLUMNS: &str = "id, user_id, field, old_value, new_value, status, motivo, \
                        reviewed_by_id, reviewed_at, created_at";

/// Provides operations for profile change requests.
pub struct ChangeRequestRepo;

impl ChangeRequestRepo {
    pub async fn create(
        pool: &PgPool,
        input: &CreateChangeRequest,
    ) -> Result<ChangeRequest, sqlx::Error> {
        let query = format!(
            "INSERT INTO change_requests (user_id, field, old_value, new_value)
             VALUES ($1, $2, $3, $4)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, ChangeRequest>(&query)
            .bind(input.user_id)
            .bind(&input.field)
            .bind(&input.old_value)
            .bind(&input.new_value)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<ChangeRequest>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM change_requests WHERE id = $1");
        sqlx::query_as::<_, ChangeRequest>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Whether the user already has a PENDING request for `field`.
    pub async fn has_pending(pool: &PgPool, user_id: DbId, field: &str) -> Result<bool, sqlx::Error> {
        sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(
                SELECT 1 FROM change_requests
                WHERE user_id = $1 AND field = $2 AND status = 'PENDING'
             )",
        )
        .bind(user_id)
        .bind(field)
        .fetch_one(pool)
        .await
    }

    /// A user's own requests, newest first.
    pub async fn list_for_user(
        pool: &PgPool,
        user_id: DbId,
    ) -> Result<Vec<ChangeRequest>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM change_requests WHERE user_id = $1 ORDER BY created_at DESC"
        );
        sqlx::query_as::<_, ChangeRequest>(&query)
            .bind(user_id)
            .fetch_all(pool)
            .await
    }

    /// All requests, optionally of one status, oldest first so the queue is FIFO.
    pub async fn list(pool: &PgPool, status: Option<&str>) -> Result<Vec<ChangeRequest>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM change_requests
             WHERE ($1::TEXT IS NULL OR status = $1)
             ORDER BY created_at ASC"
        );
        sqlx::query_as::<_, ChangeRequest>(&query)
            .bind(status)
            .fetch_all(pool)
            .await
    }

    /// Close a PENDING request. Returns `None` if it was already processed.
    pub async fn resolve(
        pool: &PgPool,
        id: DbId,
        status: &str,
        reviewer_id: DbId,
        motivo: Option<&str>,
    ) -> Result<Option<ChangeRequest>, sqlx::Error> {
        let mut tx = pool.begin().await?;
        let resolved = Self::resolve_inner(&mut tx, id, status, reviewer_id, motivo).await?;
        tx.commit().await?;
        Ok(resolved)
    }

    /// Mark a PENDING request APPROVED and apply `change` to its user in the
    /// same transaction.
    ///
    /// Returns `None`, with nothing written, if the request was no longer
    /// PENDING. A concurrent approval therefore applies the change once.
    pub async fn approve(
        pool: &PgPool,
        id: DbId,
        reviewer_id: DbId,
        change: &UpdateUser,
    ) -> Result<Option<ChangeRequest>, sqlx::Error> {
        let mut tx = pool.begin().await?;
        let Some(request) = Self::resolve_inner(&mut tx, id, "APPROVED", reviewer_id, None).await?
        else {
            return Ok(None);
        };
        if UserRepo::update_inner(&mut tx, request.user_id, change).await?.is_none() {
            return Err(sqlx::Error::RowNotFound);
        }
        tx.commit().await?;
        Ok(Some(request))
    }

    async fn resolve_inner(
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        id: DbId,
        status: &str,
        reviewer_id: DbId,
        motivo: Option<&str>,
    ) -> Result<Option<ChangeRequest>, sqlx::Error> {
        let query = format!(
            "UPDATE change_requests
                SET status = $2, reviewed_by_id = $3, motivo = $4, reviewed_at = NOW()
             WHERE id = $1 AND status = 'PENDING'
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, ChangeRequest>(&query)
            .bind(id)
            .bind(status)
            .bind(reviewer_id)
            .bind(motivo)
            .fetch_optional(&mut **tx)
            .await
    }
}
