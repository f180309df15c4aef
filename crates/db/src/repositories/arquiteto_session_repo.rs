//! Repository for the `arquiteto_sessions` table.
//!
//! One row per login of an ARQUITETO. Only the most recent login keeps
//! `is_active = true`; older ones remain as read-only sessions until they
//! expire or log out.

use sqlx::PgPool;
use tna_core::types::{DbId, Timestamp};

use crate::models::arquiteto_session::ArquitetoSession;

const COLUMNS: &str = "id, user_id, session_id, is_active, expires_at, created_at, updated_at";

pub struct ArquitetoSessionRepo;

impl ArquitetoSessionRepo {
    /// Make `session_id` the only active, unexpired session of `user_id`.
    ///
    /// Both steps run in one transaction so two concurrent logins cannot both
    /// end up active.
    pub async fn activate(
        pool: &PgPool,
        user_id: DbId,
        session_id: &str,
        expires_at: Timestamp,
    ) -> Result<ArquitetoSession, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let demoted = sqlx::query(
            "UPDATE arquiteto_sessions SET is_active = false
             WHERE user_id = $1 AND session_id <> $2
               AND is_active AND expires_at > NOW()",
        )
        .bind(user_id)
        .bind(session_id)
        .execute(&mut *tx)
        .await?;

        let query = format!(
            "INSERT INTO arquiteto_sessions (user_id, session_id, is_active, expires_at)
             VALUES ($1, $2, true, $3)
             ON CONFLICT ON CONSTRAINT uq_arquiteto_sessions_session_id
             DO UPDATE SET is_active = true, expires_at = EXCLUDED.expires_at
             RETURNING {COLUMNS}"
        );
        let session = sqlx::query_as::<_, ArquitetoSession>(&query)
            .bind(user_id)
            .bind(session_id)
            .bind(expires_at)
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;

        if demoted.rows_affected() > 0 {
            tracing::info!(
                user_id,
                demoted = demoted.rows_affected(),
                "Older architect sessions switched to read-only",
            );
        }
        Ok(session)
    }

    /// Push back the expiry of a session that still holds write power.
    ///
    /// Demoted, expired and deleted sessions are left alone, so extending a
    /// stale token can never take write power back from the current login.
    pub async fn extend_active(
        pool: &PgPool,
        user_id: DbId,
        session_id: &str,
        expires_at: Timestamp,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE arquiteto_sessions SET expires_at = $3
             WHERE user_id = $1 AND session_id = $2
               AND is_active AND expires_at > NOW()",
        )
        .bind(user_id)
        .bind(session_id)
        .bind(expires_at)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn find_by_session_id(
        pool: &PgPool,
        session_id: &str,
    ) -> Result<Option<ArquitetoSession>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM arquiteto_sessions WHERE session_id = $1");
        sqlx::query_as::<_, ArquitetoSession>(&query)
            .bind(session_id)
            .fetch_optional(pool)
            .await
    }

    /// The write-capable, unexpired session of a user, if any.
    pub async fn find_active_for_user(
        pool: &PgPool,
        user_id: DbId,
    ) -> Result<Option<ArquitetoSession>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM arquiteto_sessions
             WHERE user_id = $1 AND is_active AND expires_at > NOW()
             ORDER BY created_at DESC
             LIMIT 1"
        );
        sqlx::query_as::<_, ArquitetoSession>(&query)
            .bind(user_id)
            .fetch_optional(pool)
            .await
    }

    pub async fn delete_by_session_id(pool: &PgPool, session_id: &str) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM arquiteto_sessions WHERE session_id = $1")
            .bind(session_id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Remove every expired session. Returns the number of rows deleted.
    pub async fn delete_expired(pool: &PgPool) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM arquiteto_sessions WHERE expires_at <= NOW()")
            .execute(pool)
            .await?;
        Ok(result.rows_affected())
    }
}
