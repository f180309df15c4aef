//! Single-writer sessions for ARQUITETO accounts.
//!
//! Each ARQUITETO login activates its own session id and demotes every other
//! live session of the same user. Only the active session may write; the
//! demoted ones keep read access until they expire.

use sqlx::PgPool;
use tna_core::types::{DbId, Timestamp};
use tna_db::models::arquiteto_session::ArquitetoSession;
use tna_db::repositories::ArquitetoSessionRepo;

/// Why a session may not write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionDenial {
    NotFound,
    Expired,
    ReadOnly,
}

impl SessionDenial {
    pub fn message(self) -> &'static str {
        match self {
            SessionDenial::NotFound => "Session not found, log in again",
            SessionDenial::Expired => "Session expired, log in again",
            SessionDenial::ReadOnly => {
                "This session is read-only because another login is active"
            }
        }
    }
}

/// Record an ARQUITETO login as the one write-capable session.
pub async fn register_login(
    pool: &PgPool,
    user_id: DbId,
    session_id: &str,
    expires_at: Timestamp,
) -> Result<ArquitetoSession, sqlx::Error> {
    let session = ArquitetoSessionRepo::activate(pool, user_id, session_id, expires_at).await?;
    tracing::info!(user_id, session_id, "Arquiteto session activated");
    Ok(session)
}

/// Extend the write-capable session on token refresh.
///
/// Returns `false` when the session is not the active one; it then stays as
/// it is (read-only, expired or gone).
pub async fn extend(
    pool: &PgPool,
    user_id: DbId,
    session_id: &str,
    expires_at: Timestamp,
) -> Result<bool, sqlx::Error> {
    let extended = ArquitetoSessionRepo::extend_active(pool, user_id, session_id, expires_at).await?;
    if !extended {
        tracing::debug!(user_id, session_id, "Token refreshed for a session without write power");
    }
    Ok(extended)
}

/// A session is read-only when it exists, has not expired and was demoted.
pub async fn is_read_only(pool: &PgPool, session_id: &str) -> Result<bool, sqlx::Error> {
    let now = chrono::Utc::now();
    Ok(ArquitetoSessionRepo::find_by_session_id(pool, session_id)
        .await?
        .is_some_and(|s| s.expires_at > now && !s.is_active))
}

/// Whether `session_id` holds write power for `user_id`.
///
/// An expired row is removed on the way out.
pub async fn can_write(
    pool: &PgPool,
    user_id: DbId,
    session_id: &str,
) -> Result<Result<(), SessionDenial>, sqlx::Error> {
    let Some(session) = ArquitetoSessionRepo::find_by_session_id(pool, session_id).await? else {
        return Ok(Err(SessionDenial::NotFound));
    };
    if session.user_id != user_id {
        return Ok(Err(SessionDenial::NotFound));
    }
    if session.expires_at <= chrono::Utc::now() {
        ArquitetoSessionRepo::delete_by_session_id(pool, session_id).await?;
        return Ok(Err(SessionDenial::Expired));
    }
    if !session.is_active {
        return Ok(Err(SessionDenial::ReadOnly));
    }
    Ok(Ok(()))
}

/// The session currently holding write power for `user_id`.
pub async fn get_active(
    pool: &PgPool,
    user_id: DbId,
) -> Result<Option<ArquitetoSession>, sqlx::Error> {
    ArquitetoSessionRepo::find_active_for_user(pool, user_id).await
}

/// Drop the session on logout.
pub async fn remove(pool: &PgPool, session_id: &str) -> Result<bool, sqlx::Error> {
    ArquitetoSessionRepo::delete_by_session_id(pool, session_id).await
}

pub async fn cleanup_expired(pool: &PgPool) -> Result<u64, sqlx::Error> {
    ArquitetoSessionRepo::delete_expired(pool).await
}
