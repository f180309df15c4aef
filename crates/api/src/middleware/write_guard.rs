//! Write guard for mutating endpoints.
//!
//! Checks run in order and the first failure wins:
//!
//! 1. role must allow writing (ARQUITETO only);
//! 2. in development, nothing else is checked;
//! 3. the architect session must be active and unexpired;
//! 4. with `REQUIRE_A1_CERTIFICATE`, a valid admin certificate must exist.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use tna_core::permissions::{can_write, Denial};
use tna_db::models::ensaio::Ensaio;
use tna_db::repositories::CertificateRepo;

use super::auth::AuthUser;
use crate::arquiteto_session;
use crate::error::{AppError, AppResult};
use crate::state::AppState;

/// An ARQUITETO whose session may change data.
pub struct RequireWriter(pub AuthUser);

impl FromRequestParts<AppState> for RequireWriter {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let user = AuthUser::from_request_parts(parts, state).await?;
        can_write(user.role)?;

        if !state.config.app_env.is_production() {
            return Ok(RequireWriter(user));
        }

        if let Err(denial) =
            arquiteto_session::can_write(&state.pool, user.user_id, &user.session_id).await?
        {
            tracing::warn!(
                user_id = user.user_id,
                reason = ?denial,
                "Write refused by session guard",
            );
            return Err(AppError::forbidden(denial.message()));
        }

        if state.config.require_a1_certificate
            && !CertificateRepo::has_valid_for_user(&state.pool, user.user_id).await?
        {
            return Err(AppError::forbidden(
                "A valid A1 certificate is required to change data",
            ));
        }

        Ok(RequireWriter(user))
    }
}

/// Reject writers that did not create the ensaio.
pub fn ensure_ensaio_owner(user: &AuthUser, ensaio: &Ensaio) -> AppResult<()> {
    if ensaio.created_by_id != user.user_id {
        return Err(Denial::NotOwner.into());
    }
    Ok(())
}
