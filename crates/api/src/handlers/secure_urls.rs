//! Short-lived links that hide resource ids behind an opaque token.
//!
//! A token is bound to the user who asked for it and to one resource. The
//! `/secure/...` endpoint still requires the same login, so a leaked link is
//! useless to anyone else and dies after five minutes anyway.

use axum::extract::{Path, State};
use axum::response::Redirect;
use axum::Json;
use serde::{Deserialize, Serialize};
use tna_core::session_tokens::{SecureResource, TokenRejection, TOKEN_TTL_SECS};
use tna_core::types::DbId;
use tna_db::repositories::EnsaioPhotoRepo;

use super::ensaios::load_visible;
use super::modelo::PHOTO_URL_TTL;
use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct SecureUrlRequest {
    pub resource_type: String,
    pub resource_id: DbId,
}

#[derive(Debug, Serialize)]
pub struct SecureUrlResponse {
    pub secure_url: String,
    pub expires_in: i64,
}

#[derive(Debug, Serialize)]
pub struct RevokeResponse {
    pub revoked: usize,
}

/// POST /api/v1/session/secure-url
pub async fn create_secure_url(
    State(state): State<AppState>,
    user: AuthUser,
    Json(input): Json<SecureUrlRequest>,
) -> AppResult<Json<SecureUrlResponse>> {
    let resource = parse_resource(&input.resource_type)?;
    ensure_readable(&state, &user, resource, input.resource_id).await?;

    let issued = state
        .secure_tokens
        .issue(user.user_id, resource, input.resource_id)
        .await;

    let secure_url = format!(
        "{}/secure/{}/{}/{}",
        state.config.public_base_url,
        issued.token,
        resource.as_str(),
        input.resource_id
    );
    tracing::debug!(user_id = user.user_id, resource = resource.as_str(), "Secure URL issued");
    Ok(Json(SecureUrlResponse {
        secure_url,
        expires_in: TOKEN_TTL_SECS,
    }))
}

/// POST /api/v1/session/revoke
pub async fn revoke_all(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<Json<RevokeResponse>> {
    let revoked = state.secure_tokens.revoke_all_for_user(user.user_id).await;
    tracing::info!(user_id = user.user_id, revoked, "Secure URLs revoked");
    Ok(Json(RevokeResponse { revoked }))
}

/// GET /secure/{token}/{resource_type}/{resource_id}
///
/// A gallery link lands on the subject's ensaio page; a photo link redirects
/// to a signed object URL.
pub async fn open_secure_url(
    State(state): State<AppState>,
    user: AuthUser,
    Path((token, resource_type, resource_id)): Path<(String, String, DbId)>,
) -> AppResult<Redirect> {
    let resource = parse_resource(&resource_type)?;

    state
        .secure_tokens
        .validate(&token, user.user_id, resource, resource_id)
        .await
        .map_err(|rejection| {
            tracing::warn!(user_id = user.user_id, ?rejection, "Secure URL rejected");
            match rejection {
                TokenRejection::Unknown | TokenRejection::Expired => {
                    AppError::unauthorized("Link expired or invalid")
                }
                TokenRejection::WrongUser | TokenRejection::WrongResource => {
                    AppError::forbidden("This link belongs to another session")
                }
            }
        })?;

    match resource {
        SecureResource::Gallery => Ok(Redirect::temporary(&format!(
            "/modelo/ensaios/{resource_id}"
        ))),
        SecureResource::Photo => {
            let key = ensure_readable(&state, &user, resource, resource_id)
                .await?
                .ok_or_else(|| AppError::not_found("EnsaioPhoto", resource_id))?;
            let url = state.storage.presign_get(&key, PHOTO_URL_TTL).await?;
            Ok(Redirect::temporary(&url))
        }
    }
}

fn parse_resource(raw: &str) -> AppResult<SecureResource> {
    SecureResource::parse(raw)
        .ok_or_else(|| AppError::BadRequest(format!("Unknown resource type '{raw}'")))
}

/// Apply the ensaio read policy. Returns the storage key for photos.
async fn ensure_readable(
    state: &AppState,
    user: &AuthUser,
    resource: SecureResource,
    id: DbId,
) -> AppResult<Option<String>> {
    match resource {
        SecureResource::Gallery => {
            load_visible(state, user, id).await?;
            Ok(None)
        }
        SecureResource::Photo => {
            let photo = EnsaioPhotoRepo::find_by_id(&state.pool, id)
                .await?
                .ok_or_else(|| AppError::not_found("EnsaioPhoto", id))?;
            load_visible(state, user, photo.ensaio_id).await?;
            Ok(Some(photo.storage_key))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_known_resources_parse() {
        assert_eq!(parse_resource("gallery").unwrap(), SecureResource::Gallery);
        assert_eq!(parse_resource("photo").unwrap(), SecureResource::Photo);
        assert!(parse_resource("video").is_err());
    }
}
