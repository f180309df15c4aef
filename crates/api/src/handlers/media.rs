//! Handlers for photo uploads, signed media URLs (`/media`), and client
//! media error reports.

use std::time::Duration;

use axum::extract::{Multipart, Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::Json;
use serde::{Deserialize, Serialize};
use tna_core::audit::{actions, entities};
use tna_core::image_naming::{extension_for_mime, fallback_key, ImageKey};
use tna_core::types::DbId;
use tna_db::models::ensaio::EnsaioPhoto;
use tna_db::repositories::{EnsaioPhotoRepo, EnsaioRepo, PhotoSlot};

use super::client_ip;
use super::ensaios::{load_visible, MAX_PHOTOS_PER_ENSAIO};
use super::upload::{UploadForm, UploadedFile};
use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::middleware::write_guard::{ensure_ensaio_owner, RequireWriter};
use crate::response::DataResponse;
use crate::state::AppState;

/// Largest accepted upload.
pub const MAX_UPLOAD_BYTES: usize = 40 * 1024 * 1024;

/// Largest accepted client error report.
pub const CLIENT_ERROR_BODY_LIMIT: usize = 16 * 1024;
const CLIENT_ERROR_TEXT_MAX: usize = 500;

const SIGN_TTL_DEFAULT_SECS: u64 = 120;
const SIGN_TTL_MIN_SECS: u64 = 60;
const SIGN_TTL_MAX_SECS: u64 = 600;

#[derive(Debug, Deserialize)]
pub struct SignParams {
    pub photo_id: DbId,
    pub expires_in: Option<u64>,
}

/// A media failure seen by a browser, e.g. a photo that did not load.
#[derive(Debug, Deserialize)]
pub struct ClientErrorReport {
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub photo_id: Option<DbId>,
    pub error: Option<String>,
    pub status: Option<u16>,
}

#[derive(Debug, Serialize)]
pub struct Acknowledged {
    pub success: bool,
}

#[derive(Debug, Serialize)]
pub struct SignedUrl {
    pub url: String,
    pub expires_in: u64,
}

/// POST /api/v1/media/upload
///
/// Multipart form with a `file` part and the target `ensaio_id`. The object is
/// stored under `cpf-{subject}/session-{ensaio}/photo-NNN.ext` and appended to
/// the ensaio's photos.
pub async fn upload(
    RequireWriter(writer): RequireWriter,
    State(state): State<AppState>,
    headers: HeaderMap,
    mut multipart: Multipart,
) -> AppResult<(StatusCode, Json<DataResponse<EnsaioPhoto>>)> {
    let ip = client_ip(&headers);
    state
        .upload_limiter
        .check(&format!("{}:{ip}", writer.user_id))
        .await?;

    let form = UploadForm::read(&mut multipart).await?;
    let ensaio_id = form.id("ensaio_id")?;
    let UploadedFile { data, content_type } = form.into_file(MAX_UPLOAD_BYTES)?;
    let extension = extension_for_mime(&content_type).ok_or_else(|| {
        AppError::validation("Only JPEG, PNG, WebP and GIF images are accepted")
    })?;

    let ensaio = EnsaioRepo::find_by_id(&state.pool, ensaio_id)
        .await?
        .ok_or_else(|| AppError::not_found("Ensaio", ensaio_id))?;
    ensure_ensaio_owner(&writer, &ensaio)?;

    // The row is claimed first so two concurrent uploads never share a key.
    let session = ensaio_id.to_string();
    let slot = EnsaioPhotoRepo::reserve_slot(
        &state.pool,
        ensaio_id,
        MAX_PHOTOS_PER_ENSAIO,
        None,
        |sequence| match ImageKey::new(&ensaio.subject_cpf, &session, sequence, extension) {
            Ok(key) => key.to_key(),
            Err(_) => fallback_key(&session, extension),
        },
    )
    .await?;
    let photo = match slot {
        PhotoSlot::Reserved(photo) => photo,
        PhotoSlot::Full => {
            return Err(AppError::validation(format!(
                "An ensaio holds at most {MAX_PHOTOS_PER_ENSAIO} photos"
            )));
        }
    };

    let size = data.len();
    if let Err(e) = state.storage.put(&photo.storage_key, data, &content_type).await {
        EnsaioPhotoRepo::hard_delete(&state.pool, photo.id).await?;
        return Err(e.into());
    }

    state
        .audit
        .log_action(
            Some(writer.user_id),
            actions::UPLOAD,
            entities::ENSAIO_PHOTO,
            photo.id,
            Some(serde_json::json!({
                "ensaio_id": ensaio_id,
                "size": size,
                "content_type": content_type,
            })),
        )
        .await?;

    tracing::info!(
        photo_id = photo.id,
        ensaio_id,
        size,
        backend = state.storage.backend_name(),
        "Photo uploaded",
    );
    Ok((StatusCode::CREATED, Json(DataResponse { data: photo })))
}

/// GET /api/v1/media/sign?photo_id=&expires_in=
pub async fn sign(
    State(state): State<AppState>,
    user: AuthUser,
    Query(params): Query<SignParams>,
) -> AppResult<Json<SignedUrl>> {
    let photo = EnsaioPhotoRepo::find_by_id(&state.pool, params.photo_id)
        .await?
        .ok_or_else(|| AppError::not_found("EnsaioPhoto", params.photo_id))?;
    load_visible(&state, &user, photo.ensaio_id).await?;

    let expires_in = clamp_ttl(params.expires_in);
    let url = state
        .storage
        .presign_get(&photo.storage_key, Duration::from_secs(expires_in))
        .await?;
    Ok(Json(SignedUrl { url, expires_in }))
}

/// POST /api/v1/log-error
///
/// Records a client-side media failure in the server log. Public, so every
/// text field is truncated before it is logged.
pub async fn log_client_error(
    headers: HeaderMap,
    Json(report): Json<ClientErrorReport>,
) -> Json<Acknowledged> {
    tracing::error!(
        kind = %clip(report.kind.as_deref().unwrap_or("unknown")),
        photo_id = report.photo_id,
        status = report.status,
        error = %clip(report.error.as_deref().unwrap_or("")),
        ip = %client_ip(&headers),
        "Client media error",
    );
    Json(Acknowledged { success: true })
}

fn clip(text: &str) -> String {
    text.chars().take(CLIENT_ERROR_TEXT_MAX).collect()
}

fn clamp_ttl(requested: Option<u64>) -> u64 {
    requested
        .unwrap_or(SIGN_TTL_DEFAULT_SECS)
        .clamp(SIGN_TTL_MIN_SECS, SIGN_TTL_MAX_SECS)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn client_error_text_is_clipped() {
        assert_eq!(clip("short"), "short");
        assert_eq!(clip(&"é".repeat(600)).chars().count(), CLIENT_ERROR_TEXT_MAX);
    }

    #[test]
    fn sign_ttl_is_clamped() {
        assert_eq!(clamp_ttl(None), 120);
        assert_eq!(clamp_ttl(Some(5)), 60);
        assert_eq!(clamp_ttl(Some(300)), 300);
        assert_eq!(clamp_ttl(Some(86_400)), 600);
    }
}
