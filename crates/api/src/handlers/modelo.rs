//! Read-only ensaio views for the people photographed, and the signed photo
//! listing shared by every role.

use std::time::Duration;

use axum::extract::{Path, State};
use axum::response::Response;
use axum::Json;
use chrono::NaiveDate;
use serde::Serialize;
use tna_core::status::EnsaioStatus;
use tna_core::types::{DbId, Timestamp};
use tna_db::models::ensaio::Ensaio;
use tna_db::repositories::{EnsaioPhotoRepo, EnsaioRepo};

use super::ensaios::load_visible;
use super::{load_user, no_store};
use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::middleware::rbac::RequireSubject;
use crate::response::DataResponse;
use crate::state::AppState;

/// Lifetime of photo URLs handed to browsers.
pub const PHOTO_URL_TTL: Duration = Duration::from_secs(120);

/// An ensaio as its subject sees it. Internal fields such as the sync folder
/// and raw storage keys are left out.
#[derive(Debug, Serialize)]
pub struct ModeloEnsaio {
    pub id: DbId,
    pub title: String,
    pub slug: String,
    pub description: Option<String>,
    pub shoot_date: Option<NaiveDate>,
    pub status: String,
    pub cover_url: Option<String>,
    pub photo_count: i64,
    pub created_at: Timestamp,
}

/// One photo behind a short-lived URL.
#[derive(Debug, Serialize)]
pub struct SignedPhoto {
    pub id: DbId,
    pub url: String,
    pub sort_order: i32,
}

/// GET /api/v1/modelo/ensaios
pub async fn list_my_ensaios(
    RequireSubject(user): RequireSubject,
    State(state): State<AppState>,
) -> AppResult<Json<DataResponse<Vec<ModeloEnsaio>>>> {
    let me = load_user(&state.pool, user.user_id).await?;
    let Some(cpf) = me.cpf else {
        return Ok(Json(DataResponse { data: Vec::new() }));
    };

    let ensaios = EnsaioRepo::list_published_for_subject(&state.pool, &cpf).await?;
    let mut views = Vec::with_capacity(ensaios.len());
    for ensaio in ensaios {
        views.push(modelo_view(&state, ensaio).await?);
    }
    Ok(Json(DataResponse { data: views }))
}

/// GET /api/v1/modelo/ensaios/{id}
pub async fn get_my_ensaio(
    RequireSubject(user): RequireSubject,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<ModeloEnsaio>>> {
    let ensaio = load_visible(&state, &user, id).await?;
    if EnsaioStatus::parse(&ensaio.status) != Some(EnsaioStatus::Published) {
        return Err(AppError::not_found("Ensaio", id));
    }
    let view = modelo_view(&state, ensaio).await?;
    Ok(Json(DataResponse { data: view }))
}

/// GET /api/v1/ensaios/{id}/photos
///
/// Photos of any ensaio the caller may read, each behind a URL valid for
/// [`PHOTO_URL_TTL`]. Never cached.
pub async fn signed_photos(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<Response> {
    let ensaio = load_visible(&state, &user, id).await?;
    let photos = EnsaioPhotoRepo::list_for_ensaio(&state.pool, ensaio.id).await?;

    let mut signed = Vec::with_capacity(photos.len());
    for photo in photos {
        let url = state
            .storage
            .presign_get(&photo.storage_key, PHOTO_URL_TTL)
            .await?;
        signed.push(SignedPhoto {
            id: photo.id,
            url,
            sort_order: photo.sort_order,
        });
    }

    Ok(no_store(signed))
}

async fn modelo_view(state: &AppState, ensaio: Ensaio) -> AppResult<ModeloEnsaio> {
    let photo_count = EnsaioPhotoRepo::count_for_ensaio(&state.pool, ensaio.id).await?;
    let cover_url = match &ensaio.cover_image_key {
        Some(key) => Some(state.storage.presign_get(key, PHOTO_URL_TTL).await?),
        None => None,
    };
    Ok(ModeloEnsaio {
        id: ensaio.id,
        title: ensaio.title,
        slug: ensaio.slug,
        description: ensaio.description,
        shoot_date: ensaio.shoot_date,
        status: ensaio.status,
        cover_url,
        photo_count,
        created_at: ensaio.created_at,
    })
}
