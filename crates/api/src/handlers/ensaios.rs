//! Handlers for the architect's ensaio workspace (`/arquiteto/ensaios`).
//!
//! Reads are open to staff (an ARQUITETO only sees what it created). Every
//! mutation goes through [`RequireWriter`] plus an ownership check, except
//! creation, which ADMIN may also perform.

use std::sync::Arc;

use axum::extract::{Multipart, Path, Query, State};
use axum::http::StatusCode;
use axum::response::Response;
use axum::Json;
use chrono::{Duration, Utc};
use futures::stream::{self, StreamExt};
use serde::{Deserialize, Serialize};
use tna_core::audit::{actions, entities};
use tna_core::permissions::{can_view_ensaio, EnsaioAccess, Viewer};
use tna_core::roles::Role;
use tna_core::slug::slugify;
use tna_core::status::EnsaioStatus;
use tna_core::types::DbId;
use tna_core::validation::normalize_cpf;
use tna_db::models::ensaio::{CreateEnsaio, Ensaio, EnsaioPhoto, PhotoOrder, UpdateEnsaio};
use tna_db::repositories::{
    EnsaioPhotoRepo, EnsaioRepo, PhotoSlot, ProdutoRepo, ProjetoRepo, UserRepo,
};

use super::media::SignedUrl;
use super::modelo::PHOTO_URL_TTL;
use super::upload::UploadForm;
use super::{no_store, non_empty};
use crate::arquiteto_session::{self, SessionDenial};
use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::middleware::rbac::{RequireArquitetoOrAdmin, RequireStaff};
use crate::middleware::write_guard::{ensure_ensaio_owner, RequireWriter};
use crate::query::StatusFilter;
use crate::response::DataResponse;
use crate::state::AppState;

/// Photos allowed per ensaio.
pub const MAX_PHOTOS_PER_ENSAIO: i64 = 30;

/// Deleted ensaios become purgeable after this many days.
pub const PURGE_AFTER_DAYS: i64 = 7;

/// Object deletes in flight at once during a purge.
const PURGE_DELETE_CONCURRENCY: usize = 8;

/// Largest accepted consent term.
pub const MAX_TERM_BYTES: usize = 20 * 1024 * 1024;

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

/// Request body for `POST /arquiteto/ensaios`.
#[derive(Debug, Deserialize)]
pub struct CreateEnsaioRequest {
    pub title: Option<String>,
    pub slug: Option<String>,
    pub description: Option<String>,
    pub shoot_date: Option<chrono::NaiveDate>,
    pub status: Option<String>,
    pub subject_cpf: Option<String>,
    pub cover_image_key: Option<String>,
    pub term_pdf_key: Option<String>,
    pub sync_folder_url: Option<String>,
    #[serde(default)]
    pub projeto_ids: Vec<DbId>,
    #[serde(default)]
    pub produto_ids: Vec<DbId>,
    /// Storage keys of already uploaded photos, in display order.
    #[serde(default)]
    pub mini_gallery: Vec<String>,
}

/// Request body for `PATCH /arquiteto/ensaios/{id}`.
///
/// Link lists replace the current links when present.
#[derive(Debug, Deserialize)]
pub struct UpdateEnsaioRequest {
    pub title: Option<String>,
    pub slug: Option<String>,
    pub description: Option<String>,
    pub shoot_date: Option<chrono::NaiveDate>,
    pub status: Option<String>,
    pub cover_image_key: Option<String>,
    pub term_pdf_key: Option<String>,
    pub sync_folder_url: Option<String>,
    pub projeto_ids: Option<Vec<DbId>>,
    pub produto_ids: Option<Vec<DbId>>,
}

#[derive(Debug, Deserialize)]
pub struct AddPhotoRequest {
    pub storage_key: String,
    pub sort_order: Option<i32>,
}

#[derive(Debug, Deserialize)]
pub struct ReorderPhotosRequest {
    pub photo_orders: Vec<PhotoOrder>,
}

/// An ensaio with its photos and links.
#[derive(Debug, Serialize)]
pub struct EnsaioDetail {
    #[serde(flatten)]
    pub ensaio: Ensaio,
    pub photos: Vec<EnsaioPhoto>,
    pub projeto_ids: Vec<DbId>,
    pub produto_ids: Vec<DbId>,
}

#[derive(Debug, Serialize)]
pub struct TermUpload {
    pub term_pdf_key: String,
    pub size: usize,
}

#[derive(Debug, Serialize)]
pub struct SyncLink {
    pub sync_url: String,
}

#[derive(Debug, Default, Serialize)]
pub struct CleanupSummary {
    pub ensaios_removed: usize,
    pub objects_removed: usize,
    pub object_errors: usize,
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// POST /api/v1/arquiteto/ensaios
pub async fn create_ensaio(
    RequireArquitetoOrAdmin(user): RequireArquitetoOrAdmin,
    State(state): State<AppState>,
    Json(input): Json<CreateEnsaioRequest>,
) -> AppResult<(StatusCode, Json<DataResponse<EnsaioDetail>>)> {
    if user.role == Role::Arquiteto
        && arquiteto_session::is_read_only(&state.pool, &user.session_id).await?
    {
        return Err(AppError::forbidden(SessionDenial::ReadOnly.message()));
    }

    let title = non_empty(input.title).ok_or_else(|| AppError::validation("Title is required"))?;
    let slug = non_empty(input.slug)
        .map(|s| slugify(&s))
        .filter(|s| !s.is_empty())
        .ok_or_else(|| AppError::validation("Slug is required"))?;
    let subject_cpf = non_empty(input.subject_cpf)
        .ok_or_else(|| AppError::validation("Subject CPF is required"))?;
    let subject_cpf =
        normalize_cpf(&subject_cpf).ok_or_else(|| AppError::validation("CPF must have 11 digits"))?;

    let subject = UserRepo::find_by_cpf(&state.pool, &subject_cpf)
        .await?
        .ok_or_else(|| AppError::NotFound("No user with this CPF".into()))?;
    if !Role::parse(&subject.role).is_some_and(Role::is_subject) {
        return Err(AppError::forbidden(
            "Ensaios can only be created for MODELO or CLIENTE users",
        ));
    }

    if EnsaioRepo::slug_exists(&state.pool, &slug, None).await? {
        return Err(AppError::BadRequest(format!("Slug '{slug}' is already in use")));
    }

    let status = input
        .status
        .as_deref()
        .map(parse_editable_status)
        .transpose()?
        .unwrap_or(EnsaioStatus::Published);

    let projeto_ids = checked_projeto_ids(&state, input.projeto_ids).await?;
    let produto_ids = checked_produto_ids(&state, input.produto_ids).await?;
    let gallery: Vec<String> = input
        .mini_gallery
        .into_iter()
        .map(|k| k.trim().to_string())
        .filter(|k| !k.is_empty())
        .collect();
    if gallery.len() as i64 > MAX_PHOTOS_PER_ENSAIO {
        return Err(AppError::validation(format!(
            "An ensaio holds at most {MAX_PHOTOS_PER_ENSAIO} photos"
        )));
    }

    // Row, links and gallery are committed together.
    let (ensaio, photo_count) = EnsaioRepo::create_with_links(
        &state.pool,
        &CreateEnsaio {
            title,
            slug,
            description: non_empty(input.description),
            shoot_date: input.shoot_date,
            status: Some(status.as_str().to_string()),
            created_by_id: user.user_id,
            subject_cpf,
            cover_image_key: non_empty(input.cover_image_key),
            term_pdf_key: non_empty(input.term_pdf_key),
            sync_folder_url: non_empty(input.sync_folder_url),
        },
        &projeto_ids,
        &produto_ids,
        &gallery,
    )
    .await?;

    state
        .audit
        .log_action(
            Some(user.user_id),
            actions::CREATE,
            entities::ENSAIO,
            ensaio.id,
            Some(serde_json::json!({
                "slug": ensaio.slug,
                "status": ensaio.status,
                "photos": photo_count,
            })),
        )
        .await?;

    tracing::info!(ensaio_id = ensaio.id, created_by = user.user_id, "Ensaio created");
    let detail = load_detail(&state, ensaio).await?;
    Ok((StatusCode::CREATED, Json(DataResponse { data: detail })))
}

/// GET /api/v1/arquiteto/ensaios
///
/// An ARQUITETO gets its own ensaios; ADMIN and SUPERADMIN get all.
pub async fn list_ensaios(
    RequireStaff(user): RequireStaff,
    State(state): State<AppState>,
    Query(filter): Query<StatusFilter>,
) -> AppResult<Json<DataResponse<Vec<Ensaio>>>> {
    let status = filter
        .status
        .as_deref()
        .map(parse_editable_status)
        .transpose()?;
    let created_by = (user.role == Role::Arquiteto).then_some(user.user_id);
    let ensaios =
        EnsaioRepo::list(&state.pool, created_by, status.map(EnsaioStatus::as_str)).await?;
    Ok(Json(DataResponse { data: ensaios }))
}

/// GET /api/v1/arquiteto/ensaios/{id}
pub async fn get_ensaio(
    RequireStaff(user): RequireStaff,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<EnsaioDetail>>> {
    let ensaio = load_visible(&state, &user, id).await?;
    let detail = load_detail(&state, ensaio).await?;
    Ok(Json(DataResponse { data: detail }))
}

/// PATCH /api/v1/arquiteto/ensaios/{id}
pub async fn update_ensaio(
    RequireWriter(writer): RequireWriter,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateEnsaioRequest>,
) -> AppResult<Json<DataResponse<EnsaioDetail>>> {
    let current = load_owned(&state, &writer, id).await?;

    let slug = match non_empty(input.slug) {
        Some(raw) => {
            let slug = slugify(&raw);
            if slug.is_empty() {
                return Err(AppError::validation("Slug is required"));
            }
            if slug != current.slug && EnsaioRepo::slug_exists(&state.pool, &slug, Some(id)).await? {
                return Err(AppError::BadRequest(format!("Slug '{slug}' is already in use")));
            }
            Some(slug)
        }
        None => None,
    };
    let status = input
        .status
        .as_deref()
        .map(parse_editable_status)
        .transpose()?;

    let projeto_ids = match input.projeto_ids {
        Some(ids) => Some(checked_projeto_ids(&state, ids).await?),
        None => None,
    };
    let produto_ids = match input.produto_ids {
        Some(ids) => Some(checked_produto_ids(&state, ids).await?),
        None => None,
    };

    let update = UpdateEnsaio {
        title: non_empty(input.title),
        slug,
        description: input.description,
        shoot_date: input.shoot_date,
        status: status.map(|s| s.as_str().to_string()),
        cover_image_key: input.cover_image_key,
        term_pdf_key: input.term_pdf_key,
        sync_folder_url: input.sync_folder_url,
    };
    let ensaio = EnsaioRepo::update_with_links(
        &state.pool,
        id,
        &update,
        projeto_ids.as_deref(),
        produto_ids.as_deref(),
    )
    .await?
    .ok_or_else(|| AppError::not_found("Ensaio", id))?;

    state
        .audit
        .log_action(
            Some(writer.user_id),
            actions::UPDATE,
            entities::ENSAIO,
            id,
            Some(serde_json::json!({ "status": ensaio.status })),
        )
        .await?;

    let detail = load_detail(&state, ensaio).await?;
    Ok(Json(DataResponse { data: detail }))
}

/// DELETE /api/v1/arquiteto/ensaios/{id}
///
/// Logical delete. The row and its objects stay until the cleanup runs.
pub async fn delete_ensaio(
    RequireWriter(writer): RequireWriter,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    let ensaio = load_owned(&state, &writer, id).await?;
    if !EnsaioRepo::soft_delete(&state.pool, id).await? {
        return Err(AppError::not_found("Ensaio", id));
    }

    state
        .audit
        .log_action(
            Some(writer.user_id),
            actions::DELETE_LOGICAL,
            entities::ENSAIO,
            id,
            Some(serde_json::json!({ "slug": ensaio.slug, "title": ensaio.title })),
        )
        .await?;

    tracing::info!(ensaio_id = id, user_id = writer.user_id, "Ensaio deleted");
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/v1/arquiteto/ensaios/{id}/restore
///
/// Undo a logical delete. The ensaio comes back as DRAFT.
pub async fn restore_ensaio(
    RequireWriter(writer): RequireWriter,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<Ensaio>>> {
    let ensaio = EnsaioRepo::find_by_id_include_deleted(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::not_found("Ensaio", id))?;
    ensure_ensaio_owner(&writer, &ensaio)?;
    if ensaio.deleted_at.is_none() {
        return Err(AppError::BadRequest("Ensaio is not deleted".into()));
    }

    EnsaioRepo::restore(&state.pool, id).await?;
    let restored = EnsaioRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::not_found("Ensaio", id))?;

    state
        .audit
        .log_action(Some(writer.user_id), actions::RESTORE, entities::ENSAIO, id, None)
        .await?;

    Ok(Json(DataResponse { data: restored }))
}

/// POST /api/v1/arquiteto/ensaios/limpar-deletados
///
/// Permanently remove the caller's ensaios deleted at least
/// [`PURGE_AFTER_DAYS`] days ago, with their stored objects. A failed object
/// delete is logged and does not stop the run.
pub async fn purge_deleted(
    RequireWriter(writer): RequireWriter,
    State(state): State<AppState>,
) -> AppResult<Json<DataResponse<CleanupSummary>>> {
    let cutoff = Utc::now() - Duration::days(PURGE_AFTER_DAYS);
    let purgeable = EnsaioRepo::list_purgeable(&state.pool, writer.user_id, cutoff).await?;

    let mut summary = CleanupSummary::default();
    for ensaio in purgeable {
        let mut keys = EnsaioPhotoRepo::list_all_keys(&state.pool, ensaio.id).await?;
        keys.extend(ensaio.cover_image_key.iter().cloned());
        keys.extend(ensaio.term_pdf_key.iter().cloned());

        let results: Vec<_> = stream::iter(keys)
            .map(|key| {
                let storage = Arc::clone(&state.storage);
                async move {
                    let result = storage.delete(&key).await;
                    (key, result)
                }
            })
            .buffer_unordered(PURGE_DELETE_CONCURRENCY)
            .collect()
            .await;

        for (key, result) in results {
            match result {
                Ok(()) => summary.objects_removed += 1,
                Err(e) => {
                    summary.object_errors += 1;
                    tracing::warn!(ensaio_id = ensaio.id, key = %key, error = %e, "Object delete failed");
                }
            }
        }

        if EnsaioRepo::hard_delete(&state.pool, ensaio.id).await? {
            summary.ensaios_removed += 1;
        }
    }

    state
        .audit
        .log_action(
            Some(writer.user_id),
            actions::CLEANUP_DELETED_ENSAIOS,
            entities::ENSAIO,
            "bulk",
            Some(serde_json::json!({
                "ensaios_removed": summary.ensaios_removed,
                "objects_removed": summary.objects_removed,
                "object_errors": summary.object_errors,
            })),
        )
        .await?;

    tracing::info!(
        user_id = writer.user_id,
        ensaios = summary.ensaios_removed,
        objects = summary.objects_removed,
        errors = summary.object_errors,
        "Deleted ensaios purged",
    );
    Ok(Json(DataResponse { data: summary }))
}

// ---------------------------------------------------------------------------
// Photos
// ---------------------------------------------------------------------------

/// POST /api/v1/arquiteto/ensaios/{id}/photos
pub async fn add_photo(
    RequireWriter(writer): RequireWriter,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<AddPhotoRequest>,
) -> AppResult<(StatusCode, Json<DataResponse<EnsaioPhoto>>)> {
    load_owned(&state, &writer, id).await?;

    let key = input.storage_key.trim();
    if key.is_empty() {
        return Err(AppError::validation("storage_key is required"));
    }

    let slot = EnsaioPhotoRepo::reserve_slot(
        &state.pool,
        id,
        MAX_PHOTOS_PER_ENSAIO,
        input.sort_order,
        |_| key.to_string(),
    )
    .await?;
    let PhotoSlot::Reserved(photo) = slot else {
        return Err(AppError::validation(format!(
            "An ensaio holds at most {MAX_PHOTOS_PER_ENSAIO} photos"
        )));
    };

    state
        .audit
        .log_action(
            Some(writer.user_id),
            actions::CREATE,
            entities::ENSAIO_PHOTO,
            photo.id,
            Some(serde_json::json!({ "ensaio_id": id })),
        )
        .await?;

    Ok((StatusCode::CREATED, Json(DataResponse { data: photo })))
}

/// PUT /api/v1/arquiteto/ensaios/{id}/photos
pub async fn reorder_photos(
    RequireWriter(writer): RequireWriter,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<ReorderPhotosRequest>,
) -> AppResult<Json<DataResponse<Vec<EnsaioPhoto>>>> {
    load_owned(&state, &writer, id).await?;
    let updated = EnsaioPhotoRepo::reorder(&state.pool, id, &input.photo_orders).await?;
    tracing::debug!(ensaio_id = id, updated, "Photos reordered");
    let photos = EnsaioPhotoRepo::list_for_ensaio(&state.pool, id).await?;
    Ok(Json(DataResponse { data: photos }))
}

/// DELETE /api/v1/arquiteto/ensaios/{id}/photos/{photo_id}
pub async fn delete_photo(
    RequireWriter(writer): RequireWriter,
    State(state): State<AppState>,
    Path((id, photo_id)): Path<(DbId, DbId)>,
) -> AppResult<StatusCode> {
    let photo = EnsaioPhotoRepo::find_by_id(&state.pool, photo_id)
        .await?
        .ok_or_else(|| AppError::not_found("EnsaioPhoto", photo_id))?;
    if photo.ensaio_id != id {
        return Err(AppError::BadRequest(
            "Photo does not belong to this ensaio".into(),
        ));
    }
    load_owned(&state, &writer, id).await?;

    EnsaioPhotoRepo::soft_delete(&state.pool, photo_id).await?;

    state
        .audit
        .log_action(
            Some(writer.user_id),
            actions::DELETE_LOGICAL,
            entities::ENSAIO_PHOTO,
            photo_id,
            Some(serde_json::json!({ "ensaio_id": id })),
        )
        .await?;

    Ok(StatusCode::NO_CONTENT)
}

// ---------------------------------------------------------------------------
// Term and sync folder
// ---------------------------------------------------------------------------

/// POST /api/v1/arquiteto/ensaios/{id}/term
///
/// Multipart form with the signed consent term as a PDF `file` part. A term
/// uploaded earlier is replaced and its object removed.
pub async fn upload_term(
    RequireWriter(writer): RequireWriter,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    mut multipart: Multipart,
) -> AppResult<(StatusCode, Json<DataResponse<TermUpload>>)> {
    let ensaio = load_owned(&state, &writer, id).await?;
    let file = UploadForm::read(&mut multipart)
        .await?
        .into_file(MAX_TERM_BYTES)?;
    if !file.is_pdf() {
        return Err(AppError::validation("The term must be a PDF"));
    }

    let key = format!(
        "cpf-{}/session-{id}/termo-{}.pdf",
        ensaio.subject_cpf,
        Utc::now().timestamp_millis()
    );
    let size = file.data.len();
    state.storage.put(&key, file.data, "application/pdf").await?;

    if !EnsaioRepo::set_term_pdf_key(&state.pool, id, &key).await? {
        if let Err(e) = state.storage.delete(&key).await {
            tracing::warn!(ensaio_id = id, key = %key, error = %e, "Orphaned term object");
        }
        return Err(AppError::not_found("Ensaio", id));
    }
    if let Some(old) = ensaio.term_pdf_key.filter(|old| *old != key) {
        if let Err(e) = state.storage.delete(&old).await {
            tracing::warn!(ensaio_id = id, key = %old, error = %e, "Old term delete failed");
        }
    }

    state
        .audit
        .log_action(
            Some(writer.user_id),
            actions::UPLOAD,
            entities::ENSAIO,
            id,
            Some(serde_json::json!({ "term_pdf_key": key, "size": size })),
        )
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(DataResponse {
            data: TermUpload {
                term_pdf_key: key,
                size,
            },
        }),
    ))
}

/// GET /api/v1/ensaios/{id}/term
///
/// Short-lived link to the consent term, under the ensaio read policy.
pub async fn term_url(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<Response> {
    let ensaio = load_visible(&state, &user, id).await?;
    let key = ensaio
        .term_pdf_key
        .ok_or_else(|| AppError::NotFound("Ensaio has no term".into()))?;
    let url = state.storage.presign_get(&key, PHOTO_URL_TTL).await?;
    Ok(no_store(SignedUrl {
        url,
        expires_in: PHOTO_URL_TTL.as_secs(),
    }))
}

/// GET /api/v1/ensaios/{id}/sync-link
///
/// Staff only; an ARQUITETO only for its own ensaios.
pub async fn sync_link(
    RequireStaff(user): RequireStaff,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Response> {
    let ensaio = load_visible(&state, &user, id).await?;
    let sync_url = ensaio
        .sync_folder_url
        .filter(|url| !url.trim().is_empty())
        .ok_or_else(|| AppError::NotFound("Ensaio has no sync folder".into()))?;
    Ok(no_store(SyncLink { sync_url }))
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Clients may set DRAFT or PUBLISHED; DELETED only comes from a delete.
fn parse_editable_status(raw: &str) -> AppResult<EnsaioStatus> {
    EnsaioStatus::parse(raw)
        .filter(|s| s.is_editable())
        .ok_or_else(|| AppError::validation("Status must be DRAFT or PUBLISHED"))
}

/// Live ensaio the caller may see under the read policy, else 404.
pub(crate) async fn load_visible(state: &AppState, user: &AuthUser, id: DbId) -> AppResult<Ensaio> {
    let ensaio = EnsaioRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::not_found("Ensaio", id))?;

    let viewer_cpf = if user.role.is_subject() {
        UserRepo::find_by_id(&state.pool, user.user_id)
            .await?
            .and_then(|u| u.cpf)
    } else {
        None
    };

    let status = EnsaioStatus::parse(&ensaio.status).unwrap_or(EnsaioStatus::Deleted);
    let visible = can_view_ensaio(
        Viewer {
            user_id: user.user_id,
            role: user.role,
            cpf: viewer_cpf.as_deref(),
        },
        EnsaioAccess {
            created_by_id: ensaio.created_by_id,
            subject_cpf: &ensaio.subject_cpf,
            status,
            deleted: ensaio.deleted_at.is_some(),
        },
    );
    if !visible {
        return Err(AppError::not_found("Ensaio", id));
    }
    Ok(ensaio)
}

/// Live ensaio created by the writer.
async fn load_owned(state: &AppState, writer: &AuthUser, id: DbId) -> AppResult<Ensaio> {
    let ensaio = EnsaioRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::not_found("Ensaio", id))?;
    ensure_ensaio_owner(writer, &ensaio)?;
    Ok(ensaio)
}

async fn load_detail(state: &AppState, ensaio: Ensaio) -> AppResult<EnsaioDetail> {
    let photos = EnsaioPhotoRepo::list_for_ensaio(&state.pool, ensaio.id).await?;
    let projeto_ids = EnsaioRepo::list_projeto_ids(&state.pool, ensaio.id).await?;
    let produto_ids = EnsaioRepo::list_produto_ids(&state.pool, ensaio.id).await?;
    Ok(EnsaioDetail {
        ensaio,
        photos,
        projeto_ids,
        produto_ids,
    })
}

fn dedup(mut ids: Vec<DbId>) -> Vec<DbId> {
    ids.sort_unstable();
    ids.dedup();
    ids
}

async fn checked_projeto_ids(state: &AppState, ids: Vec<DbId>) -> AppResult<Vec<DbId>> {
    let ids = dedup(ids);
    if ids.is_empty() {
        return Ok(ids);
    }
    let found = ProjetoRepo::count_existing(&state.pool, &ids).await?;
    if found != ids.len() as i64 {
        return Err(AppError::validation("Unknown projeto id"));
    }
    Ok(ids)
}

async fn checked_produto_ids(state: &AppState, ids: Vec<DbId>) -> AppResult<Vec<DbId>> {
    let ids = dedup(ids);
    if ids.is_empty() {
        return Ok(ids);
    }
    let found = ProdutoRepo::count_existing(&state.pool, &ids).await?;
    if found != ids.len() as i64 {
        return Err(AppError::validation("Unknown produto id"));
    }
    Ok(ids)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deleted_is_not_client_settable() {
        assert_eq!(parse_editable_status("DRAFT").unwrap(), EnsaioStatus::Draft);
        assert_eq!(parse_editable_status("PUBLISHED").unwrap(), EnsaioStatus::Published);
        assert!(parse_editable_status("DELETED").is_err());
        assert!(parse_editable_status("draft").is_err());
    }

    #[test]
    fn link_ids_are_deduplicated() {
        assert_eq!(dedup(vec![3, 1, 3, 2, 1]), vec![1, 2, 3]);
    }
}
