//! Handlers for the product catalog (`/produtos`).
//!
//! Prices are stored in euros. Every response also carries the BRL value and
//! a display label computed with the current exchange rate.

use axum::extract::{Multipart, Path, Query, State};
use axum::http::StatusCode;
use axum::response::Response;
use axum::Json;
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use tna_core::audit::{actions, entities};
use tna_core::currency::{convert_eur_to_brl, format_brl, format_eur};
use tna_core::slug::{slug_candidates, slugify};
use tna_core::types::DbId;
use tna_db::models::produto::{
    CreateProduto, Produto, ProdutoPhoto, ProdutoWithCounts, UpdateProduto,
};
use tna_db::repositories::ProdutoRepo;

use super::media::SignedUrl;
use super::modelo::PHOTO_URL_TTL;
use super::upload::{UploadForm, STILL_IMAGE_TYPES};
use super::{no_store, non_empty};
use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::middleware::write_guard::RequireWriter;
use crate::response::DataResponse;
use crate::state::AppState;

/// Gallery photos allowed per produto.
pub const MAX_PRODUTO_PHOTOS: i64 = 3;

/// Largest accepted produto photo.
pub const MAX_PRODUTO_PHOTO_BYTES: usize = 40 * 1024 * 1024;

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct ProdutoListParams {
    pub categoria: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CreateProdutoRequest {
    pub nome: Option<String>,
    pub short_description: Option<String>,
    pub full_description: Option<String>,
    pub preco_euro: Option<f64>,
    pub categoria: Option<String>,
    pub cover_image_key: Option<String>,
    pub display_order: Option<i32>,
}

#[derive(Debug, Deserialize)]
pub struct AddProdutoPhotoRequest {
    pub storage_key: String,
}

/// Converted prices appended to any produto payload.
#[derive(Debug, Serialize)]
pub struct Priced<T: Serialize> {
    #[serde(flatten)]
    pub item: T,
    pub preco_brl: Option<f64>,
    /// `R$ 1.234,56`, or `Cortesia` when there is no price.
    pub preco_label: String,
    pub preco_eur_label: String,
}

#[derive(Debug, Serialize)]
pub struct ProdutoDetail {
    #[serde(flatten)]
    pub produto: Produto,
    pub photos: Vec<ProdutoPhoto>,
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// GET /api/v1/produtos
pub async fn list_produtos(
    State(state): State<AppState>,
    _user: AuthUser,
    Query(params): Query<ProdutoListParams>,
) -> AppResult<Json<DataResponse<Vec<Priced<ProdutoWithCounts>>>>> {
    let categoria = non_empty(params.categoria);
    let produtos = ProdutoRepo::list_active(&state.pool, categoria.as_deref()).await?;
    let rate = state.fx.current_rate().await.rate;
    let data = produtos
        .into_iter()
        .map(|p| {
            let eur = p.produto.preco_euro;
            priced(p, eur, rate)
        })
        .collect();
    Ok(Json(DataResponse { data }))
}

/// POST /api/v1/produtos
pub async fn create_produto(
    RequireWriter(writer): RequireWriter,
    State(state): State<AppState>,
    Json(input): Json<CreateProdutoRequest>,
) -> AppResult<(StatusCode, Json<DataResponse<Priced<Produto>>>)> {
    let nome = non_empty(input.nome).ok_or_else(|| AppError::validation("Nome is required"))?;
    check_price(input.preco_euro)?;
    let slug = unique_slug(&state.pool, &nome, None).await?;

    let produto = ProdutoRepo::create(
        &state.pool,
        &CreateProduto {
            slug,
            nome,
            short_description: non_empty(input.short_description),
            full_description: non_empty(input.full_description),
            preco_euro: input.preco_euro,
            categoria: non_empty(input.categoria),
            cover_image_key: non_empty(input.cover_image_key),
            display_order: input.display_order,
        },
    )
    .await?;

    state
        .audit
        .log_action(
            Some(writer.user_id),
            actions::CREATE,
            entities::PRODUTO,
            produto.id,
            Some(serde_json::json!({ "slug": produto.slug })),
        )
        .await?;

    let rate = state.fx.current_rate().await.rate;
    let eur = produto.preco_euro;
    Ok((
        StatusCode::CREATED,
        Json(DataResponse {
            data: priced(produto, eur, rate),
        }),
    ))
}

/// GET /api/v1/produtos/{id}
pub async fn get_produto(
    State(state): State<AppState>,
    _user: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<Priced<ProdutoDetail>>>> {
    let produto = load_produto(&state.pool, id).await?;
    let photos = ProdutoRepo::list_photos(&state.pool, id).await?;
    let rate = state.fx.current_rate().await.rate;
    let eur = produto.preco_euro;
    Ok(Json(DataResponse {
        data: priced(ProdutoDetail { produto, photos }, eur, rate),
    }))
}

/// PATCH /api/v1/produtos/{id}
///
/// A new `nome` regenerates the slug.
pub async fn update_produto(
    RequireWriter(writer): RequireWriter,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(mut input): Json<UpdateProduto>,
) -> AppResult<Json<DataResponse<Priced<Produto>>>> {
    let current = load_produto(&state.pool, id).await?;
    check_price(input.preco_euro)?;

    input.nome = non_empty(input.nome.take());
    input.slug = match &input.nome {
        Some(nome) if *nome != current.nome => Some(unique_slug(&state.pool, nome, Some(id)).await?),
        _ => None,
    };

    let produto = ProdutoRepo::update(&state.pool, id, &input)
        .await?
        .ok_or_else(|| AppError::not_found("Produto", id))?;

    state
        .audit
        .log_action(Some(writer.user_id), actions::UPDATE, entities::PRODUTO, id, None)
        .await?;

    let rate = state.fx.current_rate().await.rate;
    let eur = produto.preco_euro;
    Ok(Json(DataResponse {
        data: priced(produto, eur, rate),
    }))
}

/// DELETE /api/v1/produtos/{id}
pub async fn delete_produto(
    RequireWriter(writer): RequireWriter,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    if !ProdutoRepo::soft_delete(&state.pool, id).await? {
        return Err(AppError::not_found("Produto", id));
    }

    state
        .audit
        .log_action(Some(writer.user_id), actions::DELETE_LOGICAL, entities::PRODUTO, id, None)
        .await?;

    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/v1/produtos/{id}/photos
pub async fn add_photo(
    RequireWriter(writer): RequireWriter,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<AddProdutoPhotoRequest>,
) -> AppResult<(StatusCode, Json<DataResponse<ProdutoPhoto>>)> {
    load_produto(&state.pool, id).await?;
    let key = input.storage_key.trim();
    if key.is_empty() {
        return Err(AppError::validation("storage_key is required"));
    }
    let photo = ProdutoRepo::add_photo_capped(&state.pool, id, key, MAX_PRODUTO_PHOTOS)
        .await?
        .ok_or_else(photo_limit)?;

    state
        .audit
        .log_action(
            Some(writer.user_id),
            actions::UPDATE,
            entities::PRODUTO,
            id,
            Some(serde_json::json!({ "photo_added": photo.id })),
        )
        .await?;

    Ok((StatusCode::CREATED, Json(DataResponse { data: photo })))
}

/// POST /api/v1/produtos/upload-photo
///
/// Multipart form with a `file` part and the target `produto_id`. The photo
/// row is claimed before the object is stored and released if the put fails.
pub async fn upload_photo(
    RequireWriter(writer): RequireWriter,
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> AppResult<(StatusCode, Json<DataResponse<ProdutoPhoto>>)> {
    let form = UploadForm::read(&mut multipart).await?;
    let id = form.id("produto_id")?;
    let file = form.into_file(MAX_PRODUTO_PHOTO_BYTES)?;
    let extension = file.image_extension(STILL_IMAGE_TYPES)?;
    load_produto(&state.pool, id).await?;

    let key = format!("produto-{id}/photo-{}.{extension}", uuid::Uuid::new_v4().simple());
    let photo = ProdutoRepo::add_photo_capped(&state.pool, id, &key, MAX_PRODUTO_PHOTOS)
        .await?
        .ok_or_else(photo_limit)?;

    let size = file.data.len();
    if let Err(e) = state.storage.put(&key, file.data, &file.content_type).await {
        ProdutoRepo::delete_photo(&state.pool, id, photo.id).await?;
        return Err(e.into());
    }

    state
        .audit
        .log_action(
            Some(writer.user_id),
            actions::UPLOAD,
            entities::PRODUTO,
            id,
            Some(serde_json::json!({ "photo_added": photo.id, "size": size })),
        )
        .await?;

    tracing::info!(produto_id = id, photo_id = photo.id, size, "Produto photo uploaded");
    Ok((StatusCode::CREATED, Json(DataResponse { data: photo })))
}

/// GET /api/v1/produtos/{id}/cover
///
/// Short-lived link to the cover image, falling back to the first gallery
/// photo. Never cached.
pub async fn cover_url(
    State(state): State<AppState>,
    _user: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<Response> {
    let produto = load_produto(&state.pool, id).await?;
    let key = match produto.cover_image_key.filter(|k| !k.trim().is_empty()) {
        Some(key) => key,
        None => ProdutoRepo::list_photos(&state.pool, id)
            .await?
            .into_iter()
            .next()
            .map(|photo| photo.storage_key)
            .ok_or_else(|| AppError::NotFound("Produto has no cover image".into()))?,
    };

    let url = state.storage.presign_get(&key, PHOTO_URL_TTL).await?;
    Ok(no_store(SignedUrl {
        url,
        expires_in: PHOTO_URL_TTL.as_secs(),
    }))
}

/// DELETE /api/v1/produtos/{id}/photos/{photo_id}
///
/// Removes the row, then the stored object. A failed object delete is only
/// logged.
pub async fn delete_photo(
    RequireWriter(writer): RequireWriter,
    State(state): State<AppState>,
    Path((id, photo_id)): Path<(DbId, DbId)>,
) -> AppResult<StatusCode> {
    let key = ProdutoRepo::delete_photo(&state.pool, id, photo_id)
        .await?
        .ok_or_else(|| AppError::not_found("ProdutoPhoto", photo_id))?;

    if let Err(e) = state.storage.delete(&key).await {
        tracing::warn!(produto_id = id, key = %key, error = %e, "Object delete failed");
    }

    state
        .audit
        .log_action(
            Some(writer.user_id),
            actions::UPDATE,
            entities::PRODUTO,
            id,
            Some(serde_json::json!({ "photo_removed": photo_id })),
        )
        .await?;

    Ok(StatusCode::NO_CONTENT)
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn priced<T: Serialize>(item: T, preco_euro: Option<f64>, rate: f64) -> Priced<T> {
    let preco_brl = convert_eur_to_brl(preco_euro, rate).map(|v| (v * 100.0).round() / 100.0);
    Priced {
        item,
        preco_brl,
        preco_label: format_brl(preco_brl),
        preco_eur_label: format_eur(preco_euro),
    }
}

fn photo_limit() -> AppError {
    AppError::validation(format!(
        "A produto holds at most {MAX_PRODUTO_PHOTOS} photos"
    ))
}

fn check_price(preco_euro: Option<f64>) -> AppResult<()> {
    match preco_euro {
        Some(p) if !p.is_finite() || p < 0.0 => {
            Err(AppError::validation("Price must be zero or positive"))
        }
        _ => Ok(()),
    }
}

async fn load_produto(pool: &PgPool, id: DbId) -> AppResult<Produto> {
    ProdutoRepo::find_by_id(pool, id)
        .await?
        .ok_or_else(|| AppError::not_found("Produto", id))
}

/// First free slug derived from `nome`.
async fn unique_slug(pool: &PgPool, nome: &str, exclude_id: Option<DbId>) -> AppResult<String> {
    let base = slugify(nome);
    if base.is_empty() {
        return Err(AppError::validation("Nome must contain letters or digits"));
    }
    for candidate in slug_candidates(&base) {
        if !ProdutoRepo::slug_exists(pool, &candidate, exclude_id).await? {
            return Ok(candidate);
        }
    }
    Err(AppError::InternalError("Slug candidates exhausted".into()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prices_are_converted_and_labelled() {
        let p = priced((), Some(100.0), 5.5);
        assert_eq!(p.preco_brl, Some(550.0));
        assert_eq!(p.preco_label, "R$ 550,00");
    }

    #[test]
    fn missing_price_is_complimentary() {
        let p = priced((), None, 5.5);
        assert_eq!(p.preco_brl, None);
        assert_eq!(p.preco_label, "Cortesia");
    }

    #[test]
    fn negative_prices_are_rejected() {
        assert!(check_price(Some(-1.0)).is_err());
        assert!(check_price(Some(0.0)).is_ok());
        assert!(check_price(None).is_ok());
    }
}
