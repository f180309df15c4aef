//! Handlers for the `/projetos` resource.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use sqlx::PgPool;
use tna_core::audit::{actions, entities};
use tna_core::slug::{slug_candidates, slugify};
use tna_core::types::DbId;
use tna_db::models::projeto::{CreateProjeto, Projeto, ProjetoWithCount, UpdateProjeto};
use tna_db::repositories::ProjetoRepo;

use super::non_empty;
use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::middleware::write_guard::RequireWriter;
use crate::response::DataResponse;
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct ProjetoListParams {
    /// `true` hides inactive projetos.
    #[serde(default)]
    pub active: bool,
}

#[derive(Debug, Deserialize)]
pub struct CreateProjetoRequest {
    pub name: Option<String>,
    pub slug: Option<String>,
    pub description: Option<String>,
    pub active: Option<bool>,
}

/// GET /api/v1/projetos
pub async fn list_projetos(
    State(state): State<AppState>,
    _user: AuthUser,
    Query(params): Query<ProjetoListParams>,
) -> AppResult<Json<DataResponse<Vec<ProjetoWithCount>>>> {
    let projetos = ProjetoRepo::list(&state.pool, params.active).await?;
    Ok(Json(DataResponse { data: projetos }))
}

/// POST /api/v1/projetos
///
/// A missing slug is generated from the name; a given one must be free.
pub async fn create_projeto(
    RequireWriter(writer): RequireWriter,
    State(state): State<AppState>,
    Json(input): Json<CreateProjetoRequest>,
) -> AppResult<(StatusCode, Json<DataResponse<Projeto>>)> {
    let name = non_empty(input.name).ok_or_else(|| AppError::validation("Name is required"))?;
    let slug = match non_empty(input.slug) {
        Some(raw) => claimed_slug(&state.pool, &raw, None).await?,
        None => generated_slug(&state.pool, &name).await?,
    };

    let projeto = ProjetoRepo::create(
        &state.pool,
        &CreateProjeto {
            name,
            slug,
            description: non_empty(input.description),
            active: input.active,
        },
    )
    .await?;

    state
        .audit
        .log_action(
            Some(writer.user_id),
            actions::CREATE,
            entities::PROJETO,
            projeto.id,
            Some(serde_json::json!({ "slug": projeto.slug })),
        )
        .await?;

    Ok((StatusCode::CREATED, Json(DataResponse { data: projeto })))
}

/// GET /api/v1/projetos/{id}
pub async fn get_projeto(
    State(state): State<AppState>,
    _user: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<Projeto>>> {
    let projeto = ProjetoRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::not_found("Projeto", id))?;
    Ok(Json(DataResponse { data: projeto }))
}

/// PATCH /api/v1/projetos/{id}
pub async fn update_projeto(
    RequireWriter(writer): RequireWriter,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(mut input): Json<UpdateProjeto>,
) -> AppResult<Json<DataResponse<Projeto>>> {
    input.name = non_empty(input.name.take());
    input.slug = match non_empty(input.slug.take()) {
        Some(raw) => Some(claimed_slug(&state.pool, &raw, Some(id)).await?),
        None => None,
    };

    let projeto = ProjetoRepo::update(&state.pool, id, &input)
        .await?
        .ok_or_else(|| AppError::not_found("Projeto", id))?;

    state
        .audit
        .log_action(Some(writer.user_id), actions::UPDATE, entities::PROJETO, id, None)
        .await?;

    Ok(Json(DataResponse { data: projeto }))
}

/// DELETE /api/v1/projetos/{id}
pub async fn delete_projeto(
    RequireWriter(writer): RequireWriter,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    if !ProjetoRepo::soft_delete(&state.pool, id).await? {
        return Err(AppError::not_found("Projeto", id));
    }

    state
        .audit
        .log_action(Some(writer.user_id), actions::DELETE_LOGICAL, entities::PROJETO, id, None)
        .await?;

    Ok(StatusCode::NO_CONTENT)
}

/// A client-chosen slug, normalized; taken slugs are a conflict.
async fn claimed_slug(pool: &PgPool, raw: &str, exclude_id: Option<DbId>) -> AppResult<String> {
    let slug = slugify(raw);
    if slug.is_empty() {
        return Err(AppError::validation("Slug must contain letters or digits"));
    }
    if ProjetoRepo::slug_exists(pool, &slug, exclude_id).await? {
        return Err(AppError::conflict(format!("Slug '{slug}' is already in use")));
    }
    Ok(slug)
}

async fn generated_slug(pool: &PgPool, name: &str) -> AppResult<String> {
    let base = slugify(name);
    if base.is_empty() {
        return Err(AppError::validation("Name must contain letters or digits"));
    }
    for candidate in slug_candidates(&base) {
        if !ProjetoRepo::slug_exists(pool, &candidate, None).await? {
            return Ok(candidate);
        }
    }
    Err(AppError::InternalError("Slug candidates exhausted".into()))
}
