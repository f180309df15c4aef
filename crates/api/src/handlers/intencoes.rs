//! Handlers for purchase intents (`/intencoes`).

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use tna_core::audit::{actions, entities};
use tna_core::roles::Role;
use tna_core::status::IntencaoStatus;
use tna_core::types::DbId;
use tna_db::models::intencao::{Intencao, IntencaoDetail};
use tna_db::repositories::{IntencaoRepo, ProdutoRepo};

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::middleware::rbac::RequireModelo;
use crate::middleware::write_guard::RequireWriter;
use crate::response::DataResponse;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct CreateIntencaoRequest {
    pub produto_id: DbId,
}

#[derive(Debug, Deserialize)]
pub struct IntencaoListParams {
    pub modelo_id: Option<DbId>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateIntencaoStatusRequest {
    pub status: String,
}

/// POST /api/v1/intencoes
pub async fn create_intencao(
    RequireModelo(user): RequireModelo,
    State(state): State<AppState>,
    Json(input): Json<CreateIntencaoRequest>,
) -> AppResult<(StatusCode, Json<DataResponse<Intencao>>)> {
    ProdutoRepo::find_by_id(&state.pool, input.produto_id)
        .await?
        .ok_or_else(|| AppError::not_found("Produto", input.produto_id))?;

    if IntencaoRepo::has_pending(&state.pool, user.user_id, input.produto_id).await? {
        return Err(AppError::BadRequest(
            "There is already a pending intent for this produto".into(),
        ));
    }

    let intencao = IntencaoRepo::create(&state.pool, user.user_id, input.produto_id).await?;
    tracing::info!(
        intencao_id = intencao.id,
        modelo_id = user.user_id,
        produto_id = input.produto_id,
        "Purchase intent registered",
    );
    Ok((StatusCode::CREATED, Json(DataResponse { data: intencao })))
}

/// GET /api/v1/intencoes
///
/// A MODELO sees its own intents; staff see all, optionally for one modelo.
pub async fn list_intencoes(
    State(state): State<AppState>,
    user: AuthUser,
    Query(params): Query<IntencaoListParams>,
) -> AppResult<Json<DataResponse<Vec<IntencaoDetail>>>> {
    let modelo_id = match user.role {
        Role::Modelo => Some(user.user_id),
        role if role.is_staff() => params.modelo_id,
        _ => return Err(AppError::forbidden("Modelo or staff role required")),
    };
    let intencoes = IntencaoRepo::list(&state.pool, modelo_id).await?;
    Ok(Json(DataResponse { data: intencoes }))
}

/// PATCH /api/v1/intencoes/{id}/status
pub async fn update_status(
    RequireWriter(writer): RequireWriter,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateIntencaoStatusRequest>,
) -> AppResult<Json<DataResponse<Intencao>>> {
    let next = IntencaoStatus::parse(&input.status)
        .ok_or_else(|| AppError::validation(format!("Unknown status '{}'", input.status)))?;

    let current = IntencaoRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::not_found("IntencaoCompra", id))?;
    let from = IntencaoStatus::parse(&current.status).ok_or_else(|| {
        AppError::InternalError(format!("Stored status '{}' is invalid", current.status))
    })?;

    if !from.can_transition_to(next) {
        return Err(AppError::BadRequest(format!(
            "Cannot move an intent from {} to {}",
            from.as_str(),
            next.as_str()
        )));
    }

    // The expected status guards against a concurrent change.
    let updated = IntencaoRepo::update_status(&state.pool, id, from.as_str(), next.as_str())
        .await?
        .ok_or_else(|| AppError::conflict("Intent changed meanwhile, reload and retry"))?;

    state
        .audit
        .log_action(
            Some(writer.user_id),
            actions::STATUS_CHANGE,
            entities::INTENCAO,
            id,
            Some(serde_json::json!({ "from": from.as_str(), "to": next.as_str() })),
        )
        .await?;

    Ok(Json(DataResponse { data: updated }))
}
