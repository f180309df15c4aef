//! Profile change requests.
//!
//! MODELO and CLIENTE users cannot edit some of their own fields directly.
//! They file a request that an ARQUITETO approves (applying the value) or
//! rejects with a reason.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use tna_core::audit::{actions, entities};
use tna_core::status::{is_change_request_field, ChangeRequestStatus, CHANGE_REQUEST_FIELDS};
use tna_core::types::DbId;
use tna_core::validation::{normalize_email, validate_email};
use tna_db::models::change_request::{ChangeRequest, CreateChangeRequest};
use tna_db::models::user::{UpdateUser, User};
use tna_db::repositories::{ChangeRequestRepo, UserRepo};

use super::users::{checked_passport, checked_phone};
use super::{load_user, non_empty};
use crate::error::{AppError, AppResult};
use crate::middleware::rbac::{RequireArquiteto, RequireSubject};
use crate::middleware::write_guard::RequireWriter;
use crate::query::StatusFilter;
use crate::response::DataResponse;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct CreateSolicitacaoRequest {
    pub field: String,
    pub new_value: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReviewAction {
    Approve,
    Reject,
}

#[derive(Debug, Deserialize)]
pub struct ReviewSolicitacaoRequest {
    pub action: ReviewAction,
    pub motivo: Option<String>,
}

/// POST /api/v1/modelo/solicitacoes
pub async fn create_solicitacao(
    RequireSubject(user): RequireSubject,
    State(state): State<AppState>,
    Json(input): Json<CreateSolicitacaoRequest>,
) -> AppResult<(StatusCode, Json<DataResponse<ChangeRequest>>)> {
    let field = input.field.trim();
    if !is_change_request_field(field) {
        return Err(AppError::validation(format!(
            "Field must be one of: {}",
            CHANGE_REQUEST_FIELDS.join(", ")
        )));
    }
    let new_value = input.new_value.trim();
    if new_value.is_empty() {
        return Err(AppError::validation("new_value is required"));
    }

    if ChangeRequestRepo::has_pending(&state.pool, user.user_id, field).await? {
        return Err(AppError::conflict(
            "There is already a pending request for this field",
        ));
    }

    let me = load_user(&state.pool, user.user_id).await?;
    let request = ChangeRequestRepo::create(
        &state.pool,
        &CreateChangeRequest {
            user_id: user.user_id,
            field: field.to_string(),
            old_value: current_value(&me, field),
            new_value: new_value.to_string(),
        },
    )
    .await?;

    tracing::info!(request_id = request.id, user_id = user.user_id, field, "Change request filed");
    Ok((StatusCode::CREATED, Json(DataResponse { data: request })))
}

/// GET /api/v1/modelo/solicitacoes
pub async fn list_my_solicitacoes(
    RequireSubject(user): RequireSubject,
    State(state): State<AppState>,
) -> AppResult<Json<DataResponse<Vec<ChangeRequest>>>> {
    let requests = ChangeRequestRepo::list_for_user(&state.pool, user.user_id).await?;
    Ok(Json(DataResponse { data: requests }))
}

/// GET /api/v1/arquiteto/solicitacoes?status=
///
/// Defaults to PENDING; `ALL` lists every status.
pub async fn list_solicitacoes(
    RequireArquiteto(_user): RequireArquiteto,
    State(state): State<AppState>,
    Query(filter): Query<StatusFilter>,
) -> AppResult<Json<DataResponse<Vec<ChangeRequest>>>> {
    let status = match filter.status.as_deref() {
        None => Some(ChangeRequestStatus::Pending),
        Some("ALL") => None,
        Some(raw) => Some(
            ChangeRequestStatus::parse(raw)
                .ok_or_else(|| AppError::validation(format!("Unknown status '{raw}'")))?,
        ),
    };
    let requests = ChangeRequestRepo::list(&state.pool, status.map(ChangeRequestStatus::as_str)).await?;
    Ok(Json(DataResponse { data: requests }))
}

/// PATCH /api/v1/arquiteto/solicitacoes/{id}
pub async fn review_solicitacao(
    RequireWriter(writer): RequireWriter,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<ReviewSolicitacaoRequest>,
) -> AppResult<Json<DataResponse<ChangeRequest>>> {
    let request = ChangeRequestRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::not_found("ChangeRequest", id))?;
    if request.status != ChangeRequestStatus::Pending.as_str() {
        return Err(AppError::BadRequest("Request was already processed".into()));
    }

    let motivo = non_empty(input.motivo);
    let (resolved, action) = match input.action {
        ReviewAction::Approve => {
            let change = validated_change(&state, &request).await?;
            let resolved = ChangeRequestRepo::approve(&state.pool, id, writer.user_id, &change).await?;
            (resolved, actions::APPROVE_CHANGE_REQUEST)
        }
        ReviewAction::Reject => {
            if motivo.is_none() {
                return Err(AppError::validation("A reason (motivo) is required to reject"));
            }
            let resolved = ChangeRequestRepo::resolve(
                &state.pool,
                id,
                ChangeRequestStatus::Rejected.as_str(),
                writer.user_id,
                motivo.as_deref(),
            )
            .await?;
            (resolved, actions::REJECT_CHANGE_REQUEST)
        }
    };
    let resolved =
        resolved.ok_or_else(|| AppError::BadRequest("Request was already processed".into()))?;

    state
        .audit
        .log_action(
            Some(writer.user_id),
            action,
            entities::CHANGE_REQUEST,
            id,
            Some(serde_json::json!({
                "user_id": request.user_id,
                "field": request.field,
                "old_value": request.old_value,
                "new_value": request.new_value,
            })),
        )
        .await?;

    Ok(Json(DataResponse { data: resolved }))
}

/// The user's current value for a change-request field.
fn current_value(user: &User, field: &str) -> Option<String> {
    match field {
        "phone" => user.phone.clone(),
        "address" => user.address.clone(),
        "name" => user.name.clone(),
        "passport" => user.passport.clone(),
        "email" => Some(user.email.clone()),
        _ => None,
    }
}

/// Validate the requested value and turn it into a user update.
///
/// Uniqueness is pre-checked here for a clear message; the unique
/// constraints still reject a value claimed in the meantime.
async fn validated_change(state: &AppState, request: &ChangeRequest) -> AppResult<UpdateUser> {
    let user_id = request.user_id;
    let value = request.new_value.trim().to_string();
    let mut update = UpdateUser::default();

    match request.field.as_str() {
        "phone" => update.phone = Some(checked_phone(&value)?),
        "address" => update.address = Some(value),
        "name" => update.name = Some(value),
        "passport" => {
            let passport = checked_passport(&value)?;
            if UserRepo::passport_taken(&state.pool, &passport, Some(user_id)).await? {
                return Err(AppError::conflict("Passport already registered"));
            }
            update.passport = Some(passport);
        }
        "email" => {
            let email = normalize_email(&value);
            if !validate_email(&email) {
                return Err(AppError::validation("Invalid email"));
            }
            if UserRepo::email_taken(&state.pool, &email, Some(user_id)).await? {
                return Err(AppError::conflict("Email already registered"));
            }
            update.email = Some(email);
        }
        other => {
            return Err(AppError::InternalError(format!(
                "Stored change request has unsupported field '{other}'"
            )));
        }
    }
    Ok(update)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn review_actions_are_lowercase() {
        let input: ReviewSolicitacaoRequest =
            serde_json::from_str(r#"{"action":"reject","motivo":"typo"}"#).unwrap();
        assert!(matches!(input.action, ReviewAction::Reject));
        assert!(serde_json::from_str::<ReviewSolicitacaoRequest>(r#"{"action":"APPROVE"}"#).is_err());
    }
}
