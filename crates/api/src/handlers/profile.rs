//! Handlers for the caller's own profile (`/profile`).

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use tna_core::audit::{actions, entities};
use tna_core::permissions::can_edit_profile;
use tna_core::roles::Role;
use tna_core::types::DbId;
use tna_core::validation::normalize_cpf;
use tna_db::models::user::{UpdateUser, UserResponse};
use tna_db::repositories::UserRepo;

use super::users::{checked_passport, checked_phone};
use super::{load_user, non_empty, parse_adult_birth_date};
use crate::auth::password::{hash_password, validate_strong_password, verify_password};
use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

/// Request body for `PATCH /profile`.
///
/// `target_user_id` lets an ARQUITETO edit someone else's profile.
#[derive(Debug, Deserialize)]
pub struct UpdateProfileRequest {
    pub name: Option<String>,
    pub phone: Option<String>,
    pub cpf: Option<String>,
    pub passport: Option<String>,
    pub birth_date: Option<String>,
    pub target_user_id: Option<DbId>,
}

#[derive(Debug, Deserialize)]
pub struct ChangePasswordRequest {
    pub current_password: String,
    pub new_password: String,
}

/// GET /api/v1/profile
pub async fn get_profile(
    State(state): State<AppState>,
    auth: AuthUser,
) -> AppResult<Json<DataResponse<UserResponse>>> {
    let user = load_user(&state.pool, auth.user_id).await?;
    Ok(Json(DataResponse { data: user.into() }))
}

/// PATCH /api/v1/profile
pub async fn update_profile(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(input): Json<UpdateProfileRequest>,
) -> AppResult<Json<DataResponse<UserResponse>>> {
    let target_id = input.target_user_id.unwrap_or(auth.user_id);
    can_edit_profile(auth.role, target_id, auth.user_id)?;
    load_user(&state.pool, target_id).await?;

    let cpf = match non_empty(input.cpf) {
        Some(_) if auth.role == Role::Cliente => {
            return Err(AppError::forbidden("CLIENTE accounts cannot change their CPF"));
        }
        Some(raw) => {
            let cpf =
                normalize_cpf(&raw).ok_or_else(|| AppError::validation("CPF must have 11 digits"))?;
            if UserRepo::cpf_taken(&state.pool, &cpf, Some(target_id)).await? {
                return Err(AppError::conflict("CPF already registered"));
            }
            Some(cpf)
        }
        None => None,
    };

    let phone = non_empty(input.phone)
        .map(|p| checked_phone(&p))
        .transpose()?;

    let passport = match non_empty(input.passport) {
        Some(raw) => {
            let passport = checked_passport(&raw)?;
            if UserRepo::passport_taken(&state.pool, &passport, Some(target_id)).await? {
                return Err(AppError::conflict("Passport already registered"));
            }
            Some(passport)
        }
        None => None,
    };

    let birth_date = non_empty(input.birth_date)
        .map(|b| parse_adult_birth_date(&b))
        .transpose()?;

    let update = UpdateUser {
        name: non_empty(input.name),
        cpf,
        phone,
        passport,
        birth_date,
        ..Default::default()
    };
    let user = UserRepo::update(&state.pool, target_id, &update)
        .await?
        .ok_or_else(|| AppError::not_found("User", target_id))?;

    state
        .audit
        .log_action(Some(auth.user_id), actions::UPDATE, entities::USER, target_id, None)
        .await?;

    Ok(Json(DataResponse { data: user.into() }))
}

/// POST /api/v1/profile/password
pub async fn change_password(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(input): Json<ChangePasswordRequest>,
) -> AppResult<StatusCode> {
    let user = load_user(&state.pool, auth.user_id).await?;

    let valid = verify_password(&input.current_password, &user.password_hash)
        .map_err(|e| AppError::InternalError(format!("Password verification error: {e}")))?;
    if !valid {
        return Err(AppError::validation("Current password is incorrect"));
    }
    validate_strong_password(&input.new_password).map_err(AppError::validation)?;

    let hash = hash_password(&input.new_password)
        .map_err(|e| AppError::InternalError(format!("Password hashing error: {e}")))?;
    UserRepo::update_password(&state.pool, user.id, &hash).await?;

    state
        .audit
        .log_action(
            Some(user.id),
            actions::UPDATE,
            entities::USER,
            user.id,
            Some(serde_json::json!({ "password_changed": true })),
        )
        .await?;

    tracing::info!(user_id = user.id, "Password changed");
    Ok(StatusCode::NO_CONTENT)
}
