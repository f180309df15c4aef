//! Handlers for user management (`/admin/users`, `/admin/reports`), profile
//! pictures, and the architect's subject lookups and password resets.

use axum::extract::{Multipart, Path, Query, State};
use axum::http::StatusCode;
use axum::response::Response;
use axum::Json;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tna_core::audit::{actions, entities};
use tna_core::permissions::can_read;
use tna_core::roles::Role;
use tna_core::types::DbId;
use tna_core::validation::{
    normalize_cpf, normalize_email, normalize_passport, normalize_phone_e164, validate_email,
    validate_passport,
};
use tna_db::models::user::{CreateUser, RoleCount, UpdateUser, UserResponse, UserSummary};
use tna_db::repositories::UserRepo;

use super::media::SignedUrl;
use super::modelo::PHOTO_URL_TTL;
use super::upload::{UploadForm, STILL_IMAGE_TYPES};
use super::{load_user, no_store, non_empty, parse_adult_birth_date};
use crate::auth::password::{
    hash_password, validate_password_strength, validate_strong_password, MIN_PASSWORD_LENGTH,
};
use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::middleware::rbac::{RequireArquiteto, RequireArquitetoOrAdmin, RequireStaff};
use crate::middleware::write_guard::RequireWriter;
use crate::response::DataResponse;
use crate::state::AppState;

/// Users shown on the reports page.
const REPORT_RECENT_USERS: i64 = 30;
/// Shortest CPF prefix accepted by the subject search.
const CPF_SEARCH_MIN_DIGITS: usize = 3;
const CPF_SEARCH_LIMIT: i64 = 10;
/// Shortest text accepted by the name and email search.
const SEARCH_MIN_CHARS: usize = 2;
const SEARCH_LIMIT: i64 = 20;
/// Largest accepted profile picture.
pub const MAX_PROFILE_IMAGE_BYTES: usize = 3 * 1024 * 1024;

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct UserListParams {
    pub role: Option<String>,
}

/// Request body for `POST /admin/users`.
#[derive(Debug, Deserialize)]
pub struct CreateUserRequest {
    pub email: String,
    pub name: Option<String>,
    pub password: String,
    pub role: Option<String>,
    pub cpf: Option<String>,
    pub phone: Option<String>,
    pub passport: Option<String>,
    pub birth_date: Option<String>,
}

/// Request body for `PATCH /admin/users/{id}`.
#[derive(Debug, Deserialize)]
pub struct UpdateUserRequest {
    pub email: Option<String>,
    pub name: Option<String>,
    pub role: Option<String>,
    pub cpf: Option<String>,
    pub phone: Option<String>,
    pub passport: Option<String>,
    pub address: Option<String>,
    pub birth_date: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ReportsResponse {
    pub recent_users: Vec<UserResponse>,
    pub counts_by_role: Vec<RoleCount>,
    pub total_users: i64,
}

#[derive(Debug, Deserialize)]
pub struct CpfSearchParams {
    pub cpf: String,
}

#[derive(Debug, Deserialize)]
pub struct UserSearchParams {
    pub q: Option<String>,
    pub role: Option<String>,
}

/// Request body for `POST /arquiteto/users/reset-password`.
#[derive(Debug, Deserialize)]
pub struct ResetPasswordRequest {
    pub user_id: Option<DbId>,
    pub new_password: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ResetPasswordResponse {
    pub message: &'static str,
    pub user_id: DbId,
}

#[derive(Debug, Serialize)]
pub struct ProfileImageUpload {
    pub key: String,
    pub url: String,
    pub size: usize,
    pub content_type: String,
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// GET /api/v1/admin/users
pub async fn list_users(
    RequireStaff(_user): RequireStaff,
    State(state): State<AppState>,
    Query(params): Query<UserListParams>,
) -> AppResult<Json<DataResponse<Vec<UserResponse>>>> {
    let role = match params.role.as_deref() {
        Some(raw) => Some(
            Role::parse(raw).ok_or_else(|| AppError::validation(format!("Unknown role '{raw}'")))?,
        ),
        None => None,
    };
    let users = UserRepo::list(&state.pool, role.map(Role::as_str)).await?;
    Ok(Json(DataResponse {
        data: users.into_iter().map(UserResponse::from).collect(),
    }))
}

/// POST /api/v1/admin/users
pub async fn create_user(
    RequireWriter(writer): RequireWriter,
    State(state): State<AppState>,
    Json(input): Json<CreateUserRequest>,
) -> AppResult<(StatusCode, Json<DataResponse<UserResponse>>)> {
    let email = normalize_email(&input.email);
    if !validate_email(&email) {
        return Err(AppError::validation("Invalid email"));
    }
    validate_password_strength(&input.password, MIN_PASSWORD_LENGTH)
        .map_err(AppError::validation)?;

    let role = match input.role.as_deref() {
        Some(raw) => {
            Role::parse(raw).ok_or_else(|| AppError::validation(format!("Unknown role '{raw}'")))?
        }
        None => Role::Modelo,
    };

    let cpf = input
        .cpf
        .as_deref()
        .and_then(normalize_cpf)
        .ok_or_else(|| AppError::validation("CPF must have 11 digits"))?;
    let phone = non_empty(input.phone).ok_or_else(|| AppError::validation("Phone is required"))?;
    let phone = normalize_phone_e164(&phone)
        .ok_or_else(|| AppError::validation("Phone must be in international format"))?;
    let birth_date = non_empty(input.birth_date)
        .ok_or_else(|| AppError::validation("Birth date is required"))?;
    let birth_date = parse_adult_birth_date(&birth_date)?;
    let passport = non_empty(input.passport)
        .map(|p| checked_passport(&p))
        .transpose()?;

    if UserRepo::email_taken(&state.pool, &email, None).await? {
        return Err(AppError::conflict("Email already registered"));
    }
    if UserRepo::cpf_taken(&state.pool, &cpf, None).await? {
        return Err(AppError::conflict("CPF already registered"));
    }
    if let Some(passport) = &passport {
        if UserRepo::passport_taken(&state.pool, passport, None).await? {
            return Err(AppError::conflict("Passport already registered"));
        }
    }

    let password_hash = hash_password(&input.password)
        .map_err(|e| AppError::InternalError(format!("Password hashing error: {e}")))?;

    let user = UserRepo::create(
        &state.pool,
        &CreateUser {
            email,
            name: non_empty(input.name),
            password_hash,
            role: role.as_str().to_string(),
            cpf: Some(cpf),
            phone: Some(phone),
            passport,
            birth_date: Some(birth_date),
        },
    )
    .await?;

    state
        .audit
        .log_action(
            Some(writer.user_id),
            actions::CREATE,
            entities::USER,
            user.id,
            Some(serde_json::json!({ "role": role.as_str() })),
        )
        .await?;

    tracing::info!(user_id = user.id, created_by = writer.user_id, "User created");
    Ok((StatusCode::CREATED, Json(DataResponse { data: user.into() })))
}

/// GET /api/v1/admin/users/{id}
pub async fn get_user(
    RequireStaff(_user): RequireStaff,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<UserResponse>>> {
    let user = load_user(&state.pool, id).await?;
    Ok(Json(DataResponse { data: user.into() }))
}

/// PATCH /api/v1/admin/users/{id}
pub async fn update_user(
    RequireWriter(writer): RequireWriter,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateUserRequest>,
) -> AppResult<Json<DataResponse<UserResponse>>> {
    load_user(&state.pool, id).await?;

    let email = match non_empty(input.email) {
        Some(raw) => {
            let email = normalize_email(&raw);
            if !validate_email(&email) {
                return Err(AppError::validation("Invalid email"));
            }
            if UserRepo::email_taken(&state.pool, &email, Some(id)).await? {
                return Err(AppError::conflict("Email already registered"));
            }
            Some(email)
        }
        None => None,
    };

    let role = match input.role.as_deref() {
        Some(raw) => Some(
            Role::parse(raw)
                .ok_or_else(|| AppError::validation(format!("Unknown role '{raw}'")))?
                .as_str()
                .to_string(),
        ),
        None => None,
    };

    let cpf = match non_empty(input.cpf) {
        Some(raw) => {
            let cpf =
                normalize_cpf(&raw).ok_or_else(|| AppError::validation("CPF must have 11 digits"))?;
            if UserRepo::cpf_taken(&state.pool, &cpf, Some(id)).await? {
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
            if UserRepo::passport_taken(&state.pool, &passport, Some(id)).await? {
                return Err(AppError::conflict("Passport already registered"));
            }
            Some(passport)
        }
        None => None,
    };

    let birth_date = non_empty(input.birth_date)
        .map(|b| parse_adult_birth_date(&b))
        .transpose()?;

    if let Some(password) = &input.password {
        validate_strong_password(password).map_err(AppError::validation)?;
    }

    let update = UpdateUser {
        email,
        name: non_empty(input.name),
        role,
        cpf,
        phone,
        passport,
        address: non_empty(input.address),
        birth_date,
        profile_image_key: None,
    };
    let user = UserRepo::update(&state.pool, id, &update)
        .await?
        .ok_or_else(|| AppError::not_found("User", id))?;

    if let Some(password) = &input.password {
        let hash = hash_password(password)
            .map_err(|e| AppError::InternalError(format!("Password hashing error: {e}")))?;
        UserRepo::update_password(&state.pool, id, &hash).await?;
    }

    state
        .audit
        .log_action(
            Some(writer.user_id),
            actions::UPDATE,
            entities::USER,
            id,
            Some(serde_json::json!({ "password_changed": input.password.is_some() })),
        )
        .await?;

    Ok(Json(DataResponse { data: user.into() }))
}

/// DELETE /api/v1/admin/users/{id}
pub async fn delete_user(
    RequireWriter(writer): RequireWriter,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    if id == writer.user_id {
        return Err(AppError::BadRequest("You cannot delete your own account".into()));
    }
    let user = load_user(&state.pool, id).await?;
    UserRepo::delete(&state.pool, id).await?;

    state
        .audit
        .log_action(
            Some(writer.user_id),
            actions::DELETE_PERMANENT,
            entities::USER,
            id,
            Some(serde_json::json!({ "email": user.email, "role": user.role })),
        )
        .await?;

    tracing::info!(user_id = id, deleted_by = writer.user_id, "User deleted");
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/v1/admin/reports
pub async fn reports(
    RequireArquitetoOrAdmin(_user): RequireArquitetoOrAdmin,
    State(state): State<AppState>,
) -> AppResult<Json<DataResponse<ReportsResponse>>> {
    let recent = UserRepo::list_recent(&state.pool, REPORT_RECENT_USERS).await?;
    let counts_by_role = UserRepo::count_by_role(&state.pool).await?;
    let total_users = counts_by_role.iter().map(|c| c.count).sum();

    Ok(Json(DataResponse {
        data: ReportsResponse {
            recent_users: recent.into_iter().map(UserResponse::from).collect(),
            counts_by_role,
            total_users,
        },
    }))
}

/// GET /api/v1/arquiteto/users/search-by-cpf?cpf=
///
/// Prefix search over MODELO and CLIENTE users, for picking an ensaio subject.
pub async fn search_by_cpf(
    RequireArquiteto(_user): RequireArquiteto,
    State(state): State<AppState>,
    Query(params): Query<CpfSearchParams>,
) -> AppResult<Json<DataResponse<Vec<UserSummary>>>> {
    let prefix = cpf_prefix(&params.cpf)?;
    let users =
        UserRepo::search_subjects_by_cpf_prefix(&state.pool, &prefix, CPF_SEARCH_LIMIT).await?;
    Ok(Json(DataResponse { data: users }))
}

/// GET /api/v1/arquiteto/users/search?q=&role=
///
/// Name, email or CPF lookup over MODELO and CLIENTE users. Queries shorter
/// than two characters return nothing.
pub async fn search_users(
    RequireArquitetoOrAdmin(_user): RequireArquitetoOrAdmin,
    State(state): State<AppState>,
    Query(params): Query<UserSearchParams>,
) -> AppResult<Json<DataResponse<Vec<UserSummary>>>> {
    let role = match non_empty(params.role) {
        Some(raw) => match Role::parse(&raw) {
            Some(role) if role.is_subject() => Some(role),
            _ => return Err(AppError::validation("Role must be MODELO or CLIENTE")),
        },
        None => None,
    };
    let text = params.q.unwrap_or_default();
    let text = text.trim();
    if text.chars().count() < SEARCH_MIN_CHARS {
        return Ok(Json(DataResponse { data: Vec::new() }));
    }

    let users = UserRepo::search_subjects(
        &state.pool,
        text,
        cpf_fragment(text).as_deref(),
        role.map(Role::as_str),
        SEARCH_LIMIT,
    )
    .await?;
    Ok(Json(DataResponse { data: users }))
}

/// POST /api/v1/arquiteto/users/reset-password
///
/// Sets a new password for any user without asking for the current one.
pub async fn reset_password(
    RequireWriter(writer): RequireWriter,
    State(state): State<AppState>,
    Json(input): Json<ResetPasswordRequest>,
) -> AppResult<Json<DataResponse<ResetPasswordResponse>>> {
    let (Some(user_id), Some(new_password)) = (input.user_id, input.new_password) else {
        return Err(AppError::validation("user_id and new_password are required"));
    };
    validate_password_strength(&new_password, MIN_PASSWORD_LENGTH)
        .map_err(AppError::validation)?;

    let hash = hash_password(&new_password)
        .map_err(|e| AppError::InternalError(format!("Password hashing error: {e}")))?;
    if !UserRepo::update_password(&state.pool, user_id, &hash).await? {
        return Err(AppError::not_found("User", user_id));
    }

    state
        .audit
        .log_action(
            Some(writer.user_id),
            actions::UPDATE,
            entities::USER,
            user_id,
            Some(serde_json::json!({ "password_reset": true })),
        )
        .await?;

    tracing::info!(user_id, reset_by = writer.user_id, "Password reset");
    Ok(Json(DataResponse {
        data: ResetPasswordResponse {
            message: "Password reset",
            user_id,
        },
    }))
}

/// POST /api/v1/admin/users/upload-profile-image
///
/// Multipart form with a `file` part and the target `user_id`. The previous
/// picture, if any, is removed from storage once the new one is saved.
pub async fn upload_profile_image(
    RequireWriter(writer): RequireWriter,
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> AppResult<(StatusCode, Json<DataResponse<ProfileImageUpload>>)> {
    let form = UploadForm::read(&mut multipart).await?;
    let user_id = form.id("user_id")?;
    let file = form.into_file(MAX_PROFILE_IMAGE_BYTES)?;
    let extension = file.image_extension(STILL_IMAGE_TYPES)?;
    let previous = load_user(&state.pool, user_id).await?.profile_image_key;

    let key = format!(
        "profile-images/{user_id}-{}.{extension}",
        Utc::now().timestamp_millis()
    );
    let size = file.data.len();
    state.storage.put(&key, file.data, &file.content_type).await?;

    let update = UpdateUser {
        profile_image_key: Some(key.clone()),
        ..Default::default()
    };
    let saved = UserRepo::update(&state.pool, user_id, &update).await;
    if !matches!(saved, Ok(Some(_))) {
        if let Err(e) = state.storage.delete(&key).await {
            tracing::warn!(user_id, key = %key, error = %e, "Orphaned profile image");
        }
        saved?.ok_or_else(|| AppError::not_found("User", user_id))?;
    }

    if let Some(old) = previous.filter(|old| *old != key) {
        if let Err(e) = state.storage.delete(&old).await {
            tracing::warn!(user_id, key = %old, error = %e, "Old profile image delete failed");
        }
    }

    state
        .audit
        .log_action(
            Some(writer.user_id),
            actions::UPLOAD,
            entities::USER,
            user_id,
            Some(serde_json::json!({ "profile_image": key, "size": size })),
        )
        .await?;

    let url = state.storage.presign_get(&key, PHOTO_URL_TTL).await?;
    Ok((
        StatusCode::CREATED,
        Json(DataResponse {
            data: ProfileImageUpload {
                key,
                url,
                size,
                content_type: file.content_type,
            },
        }),
    ))
}

/// GET /api/v1/users/{id}/profile-image
///
/// Staff may read any picture; everyone else only their own. Never cached.
pub async fn profile_image(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<Response> {
    can_read(user.role, Some(id), user.user_id)?;
    let key = load_user(&state.pool, id)
        .await?
        .profile_image_key
        .ok_or_else(|| AppError::NotFound("User has no profile image".into()))?;

    let url = if key.starts_with("https://") || key.starts_with("http://") {
        key
    } else {
        state.storage.presign_get(&key, PHOTO_URL_TTL).await?
    };
    Ok(no_store(SignedUrl {
        url,
        expires_in: PHOTO_URL_TTL.as_secs(),
    }))
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// CPF digits worth matching when the query looks like part of a CPF.
fn cpf_fragment(text: &str) -> Option<String> {
    let digits: String = text.chars().filter(char::is_ascii_digit).collect();
    (CPF_SEARCH_MIN_DIGITS..=11)
        .contains(&digits.len())
        .then_some(digits)
}

/// Digits of a partial CPF, at least [`CPF_SEARCH_MIN_DIGITS`] long.
fn cpf_prefix(raw: &str) -> AppResult<String> {
    let digits: String = raw.chars().filter(char::is_ascii_digit).take(11).collect();
    if digits.len() < CPF_SEARCH_MIN_DIGITS {
        return Err(AppError::validation(format!(
            "Type at least {CPF_SEARCH_MIN_DIGITS} CPF digits"
        )));
    }
    Ok(digits)
}

/// Profile edits take numbers only in international form.
pub(crate) fn checked_phone(raw: &str) -> AppResult<String> {
    if !raw.trim().starts_with('+') {
        return Err(AppError::validation(
            "Phone must start with + and the country code",
        ));
    }
    normalize_phone_e164(raw).ok_or_else(|| AppError::validation("Invalid phone number"))
}

pub(crate) fn checked_passport(raw: &str) -> AppResult<String> {
    let passport = normalize_passport(raw);
    if !validate_passport(&passport) {
        return Err(AppError::validation(
            "Passport must be a 2-letter country code followed by 6 to 9 letters or digits",
        ));
    }
    Ok(passport)
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn cpf_fragment_needs_three_to_eleven_digits() {
        assert_eq!(cpf_fragment("ana"), None);
        assert_eq!(cpf_fragment("12"), None);
        assert_eq!(cpf_fragment("123.45"), Some("12345".into()));
        assert_eq!(cpf_fragment("123456789012"), None);
    }

    #[test]
    fn cpf_prefix_needs_three_digits() {
        assert_eq!(cpf_prefix("123.4").unwrap(), "1234");
        assert_matches!(cpf_prefix("12"), Err(AppError::Core(_)));
        assert_eq!(cpf_prefix("123.456.789-0123").unwrap(), "12345678901");
    }

    #[test]
    fn phone_needs_country_code() {
        assert!(checked_phone("11987654321").is_err());
        assert_eq!(checked_phone("+55 11 98765-4321").unwrap(), "+5511987654321");
    }

    #[test]
    fn passport_is_upper_cased() {
        assert_eq!(checked_passport("br1234567").unwrap(), "BR1234567");
        assert!(checked_passport("1234").is_err());
    }
}
