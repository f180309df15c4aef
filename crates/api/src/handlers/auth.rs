//! Handlers for the `/auth` resource (login, logout, session, signup).

use axum::extract::State;
use axum::http::header::SET_COOKIE;
use axum::http::{HeaderMap, StatusCode};
use axum::response::{AppendHeaders, IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use tna_core::audit::{actions, entities};
use tna_core::roles::{Role, ROLE_MODELO};
use tna_core::types::Timestamp;
use tna_core::validation::{normalize_cpf, normalize_email, normalize_phone_e164, validate_email};
use tna_db::models::user::{CreateUser, UserResponse};
use tna_db::repositories::UserRepo;

use super::{client_ip, load_user, non_empty, parse_adult_birth_date};
use crate::arquiteto_session;
use crate::auth::cookie::{clear_session_cookie, session_cookie};
use crate::auth::jwt::{generate_session_token, IssuedSession};
use crate::auth::password::{
    hash_password, validate_password_strength, verify_password, MIN_PASSWORD_LENGTH,
};
use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

/// Request body for `POST /auth/login`.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Successful authentication response returned by login and extend.
#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub token: String,
    /// Session lifetime in seconds.
    pub expires_in: i64,
    pub user: UserResponse,
}

/// Response for `GET /auth/session`.
#[derive(Debug, Serialize)]
pub struct SessionResponse {
    pub user: UserResponse,
    /// `true` when another login of the same ARQUITETO holds write access.
    pub read_only: bool,
    /// When read-only, the moment the write-capable login started.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub writer_since: Option<Timestamp>,
    pub expires_at: i64,
}

/// Request body for `POST /auth/signup/modelo`.
#[derive(Debug, Deserialize)]
pub struct SignupModeloRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: String,
    pub cpf: Option<String>,
    pub phone: Option<String>,
    pub birth_date: Option<String>,
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// POST /api/v1/auth/login
///
/// Authenticate with email + password. Sets the session cookie and also
/// returns the token for API clients.
pub async fn login(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(input): Json<LoginRequest>,
) -> AppResult<Response> {
    let ip = client_ip(&headers);
    state.login_limiter.check(&format!("login:{ip}")).await?;

    let email = normalize_email(&input.email);
    let invalid = || AppError::unauthorized("Invalid email or password");

    let user = UserRepo::find_by_email(&state.pool, &email)
        .await?
        .ok_or_else(invalid)?;

    let password_valid = verify_password(&input.password, &user.password_hash)
        .map_err(|e| AppError::InternalError(format!("Password verification error: {e}")))?;
    if !password_valid {
        tracing::info!(user_id = user.id, ip = %ip, "Failed login");
        return Err(invalid());
    }

    let role = Role::parse(&user.role)
        .ok_or_else(|| AppError::InternalError(format!("Unknown role '{}'", user.role)))?;

    let session = issue_session(&state, user.id, role, None)?;

    if role == Role::Arquiteto {
        let expires_at = chrono::DateTime::from_timestamp(session.claims.exp, 0)
            .ok_or_else(|| AppError::InternalError("Invalid token expiry".into()))?;
        arquiteto_session::register_login(&state.pool, user.id, &session.claims.sid, expires_at)
            .await?;
    }

    state
        .audit
        .log_action(
            Some(user.id),
            actions::LOGIN,
            entities::USER,
            user.id,
            Some(serde_json::json!({ "ip": ip, "role": role.as_str() })),
        )
        .await?;

    tracing::info!(user_id = user.id, role = %role, "User logged in");
    Ok(session_response(&state, session, user.into()))
}

/// POST /api/v1/auth/logout
///
/// Clears the cookie, drops the architect session and revokes every
/// secure-URL token of the user.
pub async fn logout(State(state): State<AppState>, auth: AuthUser) -> AppResult<Response> {
    if auth.role == Role::Arquiteto {
        arquiteto_session::remove(&state.pool, &auth.session_id).await?;
    }
    let revoked = state.secure_tokens.revoke_all_for_user(auth.user_id).await;

    state
        .audit
        .log_action(Some(auth.user_id), actions::LOGOUT, entities::USER, auth.user_id, None)
        .await?;

    tracing::info!(user_id = auth.user_id, revoked, "User logged out");
    let cookie = clear_session_cookie(state.config.app_env.is_production());
    Ok((StatusCode::NO_CONTENT, AppendHeaders([(SET_COOKIE, cookie)])).into_response())
}

/// GET /api/v1/auth/session
pub async fn session(
    State(state): State<AppState>,
    auth: AuthUser,
) -> AppResult<Json<DataResponse<SessionResponse>>> {
    let user = load_user(&state.pool, auth.user_id).await?;
    let read_only = match auth.role {
        Role::Arquiteto => arquiteto_session::is_read_only(&state.pool, &auth.session_id).await?,
        Role::Admin => true,
        _ => false,
    };
    let writer_since = if read_only && auth.role == Role::Arquiteto {
        arquiteto_session::get_active(&state.pool, auth.user_id)
            .await?
            .map(|s| s.created_at)
    } else {
        None
    };
    Ok(Json(DataResponse {
        data: SessionResponse {
            user: user.into(),
            read_only,
            writer_since,
            expires_at: auth.issued_at + state.config.jwt.session_max_age_secs,
        },
    }))
}

/// POST /api/v1/auth/session/extend
///
/// Re-issue the token for the same session id with a fresh expiry. An
/// ARQUITETO's write power is never granted here, only kept.
pub async fn extend(State(state): State<AppState>, auth: AuthUser) -> AppResult<Response> {
    let user = UserRepo::find_by_id(&state.pool, auth.user_id)
        .await?
        .ok_or_else(|| AppError::unauthorized("User no longer exists"))?;
    let role = Role::parse(&user.role)
        .ok_or_else(|| AppError::InternalError(format!("Unknown role '{}'", user.role)))?;

    let session = issue_session(&state, user.id, role, Some(&auth.session_id))?;

    // Only the session that already holds write power has its row extended.
    if role == Role::Arquiteto {
        let expires_at = chrono::DateTime::from_timestamp(session.claims.exp, 0)
            .ok_or_else(|| AppError::InternalError("Invalid token expiry".into()))?;
        arquiteto_session::extend(&state.pool, user.id, &auth.session_id, expires_at).await?;
    }

    tracing::debug!(user_id = user.id, "Session extended");
    Ok(session_response(&state, session, user.into()))
}

/// POST /api/v1/auth/signup/modelo
///
/// Public self-registration. The role is always MODELO.
pub async fn signup_modelo(
    State(state): State<AppState>,
    Json(input): Json<SignupModeloRequest>,
) -> AppResult<(StatusCode, Json<DataResponse<UserResponse>>)> {
    let name = non_empty(input.name).ok_or_else(|| AppError::validation("Name is required"))?;
    let email = non_empty(input.email)
        .map(|e| normalize_email(&e))
        .ok_or_else(|| AppError::validation("Email is required"))?;
    if !validate_email(&email) {
        return Err(AppError::validation("Invalid email"));
    }
    validate_password_strength(&input.password, MIN_PASSWORD_LENGTH)
        .map_err(AppError::validation)?;
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

    if UserRepo::email_taken(&state.pool, &email, None).await? {
        return Err(AppError::conflict("Email already registered"));
    }
    if UserRepo::cpf_taken(&state.pool, &cpf, None).await? {
        return Err(AppError::conflict("CPF already registered"));
    }

    let password_hash = hash_password(&input.password)
        .map_err(|e| AppError::InternalError(format!("Password hashing error: {e}")))?;

    let user = UserRepo::create(
        &state.pool,
        &CreateUser {
            email,
            name: Some(name),
            password_hash,
            role: ROLE_MODELO.to_string(),
            cpf: Some(cpf),
            phone: Some(phone),
            passport: None,
            birth_date: Some(birth_date),
        },
    )
    .await?;

    tracing::info!(user_id = user.id, "Modelo signed up");
    Ok((StatusCode::CREATED, Json(DataResponse { data: user.into() })))
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn issue_session(
    state: &AppState,
    user_id: tna_core::types::DbId,
    role: Role,
    session_id: Option<&str>,
) -> AppResult<IssuedSession> {
    generate_session_token(user_id, role.as_str(), session_id, &state.config.jwt)
        .map_err(|e| AppError::InternalError(format!("Token generation error: {e}")))
}

/// Cookie plus JSON body carrying the same token.
fn session_response(state: &AppState, session: IssuedSession, user: UserResponse) -> Response {
    let max_age = state.config.jwt.session_max_age_secs;
    let cookie = session_cookie(&session.token, max_age, state.config.app_env.is_production());
    (
        AppendHeaders([(SET_COOKIE, cookie)]),
        Json(AuthResponse {
            token: session.token,
            expires_in: max_age,
            user,
        }),
    )
        .into_response()
}
