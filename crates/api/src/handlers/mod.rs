pub mod audit;
pub mod auth;
pub mod certificates;
pub mod currency;
pub mod ensaios;
pub mod intencoes;
pub mod media;
pub mod modelo;
pub mod produtos;
pub mod profile;
pub mod projetos;
pub mod secure_urls;
pub mod solicitacoes;
pub mod users;

mod upload;

use axum::http::header::CACHE_CONTROL;
use axum::http::HeaderMap;
use axum::response::{AppendHeaders, IntoResponse, Response};
use axum::Json;
use chrono::{NaiveDate, Utc};
use serde::Serialize;
use sqlx::PgPool;
use tna_core::types::DbId;
use tna_core::validation::{parse_birth_date, validate_birth_date_18_plus};
use tna_db::models::user::User;
use tna_db::repositories::UserRepo;

use crate::error::{AppError, AppResult};
use crate::response::DataResponse;

/// Best-effort client address for rate limiting.
///
/// Takes the first `X-Forwarded-For` hop, then `X-Real-IP`.
pub(crate) fn client_ip(headers: &HeaderMap) -> String {
    headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .or_else(|| headers.get("x-real-ip").and_then(|v| v.to_str().ok()))
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .unwrap_or("unknown")
        .to_string()
}

/// JSON body that browsers and proxies must not cache, for signed URLs.
pub(crate) fn no_store<T: Serialize>(data: T) -> Response {
    (
        AppendHeaders([(CACHE_CONTROL, "no-store, private")]),
        Json(DataResponse { data }),
    )
        .into_response()
}

/// Load a user or fail with 404.
pub(crate) async fn load_user(pool: &PgPool, id: DbId) -> AppResult<User> {
    UserRepo::find_by_id(pool, id)
        .await?
        .ok_or_else(|| AppError::not_found("User", id))
}

/// Trim a field and drop it when empty.
pub(crate) fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Parse a birth date and require an adult.
pub(crate) fn parse_adult_birth_date(raw: &str) -> AppResult<NaiveDate> {
    let birth = parse_birth_date(raw).map_err(AppError::validation)?;
    validate_birth_date_18_plus(birth, Utc::now().date_naive()).map_err(AppError::validation)?;
    Ok(birth)
}
