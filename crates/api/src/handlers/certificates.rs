//! Admin signing certificates (ICP-Brasil A1), managed by SUPERADMIN.
//!
//! The uploaded `.pfx`/`.p12` is not parsed: its SHA-256 identifies it and
//! the metadata comes from the form. File and password are sealed with
//! AES-256-GCM when an encryption key is configured.

use axum::extract::{Multipart, Path, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::{DateTime, NaiveDate, Utc};
use tna_core::audit::{actions, entities};
use tna_core::hashing::sha256_hex;
use tna_core::types::{DbId, Timestamp};
use tna_db::models::certificate::{AdminCertificate, CreateCertificate};
use tna_db::repositories::CertificateRepo;

use super::load_user;
use crate::error::{AppError, AppResult};
use crate::middleware::rbac::RequireSuperAdmin;
use crate::response::DataResponse;
use crate::state::AppState;

const ALLOWED_EXTENSIONS: &[&str] = &["pfx", "p12"];

#[derive(Debug, Default)]
struct CertificateForm {
    file: Option<(String, Vec<u8>)>,
    password: Option<String>,
    serial_number: Option<String>,
    issuer: Option<String>,
    valid_from: Option<String>,
    valid_until: Option<String>,
    user_id: Option<String>,
}

/// POST /api/v1/super-admin/certificates
///
/// Multipart form: `file`, `password`, `serial_number`, `issuer`,
/// `valid_from`, `valid_until` and optionally `user_id` (defaults to the
/// caller). Replaces the user's previous certificate.
pub async fn upload_certificate(
    RequireSuperAdmin(admin): RequireSuperAdmin,
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> AppResult<(StatusCode, Json<DataResponse<AdminCertificate>>)> {
    let mut form = CertificateForm::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(e.to_string()))?
    {
        let name = field.name().unwrap_or("").to_string();
        if name == "file" {
            let filename = field.file_name().unwrap_or("").to_string();
            let data = field
                .bytes()
                .await
                .map_err(|e| AppError::BadRequest(e.to_string()))?;
            form.file = Some((filename, data.to_vec()));
            continue;
        }

        let text = field
            .text()
            .await
            .map_err(|e| AppError::BadRequest(e.to_string()))?;
        let slot = match name.as_str() {
            "password" => &mut form.password,
            "serial_number" => &mut form.serial_number,
            "issuer" => &mut form.issuer,
            "valid_from" => &mut form.valid_from,
            "valid_until" => &mut form.valid_until,
            "user_id" => &mut form.user_id,
            _ => continue,
        };
        *slot = Some(text);
    }

    let (filename, data) = form
        .file
        .ok_or_else(|| AppError::validation("Certificate file is required"))?;
    if !has_allowed_extension(&filename) {
        return Err(AppError::validation("Certificate must be a .pfx or .p12 file"));
    }
    if data.is_empty() {
        return Err(AppError::validation("Certificate file is empty"));
    }

    let serial_number = required(form.serial_number, "serial_number")?;
    let issuer = required(form.issuer, "issuer")?;
    let valid_from = parse_instant(&required(form.valid_from, "valid_from")?)?;
    let valid_until = parse_instant(&required(form.valid_until, "valid_until")?)?;
    if valid_until <= valid_from {
        return Err(AppError::validation("valid_until must be after valid_from"));
    }

    let user_id = match form.user_id.as_deref().map(str::trim).filter(|v| !v.is_empty()) {
        Some(raw) => raw
            .parse::<DbId>()
            .map_err(|_| AppError::validation("user_id must be a number"))?,
        None => admin.user_id,
    };
    load_user(&state.pool, user_id).await?;

    let certificate_hash = sha256_hex(&data);
    let (sealed_file, sealed_password) = match &state.sealing_key {
        Some(key) => {
            let seal = |bytes: &[u8]| {
                key.seal(bytes)
                    .map_err(|e| AppError::InternalError(format!("Certificate sealing failed: {e}")))
            };
            let sealed_password = form
                .password
                .as_deref()
                .map(|p| seal(p.as_bytes()))
                .transpose()?;
            (Some(seal(&data)?), sealed_password)
        }
        None => {
            tracing::warn!(
                user_id,
                "CERTIFICATE_ENCRYPTION_KEY not set, storing certificate metadata only"
            );
            (None, None)
        }
    };

    let certificate = CertificateRepo::upsert(
        &state.pool,
        &CreateCertificate {
            user_id,
            certificate_hash,
            serial_number,
            issuer,
            valid_from,
            valid_until,
            sealed_file,
            sealed_password,
            created_by_id: admin.user_id,
        },
    )
    .await?;

    state
        .audit
        .log_action(
            Some(admin.user_id),
            actions::CERTIFICATE_UPLOAD,
            entities::CERTIFICATE,
            certificate.id,
            Some(serde_json::json!({
                "user_id": user_id,
                "serial_number": certificate.serial_number,
                "valid_until": certificate.valid_until,
            })),
        )
        .await?;

    tracing::info!(certificate_id = certificate.id, user_id, "Certificate stored");
    Ok((StatusCode::CREATED, Json(DataResponse { data: certificate })))
}

/// GET /api/v1/super-admin/certificates
pub async fn list_certificates(
    RequireSuperAdmin(_admin): RequireSuperAdmin,
    State(state): State<AppState>,
) -> AppResult<Json<DataResponse<Vec<AdminCertificate>>>> {
    let certificates = CertificateRepo::list(&state.pool).await?;
    Ok(Json(DataResponse { data: certificates }))
}

/// DELETE /api/v1/super-admin/certificates/{id}
pub async fn revoke_certificate(
    RequireSuperAdmin(admin): RequireSuperAdmin,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    let certificate = CertificateRepo::deactivate(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::not_found("AdminCertificate", id))?;

    state
        .audit
        .log_action(
            Some(admin.user_id),
            actions::CERTIFICATE_REVOKE,
            entities::CERTIFICATE,
            id,
            Some(serde_json::json!({ "user_id": certificate.user_id })),
        )
        .await?;

    Ok(StatusCode::NO_CONTENT)
}

fn has_allowed_extension(filename: &str) -> bool {
    filename
        .rsplit_once('.')
        .is_some_and(|(_, ext)| ALLOWED_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()))
}

fn required(value: Option<String>, name: &str) -> AppResult<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .ok_or_else(|| AppError::validation(format!("{name} is required")))
}

/// RFC 3339 instant, or a bare `YYYY-MM-DD` taken as midnight UTC.
fn parse_instant(raw: &str) -> AppResult<Timestamp> {
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Ok(ts.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|dt| dt.and_utc())
        .ok_or_else(|| AppError::validation(format!("Invalid date '{raw}'")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_pkcs12_files_are_accepted() {
        assert!(has_allowed_extension("admin.pfx"));
        assert!(has_allowed_extension("ADMIN.P12"));
        assert!(!has_allowed_extension("admin.pem"));
        assert!(!has_allowed_extension("pfx"));
    }

    #[test]
    fn instants_accept_dates_and_rfc3339() {
        let day = parse_instant("2026-01-31").unwrap();
        assert_eq!(day.to_rfc3339(), "2026-01-31T00:00:00+00:00");
        let exact = parse_instant("2026-01-31T12:30:00-03:00").unwrap();
        assert_eq!(exact.to_rfc3339(), "2026-01-31T15:30:00+00:00");
        assert!(parse_instant("31/01/2026").is_err());
    }
}
