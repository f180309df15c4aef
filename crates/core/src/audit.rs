//! Audit log constants and metadata sanitizing.
//!
//! Every state change made through the API is recorded in `audit_logs`. The
//! metadata attached to an entry is user-controlled JSON, so it is stripped
//! of personal data and capped in size before storage.

use crate::hashing;

// ---------------------------------------------------------------------------
// Action constants
// ---------------------------------------------------------------------------

/// Known action types for audit log entries.
pub mod actions {
    pub const LOGIN: &str = "LOGIN";
    pub const LOGOUT: &str = "LOGOUT";
    pub const CREATE: &str = "CREATE";
    pub const UPDATE: &str = "UPDATE";
    pub const DELETE_LOGICAL: &str = "DELETE_LOGICAL";
    pub const DELETE_PERMANENT: &str = "DELETE_PERMANENT";
    pub const RESTORE: &str = "RESTORE";
    pub const CLEANUP_DELETED_ENSAIOS: &str = "CLEANUP_DELETED_ENSAIOS";
    pub const UPLOAD: &str = "UPLOAD";
    pub const APPROVE_CHANGE_REQUEST: &str = "APPROVE_CHANGE_REQUEST";
    pub const REJECT_CHANGE_REQUEST: &str = "REJECT_CHANGE_REQUEST";
    pub const STATUS_CHANGE: &str = "STATUS_CHANGE";
    pub const CERTIFICATE_UPLOAD: &str = "CERTIFICATE_UPLOAD";
    pub const CERTIFICATE_REVOKE: &str = "CERTIFICATE_REVOKE";
}

/// Entity names used in `audit_logs.entity`.
pub mod entities {
    pub const USER: &str = "User";
    pub const ENSAIO: &str = "Ensaio";
    pub const ENSAIO_PHOTO: &str = "EnsaioPhoto";
    pub const PRODUTO: &str = "Produto";
    pub const PROJETO: &str = "Projeto";
    pub const INTENCAO: &str = "IntencaoCompra";
    pub const CHANGE_REQUEST: &str = "ChangeRequest";
    pub const CERTIFICATE: &str = "AdminCertificate";
}

// ---------------------------------------------------------------------------
// Sanitizing
// ---------------------------------------------------------------------------

/// Keys whose values never reach the audit table. Compared case-insensitively.
pub const SENSITIVE_FIELDS: &[&str] = &[
    "password",
    "passwordhash",
    "password_hash",
    "token",
    "secret",
    "apikey",
    "api_key",
    "certificate",
    "privatekey",
    "private_key",
    "cpf",
    "passport",
    "phone",
    "email",
];

/// Serialized metadata above this many bytes is replaced by a size marker.
pub const MAX_METADATA_BYTES: usize = 10_000;

const REDACTED: &str = "[REDACTED]";

/// Redact sensitive keys at any depth and cap the serialized size.
pub fn sanitize_metadata(value: &serde_json::Value) -> serde_json::Value {
    let redacted = redact(value);
    let size = serde_json::to_string(&redacted).map(|s| s.len()).unwrap_or(0);
    if size > MAX_METADATA_BYTES {
        return serde_json::json!({
            "_truncated": true,
            "_originalSize": size,
        });
    }
    redacted
}

fn redact(value: &serde_json::Value) -> serde_json::Value {
    match value {
        serde_json::Value::Object(map) => {
            let mut out = serde_json::Map::with_capacity(map.len());
            for (key, val) in map {
                let lower = key.to_lowercase();
                if SENSITIVE_FIELDS.contains(&lower.as_str()) {
                    out.insert(key.clone(), serde_json::Value::String(REDACTED.into()));
                } else {
                    out.insert(key.clone(), redact(val));
                }
            }
            serde_json::Value::Object(out)
        }
        serde_json::Value::Array(items) => {
            serde_json::Value::Array(items.iter().map(redact).collect())
        }
        other => other.clone(),
    }
}

// ---------------------------------------------------------------------------
// Entry signature
// ---------------------------------------------------------------------------

/// HMAC over the canonical form of an entry, stored alongside it so that
/// edits made directly in the database are detectable.
pub fn sign_entry(
    secret: &[u8],
    actor_id: Option<i64>,
    action: &str,
    entity: &str,
    entity_id: &str,
    metadata: &serde_json::Value,
) -> String {
    let actor = actor_id.map(|id| id.to_string()).unwrap_or_default();
    let canonical = format!("{actor}|{action}|{entity}|{entity_id}|{metadata}");
    hashing::hmac_sha256_hex(secret, canonical.as_bytes())
}
