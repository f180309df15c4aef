//! Persisting audit entries.
//!
//! Metadata is sanitized before it is stored and every row carries an HMAC
//! signature. In production a failed insert fails the request; in
//! development it is only logged.

use serde_json::Value;
use sqlx::PgPool;
use tna_core::audit::{sanitize_metadata, sign_entry};
use tna_core::types::DbId;
use tna_db::models::audit::CreateAuditLog;
use tna_db::repositories::AuditRepo;

use crate::error::{AppError, AppResult};

pub struct AuditLogger {
    pool: PgPool,
    secret: Vec<u8>,
    fail_closed: bool,
}

impl AuditLogger {
    pub fn new(pool: PgPool, secret: Vec<u8>, fail_closed: bool) -> Self {
        Self {
            pool,
            secret,
            fail_closed,
        }
    }

    /// Record that `actor_id` performed `action` on `entity`/`entity_id`.
    pub async fn log_action(
        &self,
        actor_id: Option<DbId>,
        action: &str,
        entity: &str,
        entity_id: impl ToString,
        metadata: Option<Value>,
    ) -> AppResult<()> {
        let entity_id = entity_id.to_string();
        let metadata = metadata.map(|m| sanitize_metadata(&m));
        let signature = sign_entry(
            &self.secret,
            actor_id,
            action,
            entity,
            &entity_id,
            metadata.as_ref().unwrap_or(&Value::Null),
        );

        let entry = CreateAuditLog {
            actor_id,
            action: action.to_string(),
            entity: entity.to_string(),
            entity_id,
            metadata,
            signature,
        };

        match AuditRepo::insert(&self.pool, &entry).await {
            Ok(_) => Ok(()),
            Err(e) if self.fail_closed => {
                tracing::error!(error = %e, action, entity, "Audit write failed");
                Err(AppError::InternalError(format!("audit write failed: {e}")))
            }
            Err(e) => {
                tracing::warn!(error = %e, action, entity, "Audit write failed, continuing");
                Ok(())
            }
        }
    }
}
