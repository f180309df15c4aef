//! Repository for the `audit_logs` table.

use sqlx::PgPool;

use crate::models::audit::{AuditLog, AuditQuery, CreateAuditLog};

/// Column list for `audit_logs` SELECT queries.
const COLUMNS: &str = "id, actor_id, action, entity, entity_id, metadata, signature, created_at";

/// Default and maximum page sizes for listings.
const DEFAULT_LIMIT: i64 = 50;
const MAX_LIMIT: i64 = 500;

/// Provides insert and query operations for audit logs. Entries are never
/// updated or deleted through this repository.
pub struct AuditRepo;

impl AuditRepo {
    pub async fn insert(pool: &PgPool, input: &CreateAuditLog) -> Result<AuditLog, sqlx::Error> {
        let query = format!(
            "INSERT INTO audit_logs (actor_id, action, entity, entity_id, metadata, signature)
             VALUES ($1, $2, $3, $4, $5, $6)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, AuditLog>(&query)
            .bind(input.actor_id)
            .bind(&input.action)
            .bind(&input.entity)
            .bind(&input.entity_id)
            .bind(&input.metadata)
            .bind(&input.signature)
            .fetch_one(pool)
            .await
    }

    /// Query entries with optional filters, newest first.
    pub async fn query(pool: &PgPool, params: &AuditQuery) -> Result<Vec<AuditLog>, sqlx::Error> {
        let limit = params.limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT);
        let offset = params.offset.unwrap_or(0).max(0);

        let query = format!(
            "SELECT {COLUMNS} FROM audit_logs
             WHERE ($1::TEXT IS NULL OR entity = $1)
               AND ($2::TEXT IS NULL OR entity_id = $2)
               AND ($3::BIGINT IS NULL OR actor_id = $3)
               AND ($4::TEXT IS NULL OR action = $4)
             ORDER BY created_at DESC, id DESC
             LIMIT $5 OFFSET $6"
        );
        sqlx::query_as::<_, AuditLog>(&query)
            .bind(&params.entity)
            .bind(&params.entity_id)
            .bind(params.actor_id)
            .bind(&params.action)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await
    }

    /// Count entries matching the filters (for pagination metadata).
    pub async fn count(pool: &PgPool, params: &AuditQuery) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*)::BIGINT FROM audit_logs
             WHERE ($1::TEXT IS NULL OR entity = $1)
               AND ($2::TEXT IS NULL OR entity_id = $2)
               AND ($3::BIGINT IS NULL OR actor_id = $3)
               AND ($4::TEXT IS NULL OR action = $4)",
        )
        .bind(&params.entity)
        .bind(&params.entity_id)
        .bind(params.actor_id)
        .bind(&params.action)
        .fetch_one(pool)
        .await
    }
}
