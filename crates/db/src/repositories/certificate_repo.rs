//! Repository for the `admin_certificates` table.

use sqlx::PgPool;
use tna_core::types::DbId;

use crate::models::certificate::{AdminCertificate, CreateCertificate};

/// Metadata columns only. Sealed blobs are written but never read back here.
const COLUMNS: &str = "id, user_id, certificate_hash, serial_number, issuer, valid_from, \
                        valid_until, is_active, created_by_id, created_at, updated_at";

pub struct CertificateRepo;

impl CertificateRepo {
    /// Store a certificate for a user, replacing any previous one.
    ///
    /// The stored certificate is always active afterwards.
    pub async fn upsert(
        pool: &PgPool,
        input: &CreateCertificate,
    ) -> Result<AdminCertificate, sqlx::Error> {
        let query = format!(
            "INSERT INTO admin_certificates
                (user_id, certificate_hash, serial_number, issuer, valid_from, valid_until,
                 sealed_file, sealed_password, created_by_id, is_active)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, true)
             ON CONFLICT ON CONSTRAINT uq_admin_certificates_user DO UPDATE SET
                certificate_hash = EXCLUDED.certificate_hash,
                serial_number = EXCLUDED.serial_number,
                issuer = EXCLUDED.issuer,
                valid_from = EXCLUDED.valid_from,
                valid_until = EXCLUDED.valid_until,
                sealed_file = EXCLUDED.sealed_file,
                sealed_password = EXCLUDED.sealed_password,
                created_by_id = EXCLUDED.created_by_id,
                is_active = true
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, AdminCertificate>(&query)
            .bind(input.user_id)
            .bind(&input.certificate_hash)
            .bind(&input.serial_number)
            .bind(&input.issuer)
            .bind(input.valid_from)
            .bind(input.valid_until)
            .bind(&input.sealed_file)
            .bind(&input.sealed_password)
            .bind(input.created_by_id)
            .fetch_one(pool)
            .await
    }

    /// All certificates, most recently updated first.
    pub async fn list(pool: &PgPool) -> Result<Vec<AdminCertificate>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM admin_certificates ORDER BY updated_at DESC");
        sqlx::query_as::<_, AdminCertificate>(&query)
            .fetch_all(pool)
            .await
    }

    /// Whether the user holds an active certificate that has not expired.
    pub async fn has_valid_for_user(pool: &PgPool, user_id: DbId) -> Result<bool, sqlx::Error> {
        sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(
                SELECT 1 FROM admin_certificates
                WHERE user_id = $1 AND is_active
                  AND valid_from <= NOW() AND valid_until > NOW()
             )",
        )
        .bind(user_id)
        .fetch_one(pool)
        .await
    }

    /// Mark a certificate inactive. Returns `None` if no active row matched.
    pub async fn deactivate(
        pool: &PgPool,
        id: DbId,
    ) -> Result<Option<AdminCertificate>, sqlx::Error> {
        let query = format!(
            "UPDATE admin_certificates SET is_active = false
             WHERE id = $1 AND is_active
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, AdminCertificate>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }
}
