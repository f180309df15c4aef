use std::sync::Arc;

use chrono::Utc;
use tna_core::build_version::BuildInfo;
use tna_core::crypto::{CryptoError, SealingKey};
use tna_core::rate_limit::RateLimiter;
use tna_core::session_tokens::EphemeralTokenStore;
use tna_storage::{MemoryStore, ObjectStore, S3Store, StorageError};

use crate::audit::AuditLogger;
use crate::config::ServerConfig;
use crate::fx::FxRateProvider;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc` or is already `Clone`).
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub pool: tna_db::DbPool,
    pub config: Arc<ServerConfig>,
    /// Object storage (R2 or in-memory).
    pub storage: Arc<dyn ObjectStore>,
    /// Short-lived tokens behind `/secure/...` links.
    pub secure_tokens: Arc<EphemeralTokenStore>,
    /// 10 uploads per minute per `user_id:ip`.
    pub upload_limiter: Arc<RateLimiter>,
    /// 5 login attempts per minute per IP.
    pub login_limiter: Arc<RateLimiter>,
    pub fx: Arc<FxRateProvider>,
    pub audit: Arc<AuditLogger>,
    /// Process start stamp, compared with token `iat`.
    pub build: Arc<BuildInfo>,
    /// Present when `CERTIFICATE_ENCRYPTION_KEY` is configured.
    pub sealing_key: Option<Arc<SealingKey>>,
}

impl AppState {
    /// Assemble the state with fresh in-memory stores.
    ///
    /// Fails only when the configured certificate key is malformed.
    pub fn new(
        pool: tna_db::DbPool,
        config: ServerConfig,
        storage: Arc<dyn ObjectStore>,
    ) -> Result<Self, CryptoError> {
        let sealing_key = config
            .certificate_encryption_key
            .as_deref()
            .map(SealingKey::from_hex)
            .transpose()?
            .map(Arc::new);

        let audit = AuditLogger::new(
            pool.clone(),
            config.jwt.secret.as_bytes().to_vec(),
            config.app_env.is_production(),
        );
        let fx = FxRateProvider::new(config.fx_rate_url.clone());
        let version = option_env!("TNA_BUILD_VERSION").map(str::to_string);

        Ok(Self {
            pool,
            storage,
            secure_tokens: Arc::new(EphemeralTokenStore::new()),
            upload_limiter: Arc::new(RateLimiter::for_uploads()),
            login_limiter: Arc::new(RateLimiter::for_logins()),
            fx: Arc::new(fx),
            audit: Arc::new(audit),
            build: Arc::new(BuildInfo::new(Utc::now(), version)),
            sealing_key,
            config: Arc::new(config),
        })
    }
}

/// The object store selected by the configuration.
///
/// Without R2 credentials the in-memory store is used, which is only suitable
/// for local development.
pub async fn build_storage(config: &ServerConfig) -> Result<Arc<dyn ObjectStore>, StorageError> {
    match &config.storage {
        Some(s3) => {
            let store = S3Store::connect(s3).await?;
            tracing::info!(bucket = %s3.bucket, "Using R2 object storage");
            Ok(Arc::new(store))
        }
        None => {
            tracing::warn!("R2 credentials missing, using in-memory object storage");
            Ok(Arc::new(MemoryStore::new(config.bucket.clone())))
        }
    }
}
