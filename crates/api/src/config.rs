use tna_storage::{S3Config, DEFAULT_BUCKET};

use crate::auth::jwt::JwtConfig;

/// Default AwesomeAPI endpoint for the EUR to BRL quote.
pub const DEFAULT_FX_RATE_URL: &str = "https://economia.awesomeapi.com.br/last/EUR-BRL";

/// Deployment environment, from `APP_ENV`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnv {
    Development,
    Production,
}

impl AppEnv {
    /// `production` (any case) selects production; anything else is development.
    pub fn parse(value: &str) -> Self {
        if value.trim().eq_ignore_ascii_case("production") {
            AppEnv::Production
        } else {
            AppEnv::Development
        }
    }

    pub fn is_production(self) -> bool {
        self == AppEnv::Production
    }
}

/// Server configuration loaded from environment variables.
///
/// All fields have sensible defaults suitable for local development.
/// In production, override via environment variables.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `3000`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS` env var.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    /// How long background jobs get to stop after the server drains.
    pub shutdown_timeout_secs: u64,
    pub app_env: AppEnv,
    /// Origin used to build absolute links such as secure URLs.
    pub public_base_url: String,
    /// JWT secret and session lifetime.
    pub jwt: JwtConfig,
    /// Reject session tokens issued before this process started.
    pub reject_tokens_from_previous_build: bool,
    /// Writers must hold a valid A1 certificate.
    pub require_a1_certificate: bool,
    /// 64 hex chars; enables at-rest encryption of uploaded certificates.
    pub certificate_encryption_key: Option<String>,
    /// Bucket settings. `None` selects the in-memory store.
    pub storage: Option<S3Config>,
    /// Bucket name, also used by the in-memory store's URLs.
    pub bucket: String,
    pub fx_rate_url: String,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                             | Default                    |
    /// |-------------------------------------|----------------------------|
    /// | `HOST`                              | `0.0.0.0`                  |
    /// | `PORT`                              | `3000`                     |
    /// | `CORS_ORIGINS`                      | `http://localhost:3000`    |
    /// | `REQUEST_TIMEOUT_SECS`              | `30`                       |
    /// | `SHUTDOWN_TIMEOUT_SECS`             | `30`                       |
    /// | `APP_ENV`                           | `development`              |
    /// | `PUBLIC_BASE_URL`                   | `http://localhost:3000`    |
    /// | `REJECT_TOKENS_FROM_PREVIOUS_BUILD` | `false`                    |
    /// | `REQUIRE_A1_CERTIFICATE`            | `false`                    |
    /// | `CERTIFICATE_ENCRYPTION_KEY`        | unset                      |
    /// | `R2_ACCOUNT_ID`, `R2_ACCESS_KEY_ID`, `R2_SECRET_ACCESS_KEY` | unset (in-memory store) |
    /// | `R2_BUCKET`                         | `tna-studio-media`         |
    /// | `R2_ENDPOINT`                       | derived from account id    |
    /// | `FX_RATE_URL`                       | AwesomeAPI `EUR-BRL`       |
    ///
    /// JWT settings are documented on [`JwtConfig::from_env`].
    pub fn from_env() -> Self {
        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into());

        let port: u16 = std::env::var("PORT")
            .unwrap_or_else(|_| "3000".into())
            .parse()
            .expect("PORT must be a valid u16");

        let cors_origins: Vec<String> = std::env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| "http://localhost:3000".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let request_timeout_secs: u64 = std::env::var("REQUEST_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".into())
            .parse()
            .expect("REQUEST_TIMEOUT_SECS must be a valid u64");

        let shutdown_timeout_secs: u64 = std::env::var("SHUTDOWN_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".into())
            .parse()
            .expect("SHUTDOWN_TIMEOUT_SECS must be a valid u64");

        let app_env = AppEnv::parse(&std::env::var("APP_ENV").unwrap_or_default());

        let public_base_url = std::env::var("PUBLIC_BASE_URL")
            .unwrap_or_else(|_| "http://localhost:3000".into())
            .trim_end_matches('/')
            .to_string();

        let certificate_encryption_key = std::env::var("CERTIFICATE_ENCRYPTION_KEY")
            .ok()
            .filter(|k| !k.trim().is_empty());

        let bucket = std::env::var("R2_BUCKET").unwrap_or_else(|_| DEFAULT_BUCKET.into());
        let storage = storage_from_env(&bucket);

        let fx_rate_url =
            std::env::var("FX_RATE_URL").unwrap_or_else(|_| DEFAULT_FX_RATE_URL.into());

        Self {
            host,
            port,
            cors_origins,
            request_timeout_secs,
            shutdown_timeout_secs,
            app_env,
            public_base_url,
            jwt: JwtConfig::from_env(),
            reject_tokens_from_previous_build: env_flag("REJECT_TOKENS_FROM_PREVIOUS_BUILD"),
            require_a1_certificate: env_flag("REQUIRE_A1_CERTIFICATE"),
            certificate_encryption_key,
            storage,
            bucket,
            fx_rate_url,
        }
    }
}

/// `true`, `1`, or `yes` (any case) turn a flag on.
fn env_flag(name: &str) -> bool {
    std::env::var(name)
        .map(|v| parse_flag(&v))
        .unwrap_or(false)
}

fn parse_flag(value: &str) -> bool {
    matches!(value.trim().to_ascii_lowercase().as_str(), "true" | "1" | "yes")
}

/// Bucket settings when all three R2 credentials are present.
fn storage_from_env(bucket: &str) -> Option<S3Config> {
    let account_id = std::env::var("R2_ACCOUNT_ID").ok().filter(|v| !v.is_empty())?;
    let access_key_id = std::env::var("R2_ACCESS_KEY_ID").ok().filter(|v| !v.is_empty())?;
    let secret_access_key = std::env::var("R2_SECRET_ACCESS_KEY")
        .ok()
        .filter(|v| !v.is_empty())?;
    Some(S3Config {
        account_id,
        access_key_id,
        secret_access_key,
        bucket: bucket.to_string(),
        endpoint: std::env::var("R2_ENDPOINT").ok().filter(|v| !v.is_empty()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn app_env_defaults_to_development() {
        assert_eq!(AppEnv::parse(""), AppEnv::Development);
        assert_eq!(AppEnv::parse("staging"), AppEnv::Development);
        assert!(AppEnv::parse(" Production ").is_production());
    }

    #[test]
    fn flags_accept_common_spellings() {
        assert!(parse_flag("true"));
        assert!(parse_flag("TRUE"));
        assert!(parse_flag("1"));
        assert!(parse_flag("yes"));
        assert!(!parse_flag("false"));
        assert!(!parse_flag(""));
    }
}
