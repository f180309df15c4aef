//! Live EUR to BRL quote with an hour-long cache and a fixed fallback.

use std::time::Duration;

use chrono::Utc;
use serde::Serialize;
use tna_core::currency::{parse_rate, CachedRate, FALLBACK_EUR_BRL_RATE};
use tokio::sync::RwLock;

/// HTTP timeout for the quote request.
const FETCH_TIMEOUT: Duration = Duration::from_secs(5);

/// Where a quoted rate came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RateSource {
    Live,
    Cache,
    Fallback,
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct RateQuote {
    pub rate: f64,
    pub source: RateSource,
}

pub struct FxRateProvider {
    client: reqwest::Client,
    url: String,
    cache: RwLock<Option<CachedRate>>,
}

impl FxRateProvider {
    pub fn new(url: String) -> Self {
        let client = reqwest::Client::builder()
            .timeout(FETCH_TIMEOUT)
            .build()
            .unwrap_or_default();
        Self {
            client,
            url,
            cache: RwLock::new(None),
        }
    }

    /// The current rate. Never fails: any fetch error yields the fallback.
    pub async fn current_rate(&self) -> RateQuote {
        let now = Utc::now();
        if let Some(cached) = *self.cache.read().await {
            if cached.is_fresh(now) {
                return RateQuote {
                    rate: cached.rate,
                    source: RateSource::Cache,
                };
            }
        }

        match self.fetch().await {
            Ok(rate) => {
                *self.cache.write().await = Some(CachedRate {
                    rate,
                    fetched_at: now,
                });
                tracing::debug!(rate, "Fetched EUR-BRL rate");
                RateQuote {
                    rate,
                    source: RateSource::Live,
                }
            }
            Err(e) => {
                tracing::warn!(error = %e, fallback = FALLBACK_EUR_BRL_RATE, "FX rate unavailable");
                RateQuote {
                    rate: FALLBACK_EUR_BRL_RATE,
                    source: RateSource::Fallback,
                }
            }
        }
    }

    async fn fetch(&self) -> Result<f64, String> {
        let body: serde_json::Value = self
            .client
            .get(&self.url)
            .send()
            .await
            .and_then(reqwest::Response::error_for_status)
            .map_err(|e| e.to_string())?
            .json()
            .await
            .map_err(|e| e.to_string())?;
        parse_rate(&body).ok_or_else(|| "response carried no usable rate".to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn fresh_cache_skips_network() {
        let provider = FxRateProvider::new("http://127.0.0.1:9/last/EUR-BRL".to_string());
        *provider.cache.write().await = Some(CachedRate {
            rate: 6.1,
            fetched_at: Utc::now(),
        });
        let quote = provider.current_rate().await;
        assert_eq!(quote.rate, 6.1);
        assert_eq!(quote.source, RateSource::Cache);
    }

    #[tokio::test]
    async fn unreachable_endpoint_falls_back() {
        let provider = FxRateProvider::new("http://127.0.0.1:9/last/EUR-BRL".to_string());
        let quote = provider.current_rate().await;
        assert_eq!(quote.rate, FALLBACK_EUR_BRL_RATE);
        assert_eq!(quote.source, RateSource::Fallback);
    }
}
