//! Fixed-window rate limiting kept in process memory.
//!
//! Counters are per key (e.g. `user_id:ip` for uploads, the client IP for
//! logins). A window opens on the first hit and closes `window` later; the
//! counter resets with the next hit after that. Single-instance only.

use std::collections::HashMap;

use chrono::{Duration, Utc};
use tokio::sync::Mutex;

use crate::error::CoreError;
use crate::types::Timestamp;

/// Uploads: 10 per minute per `user_id:ip`.
pub const UPLOAD_MAX_PER_WINDOW: u32 = 10;
pub const UPLOAD_WINDOW_SECS: i64 = 60;

/// Logins: 5 attempts per minute per IP.
pub const LOGIN_MAX_PER_WINDOW: u32 = 5;
pub const LOGIN_WINDOW_SECS: i64 = 60;

/// Expired windows are swept once the map grows beyond this many keys.
pub const SWEEP_THRESHOLD: usize = 1000;

#[derive(Debug, Clone, Copy)]
struct Window {
    count: u32,
    reset_at: Timestamp,
}

#[derive(Debug)]
pub struct RateLimiter {
    max: u32,
    window: Duration,
    windows: Mutex<HashMap<String, Window>>,
}

impl RateLimiter {
    pub fn new(max: u32, window_secs: i64) -> Self {
        Self {
            max,
            window: Duration::seconds(window_secs),
            windows: Mutex::new(HashMap::new()),
        }
    }

    pub fn for_uploads() -> Self {
        Self::new(UPLOAD_MAX_PER_WINDOW, UPLOAD_WINDOW_SECS)
    }

    pub fn for_logins() -> Self {
        Self::new(LOGIN_MAX_PER_WINDOW, LOGIN_WINDOW_SECS)
    }

    /// Count one hit for `key`.
    pub async fn check(&self, key: &str) -> Result<(), CoreError> {
        self.check_at(key, Utc::now()).await
    }

    /// Count one hit for `key` at `now`, failing with
    /// [`CoreError::RateLimited`] once the window is full.
    pub async fn check_at(&self, key: &str, now: Timestamp) -> Result<(), CoreError> {
        let mut windows = self.windows.lock().await;

        if windows.len() > SWEEP_THRESHOLD {
            windows.retain(|_, w| w.reset_at > now);
        }

        match windows.get_mut(key) {
            Some(w) if w.reset_at > now => {
                if w.count >= self.max {
                    let retry_after_secs = (w.reset_at - now).num_seconds().max(1) as u64;
                    return Err(CoreError::RateLimited { retry_after_secs });
                }
                w.count += 1;
            }
            _ => {
                windows.insert(
                    key.to_string(),
                    Window {
                        count: 1,
                        reset_at: now + self.window,
                    },
                );
            }
        }
        Ok(())
    }

    #[cfg(test)]
    async fn tracked_keys(&self) -> usize {
        self.windows.lock().await.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[tokio::test]
    async fn allows_up_to_max_then_rejects() {
        let limiter = RateLimiter::new(3, 60);
        let now = Utc::now();
        for _ in 0..3 {
            assert!(limiter.check_at("k", now).await.is_ok());
        }
        assert_matches!(
            limiter.check_at("k", now).await,
            Err(CoreError::RateLimited { retry_after_secs: 60 })
        );
    }

    #[tokio::test]
    async fn keys_are_independent() {
        let limiter = RateLimiter::new(1, 60);
        let now = Utc::now();
        assert!(limiter.check_at("1:10.0.0.1", now).await.is_ok());
        assert!(limiter.check_at("1:10.0.0.2", now).await.is_ok());
        assert!(limiter.check_at("1:10.0.0.1", now).await.is_err());
    }

    #[tokio::test]
    async fn window_reopens_after_expiry() {
        let limiter = RateLimiter::for_logins();
        let now = Utc::now();
        for _ in 0..LOGIN_MAX_PER_WINDOW {
            limiter.check_at("ip", now).await.unwrap();
        }
        assert!(limiter.check_at("ip", now).await.is_err());
        let later = now + Duration::seconds(LOGIN_WINDOW_SECS);
        assert!(limiter.check_at("ip", later).await.is_ok());
    }

    #[tokio::test]
    async fn sweeps_expired_windows_past_threshold() {
        let limiter = RateLimiter::for_uploads();
        let start = Utc::now();
        for i in 0..=SWEEP_THRESHOLD {
            limiter.check_at(&format!("user-{i}"), start).await.unwrap();
        }
        assert_eq!(limiter.tracked_keys().await, SWEEP_THRESHOLD + 1);

        let later = start + Duration::seconds(UPLOAD_WINDOW_SECS + 1);
        limiter.check_at("fresh", later).await.unwrap();
        assert_eq!(limiter.tracked_keys().await, 1);
    }
}
