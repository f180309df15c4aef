//! Ephemeral tokens for short-lived secure URLs.
//!
//! A token is 32 random bytes in hex, bound to one user and one resource,
//! and valid for five minutes. Tokens live only in process memory: they do
//! not survive a restart and are not shared between instances.

use std::collections::HashMap;

use chrono::{Duration, Utc};
use rand::RngCore;
use tokio::sync::RwLock;

use crate::hashing::hex_encode;
use crate::types::{DbId, Timestamp};

/// Lifetime of an ephemeral token.
pub const TOKEN_TTL_SECS: i64 = 300;

/// Interval between background sweeps of expired tokens.
pub const SWEEP_INTERVAL_SECS: u64 = 30;

const TOKEN_BYTES: usize = 32;

/// Resource kinds reachable through a secure URL.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SecureResource {
    Gallery,
    Photo,
}

impl SecureResource {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "gallery" => Some(Self::Gallery),
            "photo" => Some(Self::Photo),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Gallery => "gallery",
            Self::Photo => "photo",
        }
    }
}

#[derive(Debug, Clone)]
struct TokenData {
    user_id: DbId,
    resource: SecureResource,
    resource_id: DbId,
    expires_at: Timestamp,
}

/// Why a token was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenRejection {
    Unknown,
    Expired,
    WrongUser,
    WrongResource,
}

/// An issued token and its expiry.
#[derive(Debug, Clone)]
pub struct IssuedToken {
    pub token: String,
    pub expires_at: Timestamp,
}

#[derive(Debug, Default)]
pub struct EphemeralTokenStore {
    tokens: RwLock<HashMap<String, TokenData>>,
}

impl EphemeralTokenStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn issue(
        &self,
        user_id: DbId,
        resource: SecureResource,
        resource_id: DbId,
    ) -> IssuedToken {
        self.issue_at(user_id, resource, resource_id, Utc::now()).await
    }

    pub async fn issue_at(
        &self,
        user_id: DbId,
        resource: SecureResource,
        resource_id: DbId,
        now: Timestamp,
    ) -> IssuedToken {
        let expires_at = now + Duration::seconds(TOKEN_TTL_SECS);
        let mut tokens = self.tokens.write().await;

        // 256 random bits; the loop only guards the theoretical collision.
        let token = loop {
            let candidate = random_token();
            if !tokens.contains_key(&candidate) {
                break candidate;
            }
        };

        tokens.insert(
            token.clone(),
            TokenData {
                user_id,
                resource,
                resource_id,
                expires_at,
            },
        );
        IssuedToken { token, expires_at }
    }

    pub async fn validate(
        &self,
        token: &str,
        user_id: DbId,
        resource: SecureResource,
        resource_id: DbId,
    ) -> Result<(), TokenRejection> {
        self.validate_at(token, user_id, resource, resource_id, Utc::now())
            .await
    }

    /// Expiry is checked before ownership; expired tokens are removed.
    pub async fn validate_at(
        &self,
        token: &str,
        user_id: DbId,
        resource: SecureResource,
        resource_id: DbId,
        now: Timestamp,
    ) -> Result<(), TokenRejection> {
        let mut tokens = self.tokens.write().await;
        let data = tokens.get(token).cloned().ok_or(TokenRejection::Unknown)?;

        if data.expires_at < now {
            tokens.remove(token);
            return Err(TokenRejection::Expired);
        }
        if data.user_id != user_id {
            return Err(TokenRejection::WrongUser);
        }
        if data.resource != resource || data.resource_id != resource_id {
            return Err(TokenRejection::WrongResource);
        }
        Ok(())
    }

    pub async fn revoke(&self, token: &str) -> bool {
        self.tokens.write().await.remove(token).is_some()
    }

    /// Remove every token of one user. Returns how many were removed.
    pub async fn revoke_all_for_user(&self, user_id: DbId) -> usize {
        let mut tokens = self.tokens.write().await;
        let before = tokens.len();
        tokens.retain(|_, data| data.user_id != user_id);
        before - tokens.len()
    }

    pub async fn sweep(&self) -> usize {
        self.sweep_at(Utc::now()).await
    }

    /// Drop expired tokens. Returns how many were removed.
    pub async fn sweep_at(&self, now: Timestamp) -> usize {
        let mut tokens = self.tokens.write().await;
        let before = tokens.len();
        tokens.retain(|_, data| data.expires_at >= now);
        before - tokens.len()
    }

    pub async fn len(&self) -> usize {
        self.tokens.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.tokens.read().await.is_empty()
    }
}

fn random_token() -> String {
    let mut bytes = [0u8; TOKEN_BYTES];
    rand::rng().fill_bytes(&mut bytes);
    hex_encode(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[tokio::test]
    async fn issued_token_is_64_hex_chars() {
        let store = EphemeralTokenStore::new();
        let issued = store.issue(1, SecureResource::Gallery, 10).await;
        assert_eq!(issued.token.len(), 64);
        assert!(issued.token.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[tokio::test]
    async fn valid_for_owner_and_resource() {
        let store = EphemeralTokenStore::new();
        let issued = store.issue(1, SecureResource::Photo, 5).await;
        assert!(store
            .validate(&issued.token, 1, SecureResource::Photo, 5)
            .await
            .is_ok());
        // Reusable until expiry.
        assert!(store
            .validate(&issued.token, 1, SecureResource::Photo, 5)
            .await
            .is_ok());
    }

    #[tokio::test]
    async fn rejects_other_user_and_resource() {
        let store = EphemeralTokenStore::new();
        let issued = store.issue(1, SecureResource::Photo, 5).await;
        assert_matches!(
            store.validate(&issued.token, 2, SecureResource::Photo, 5).await,
            Err(TokenRejection::WrongUser)
        );
        assert_matches!(
            store.validate(&issued.token, 1, SecureResource::Gallery, 5).await,
            Err(TokenRejection::WrongResource)
        );
        assert_matches!(
            store.validate(&issued.token, 1, SecureResource::Photo, 6).await,
            Err(TokenRejection::WrongResource)
        );
    }

    #[tokio::test]
    async fn expired_token_is_removed_before_owner_check() {
        let store = EphemeralTokenStore::new();
        let now = Utc::now();
        let issued = store.issue_at(1, SecureResource::Gallery, 3, now).await;
        let later = now + Duration::seconds(TOKEN_TTL_SECS + 1);

        assert_matches!(
            store
                .validate_at(&issued.token, 99, SecureResource::Gallery, 3, later)
                .await,
            Err(TokenRejection::Expired)
        );
        assert!(store.is_empty().await);
        assert_matches!(
            store.validate(&issued.token, 1, SecureResource::Gallery, 3).await,
            Err(TokenRejection::Unknown)
        );
    }

    #[tokio::test]
    async fn revoke_all_only_touches_one_user() {
        let store = EphemeralTokenStore::new();
        store.issue(1, SecureResource::Gallery, 1).await;
        store.issue(1, SecureResource::Photo, 2).await;
        let other = store.issue(2, SecureResource::Photo, 3).await;

        assert_eq!(store.revoke_all_for_user(1).await, 2);
        assert_eq!(store.len().await, 1);
        assert!(store.revoke(&other.token).await);
        assert!(!store.revoke(&other.token).await);
    }

    #[tokio::test]
    async fn sweep_drops_only_expired() {
        let store = EphemeralTokenStore::new();
        let now = Utc::now();
        store.issue_at(1, SecureResource::Gallery, 1, now - Duration::minutes(10)).await;
        store.issue_at(1, SecureResource::Gallery, 2, now).await;
        assert_eq!(store.sweep_at(now).await, 1);
        assert_eq!(store.len().await, 1);
    }

    #[test]
    fn resource_types() {
        assert_eq!(SecureResource::parse("gallery"), Some(SecureResource::Gallery));
        assert_eq!(SecureResource::parse("photo"), Some(SecureResource::Photo));
        assert_eq!(SecureResource::parse("video"), None);
    }
}
