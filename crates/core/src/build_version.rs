//! Process build stamp.
//!
//! Each server start records its own timestamp. Session tokens issued before
//! it come from a previous build and may be rejected so that a deploy logs
//! everyone out.

use crate::types::Timestamp;

#[derive(Debug, Clone)]
pub struct BuildInfo {
    pub started_at: Timestamp,
    pub version: String,
}

impl BuildInfo {
    /// Stamp the current process. `version` defaults to `build-{unix ms}`.
    pub fn new(started_at: Timestamp, version: Option<String>) -> Self {
        let version =
            version.unwrap_or_else(|| format!("build-{}", started_at.timestamp_millis()));
        Self { started_at, version }
    }

    /// A token without `iat`, or issued before this process started, is stale.
    pub fn is_token_from_old_build(&self, iat: Option<i64>) -> bool {
        match iat {
            Some(iat) => iat * 1000 < self.started_at.timestamp_millis(),
            None => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn build() -> BuildInfo {
        BuildInfo::new(Utc.timestamp_opt(1_700_000_000, 500_000_000).unwrap(), None)
    }

    #[test]
    fn default_version_uses_millis() {
        assert_eq!(build().version, "build-1700000000500");
    }

    #[test]
    fn explicit_version_is_kept() {
        let info = BuildInfo::new(Utc::now(), Some("v1.2.3".into()));
        assert_eq!(info.version, "v1.2.3");
    }

    #[test]
    fn tokens_before_start_are_old() {
        let info = build();
        assert!(info.is_token_from_old_build(Some(1_699_999_999)));
        // Same second but earlier millisecond.
        assert!(info.is_token_from_old_build(Some(1_700_000_000)));
        assert!(!info.is_token_from_old_build(Some(1_700_000_001)));
    }

    #[test]
    fn missing_iat_is_old() {
        assert!(build().is_token_from_old_build(None));
    }
}
