//! EUR to BRL conversion and pt-BR money formatting.
//!
//! Product prices are stored in euros. The live rate is fetched by the API
//! layer; this module holds the parsing, caching policy, and formatting.

use crate::types::Timestamp;

/// Rate used whenever the live quote cannot be fetched or parsed.
pub const FALLBACK_EUR_BRL_RATE: f64 = 5.50;

/// How long a fetched rate stays valid.
pub const RATE_CACHE_TTL_SECS: i64 = 3600;

/// Label shown for free (zero or missing) prices.
pub const COMPLIMENTARY_LABEL: &str = "Cortesia";

/// A rate together with the time it was fetched.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CachedRate {
    pub rate: f64,
    pub fetched_at: Timestamp,
}

impl CachedRate {
    pub fn is_fresh(&self, now: Timestamp) -> bool {
        (now - self.fetched_at).num_seconds() < RATE_CACHE_TTL_SECS
    }
}

/// Extract the rate from an AwesomeAPI `last/EUR-BRL` response.
///
/// Uses `EURBRL.bid`, falling back to `EURBRL.high`. Values arrive as
/// strings. Non-positive or unparsable values yield `None`.
pub fn parse_rate(body: &serde_json::Value) -> Option<f64> {
    let quote = body.get("EURBRL")?;
    ["bid", "high"]
        .iter()
        .filter_map(|field| quote.get(*field))
        .filter_map(|v| match v {
            serde_json::Value::String(s) => s.trim().parse::<f64>().ok(),
            serde_json::Value::Number(n) => n.as_f64(),
            _ => None,
        })
        .find(|rate| rate.is_finite() && *rate > 0.0)
}

/// Convert euros to reais. Missing or zero prices stay `None`.
pub fn convert_eur_to_brl(eur: Option<f64>, rate: f64) -> Option<f64> {
    match eur {
        Some(value) if value != 0.0 => Some(value * rate),
        _ => None,
    }
}

pub fn format_brl(value: Option<f64>) -> String {
    format_money("R$", value)
}

pub fn format_eur(value: Option<f64>) -> String {
    format_money("€", value)
}

/// pt-BR layout: `.` groups thousands, `,` separates two decimals.
fn format_money(symbol: &str, value: Option<f64>) -> String {
    let value = match value {
        Some(v) if v != 0.0 && v.is_finite() => v,
        _ => return COMPLIMENTARY_LABEL.to_string(),
    };

    let cents = (value.abs() * 100.0).round() as u64;
    let whole = (cents / 100).to_string();
    let fraction = cents % 100;

    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, ch) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(ch);
    }

    let sign = if value < 0.0 { "-" } else { "" };
    format!("{sign}{symbol} {grouped},{fraction:02}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};

    #[test]
    fn parses_bid_as_string() {
        let body = serde_json::json!({"EURBRL": {"bid": "6.1234", "high": "6.2"}});
        assert_eq!(parse_rate(&body), Some(6.1234));
    }

    #[test]
    fn falls_back_to_high() {
        let body = serde_json::json!({"EURBRL": {"bid": "", "high": "6.2"}});
        assert_eq!(parse_rate(&body), Some(6.2));
    }

    #[test]
    fn rejects_missing_or_bad_quotes() {
        assert_eq!(parse_rate(&serde_json::json!({})), None);
        assert_eq!(parse_rate(&serde_json::json!({"EURBRL": {"bid": "0"}})), None);
        assert_eq!(parse_rate(&serde_json::json!({"EURBRL": {"bid": "abc"}})), None);
    }

    #[test]
    fn zero_or_missing_price_is_not_converted() {
        assert_eq!(convert_eur_to_brl(None, 6.0), None);
        assert_eq!(convert_eur_to_brl(Some(0.0), 6.0), None);
        assert_eq!(convert_eur_to_brl(Some(10.0), 6.0), Some(60.0));
    }

    #[test]
    fn formats_pt_br() {
        assert_eq!(format_brl(Some(1234.5)), "R$ 1.234,50");
        assert_eq!(format_brl(Some(0.99)), "R$ 0,99");
        assert_eq!(format_eur(Some(1_234_567.891)), "€ 1.234.567,89");
        assert_eq!(format_brl(Some(100.0)), "R$ 100,00");
    }

    #[test]
    fn free_items_are_complimentary() {
        assert_eq!(format_brl(None), "Cortesia");
        assert_eq!(format_eur(Some(0.0)), "Cortesia");
    }

    #[test]
    fn cache_expires_after_an_hour() {
        let now = Utc::now();
        let cached = CachedRate { rate: 6.0, fetched_at: now - Duration::minutes(59) };
        assert!(cached.is_fresh(now));
        let stale = CachedRate { rate: 6.0, fetched_at: now - Duration::minutes(61) };
        assert!(!stale.is_fresh(now));
    }
}
