//! Email addresses and phone numbers.

use std::sync::LazyLock;

use regex::Regex;

static EMAIL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^[a-zA-Z0-9.!#$%&'*+/=?^_`{|}~-]+@[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?(?:\.[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?)*$",
    )
    .expect("valid regex")
});

static E164_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\+[1-9]\d{1,14}$").expect("valid regex"));

/// Country code assumed for numbers entered without one.
const DEFAULT_COUNTRY_CODE: &str = "55";

/// Trim and lower-case. Emails are unique case-insensitively.
pub fn normalize_email(input: &str) -> String {
    input.trim().to_lowercase()
}

pub fn validate_email(input: &str) -> bool {
    EMAIL_RE.is_match(&normalize_email(input))
}

pub fn validate_phone_e164(input: &str) -> bool {
    E164_RE.is_match(input.trim())
}

/// Bring a phone number into E.164 form.
///
/// Numbers with a leading `+` must already be valid E.164. Bare numbers of
/// 10 or 11 digits are taken as Brazilian (DDD + number). Anything else is
/// rejected.
pub fn normalize_phone_e164(input: &str) -> Option<String> {
    let digits: String = input.chars().filter(char::is_ascii_digit).collect();
    if !(8..=15).contains(&digits.len()) {
        return None;
    }

    if input.trim().starts_with('+') {
        let candidate = format!("+{digits}");
        return validate_phone_e164(&candidate).then_some(candidate);
    }

    if (10..=11).contains(&digits.len()) {
        return Some(format!("+{DEFAULT_COUNTRY_CODE}{digits}"));
    }

    None
}

/// `+5511987654321` -> `(11) 98765-4321`, `+551134567890` -> `(11) 3456-7890`.
///
/// Non-Brazilian numbers are returned unchanged.
pub fn format_phone_display(phone: &str) -> String {
    let Some(rest) = phone.strip_prefix('+') else {
        return phone.to_string();
    };
    let Some(national) = rest.strip_prefix(DEFAULT_COUNTRY_CODE) else {
        return phone.to_string();
    };
    if national.len() < 10 || !national.chars().all(|c| c.is_ascii_digit()) {
        return phone.to_string();
    }

    let (ddd, number) = national.split_at(2);
    match number.len() {
        9 => format!("({ddd}) {}-{}", &number[..5], &number[5..]),
        8 => format!("({ddd}) {}-{}", &number[..4], &number[4..]),
        _ => phone.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn emails() {
        assert!(validate_email("ana@studio.com.br"));
        assert!(validate_email("  Ana.Silva+fotos@Studio.COM "));
        assert!(!validate_email("ana@"));
        assert!(!validate_email("ana studio@x.com"));
        assert!(!validate_email("@studio.com"));
    }

    #[test]
    fn email_normalization() {
        assert_eq!(normalize_email("  Ana@Studio.COM "), "ana@studio.com");
    }

    #[test]
    fn e164() {
        assert!(validate_phone_e164("+5511987654321"));
        assert!(validate_phone_e164("+14155552671"));
        assert!(!validate_phone_e164("5511987654321"));
        assert!(!validate_phone_e164("+0511987654321"));
        assert!(!validate_phone_e164("+55119876543210000"));
    }

    #[test]
    fn normalize_assumes_brazil_for_bare_numbers() {
        assert_eq!(
            normalize_phone_e164("(11) 98765-4321").as_deref(),
            Some("+5511987654321")
        );
        assert_eq!(
            normalize_phone_e164("11 3456-7890").as_deref(),
            Some("+551134567890")
        );
    }

    #[test]
    fn normalize_keeps_international_numbers() {
        assert_eq!(
            normalize_phone_e164("+1 (415) 555-2671").as_deref(),
            Some("+14155552671")
        );
    }

    #[test]
    fn normalize_rejects_bad_lengths() {
        assert_eq!(normalize_phone_e164("12345"), None);
        assert_eq!(normalize_phone_e164("123456789"), None);
        assert_eq!(normalize_phone_e164("1234567890123456"), None);
    }

    #[test]
    fn display_format() {
        assert_eq!(format_phone_display("+5511987654321"), "(11) 98765-4321");
        assert_eq!(format_phone_display("+551134567890"), "(11) 3456-7890");
        assert_eq!(format_phone_display("+14155552671"), "+14155552671");
        assert_eq!(format_phone_display("11987654321"), "11987654321");
    }
}
