//! CPF and passport numbers.

use std::sync::LazyLock;

use regex::Regex;

/// ICAO document number: two-letter issuing country, then 6 to 9 alphanumerics.
static PASSPORT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Z]{2}[A-Z0-9]{6,9}$").expect("valid regex"));

/// Strip everything but digits. Returns `None` unless exactly 11 remain.
///
/// This is the shape check used for lookups and storage; it does not verify
/// the check digits (see [`validate_cpf`]).
pub fn normalize_cpf(input: &str) -> Option<String> {
    let digits: String = input.chars().filter(char::is_ascii_digit).collect();
    (digits.len() == 11).then_some(digits)
}

/// Full CPF check: 11 digits, not a repeated digit, both check digits valid.
pub fn validate_cpf(input: &str) -> bool {
    let Some(cpf) = normalize_cpf(input) else {
        return false;
    };
    let digits: Vec<u32> = cpf.chars().filter_map(|c| c.to_digit(10)).collect();

    if digits.iter().all(|d| *d == digits[0]) {
        return false;
    }

    check_digit(&digits[..9]) == digits[9] && check_digit(&digits[..10]) == digits[10]
}

/// Weighted mod-11 check digit over the leading `prefix` digits.
fn check_digit(prefix: &[u32]) -> u32 {
    let weight_start = prefix.len() as u32 + 1;
    let sum: u32 = prefix
        .iter()
        .enumerate()
        .map(|(i, d)| d * (weight_start - i as u32))
        .sum();
    let remainder = (sum * 10) % 11;
    if remainder >= 10 {
        0
    } else {
        remainder
    }
}

/// `12345678901` -> `123.456.789-01`. Input that is not 11 digits is returned as is.
pub fn format_cpf(input: &str) -> String {
    match normalize_cpf(input) {
        Some(c) => format!("{}.{}.{}-{}", &c[0..3], &c[3..6], &c[6..9], &c[9..11]),
        None => input.to_string(),
    }
}

/// Trim and upper-case a passport number.
pub fn normalize_passport(input: &str) -> String {
    input.trim().to_uppercase()
}

pub fn validate_passport(input: &str) -> bool {
    PASSPORT_RE.is_match(&normalize_passport(input))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valid_cpfs() {
        assert!(validate_cpf("529.982.247-25"));
        assert!(validate_cpf("52998224725"));
        assert!(validate_cpf("111.444.777-35"));
    }

    #[test]
    fn wrong_check_digit_is_rejected() {
        assert!(!validate_cpf("52998224724"));
        assert!(!validate_cpf("11144477736"));
    }

    #[test]
    fn repeated_digits_are_rejected() {
        assert!(!validate_cpf("00000000000"));
        assert!(!validate_cpf("999.999.999-99"));
    }

    #[test]
    fn wrong_length_is_rejected() {
        assert!(!validate_cpf("1234567890"));
        assert!(!validate_cpf(""));
        assert_eq!(normalize_cpf("123.456.789-012"), None);
    }

    #[test]
    fn normalize_strips_punctuation() {
        assert_eq!(normalize_cpf("529.982.247-25").as_deref(), Some("52998224725"));
    }

    #[test]
    fn format_cpf_inserts_separators() {
        assert_eq!(format_cpf("12345678901"), "123.456.789-01");
        assert_eq!(format_cpf("123"), "123");
    }

    #[test]
    fn passports() {
        assert!(validate_passport("BR123456"));
        assert!(validate_passport(" us123456789 "));
        assert!(validate_passport("GB1234567"));
        assert!(!validate_passport("B1234567"));
        assert!(!validate_passport("BR12345"));
        assert!(!validate_passport("BR1234567890"));
        assert!(!validate_passport("BR-123456"));
    }
}
