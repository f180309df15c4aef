//! Birth dates and the minimum-age rule.

use chrono::{Datelike, NaiveDate};

/// Accounts and ensaio subjects must be adults.
pub const MINIMUM_AGE: u32 = 18;

/// Parse `DD/MM/YYYY` (form input) or `YYYY-MM-DD` (ISO, API clients).
pub fn parse_birth_date(input: &str) -> Result<NaiveDate, String> {
    let input = input.trim();
    NaiveDate::parse_from_str(input, "%d/%m/%Y")
        .or_else(|_| NaiveDate::parse_from_str(input, "%Y-%m-%d"))
        .map_err(|_| "Invalid date, use DD/MM/YYYY".to_string())
}

/// Whole years between `birth` and `today`.
pub fn age_on(birth: NaiveDate, today: NaiveDate) -> i32 {
    let mut age = today.year() - birth.year();
    if (today.month(), today.day()) < (birth.month(), birth.day()) {
        age -= 1;
    }
    age
}

/// Check that `birth` is not in the future and the person is at least
/// [`MINIMUM_AGE`] on `today`. Returns the age.
pub fn validate_birth_date_18_plus(birth: NaiveDate, today: NaiveDate) -> Result<u32, String> {
    if birth > today {
        return Err("Birth date cannot be in the future".to_string());
    }
    let age = age_on(birth, today) as u32;
    if age < MINIMUM_AGE {
        return Err(format!("Must be at least {MINIMUM_AGE} years old"));
    }
    Ok(age)
}
