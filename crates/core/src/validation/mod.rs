//! Field validators for personal data.
//!
//! Each validator takes raw user input. Normalizers return the canonical
//! stored form; `validate_*` functions only answer yes or no.

pub mod birth_date;
pub mod contact;
pub mod document;

pub use birth_date::{parse_birth_date, validate_birth_date_18_plus, MINIMUM_AGE};
pub use contact::{format_phone_display, normalize_email, normalize_phone_e164, validate_email, validate_phone_e164};
pub use document::{format_cpf, normalize_cpf, normalize_passport, validate_cpf, validate_passport};
