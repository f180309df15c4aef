//! Authentication primitives.
//!
//! - [`password`] -- Argon2id password hashing, verification, and strength rules.
//! - [`jwt`] -- Session token generation and validation.
//! - [`cookie`] -- The `tna_session` cookie and token extraction from requests.

pub mod cookie;
pub mod jwt;
pub mod password;
