//! Authentication and authorization extractors, plus response hardening.
//!
//! - [`auth::AuthUser`] -- The caller, from the session cookie or a Bearer token.
//! - [`rbac`] -- Role gates (`RequireStaff`, `RequireSuperAdmin`, ...).
//! - [`write_guard::RequireWriter`] -- ARQUITETO with a write-capable session.
//! - [`security_headers`] -- Headers added to every response.

pub mod auth;
pub mod rbac;
pub mod security_headers;
pub mod write_guard;
