//! Domain rules for the studio backend.
//!
//! Everything here is free of I/O: role and permission checks, validators,
//! slug and storage-key naming, currency math, audit sanitizing, and the two
//! in-process stores (ephemeral session tokens and fixed-window rate limits).

pub mod audit;
pub mod build_version;
pub mod crypto;
pub mod currency;
pub mod error;
pub mod hashing;
pub mod image_naming;
pub mod permissions;
pub mod rate_limit;
pub mod roles;
pub mod session_tokens;
pub mod slug;
pub mod status;
pub mod types;
pub mod validation;
