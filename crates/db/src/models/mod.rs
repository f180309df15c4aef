//! Domain model structs and DTOs.
//!
//! Each submodule contains:
//! - A `FromRow` entity struct matching the database row
//! - A create DTO for inserts
//! - An update DTO (all `Option` fields) for patches, where rows are editable

pub mod arquiteto_session;
pub mod audit;
pub mod certificate;
pub mod change_request;
pub mod ensaio;
pub mod intencao;
pub mod produto;
pub mod projeto;
pub mod user;
