//! User entity model and DTOs.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use tna_core::types::{DbId, Timestamp};

/// Full user row from the `users` table.
///
/// Contains the password hash -- NEVER serialize this to API responses directly.
/// Use [`UserResponse`] for external-facing output.
#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub id: DbId,
    pub email: String,
    pub name: Option<String>,
    pub password_hash: String,
    pub role: String,
    pub cpf: Option<String>,
    pub phone: Option<String>,
    pub passport: Option<String>,
    pub address: Option<String>,
    pub birth_date: Option<NaiveDate>,
    /// Storage key of the profile photo.
    pub profile_image_key: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Safe user representation for API responses (no password hash).
#[derive(Debug, Clone, Serialize)]
pub struct UserResponse {
    pub id: DbId,
    pub email: String,
    pub name: Option<String>,
    pub role: String,
    pub cpf: Option<String>,
    pub phone: Option<String>,
    pub passport: Option<String>,
    pub address: Option<String>,
    pub birth_date: Option<NaiveDate>,
    pub has_profile_image: bool,
    pub created_at: Timestamp,
}

impl From<User> for UserResponse {
    fn from(u: User) -> Self {
        Self {
            id: u.id,
            email: u.email,
            name: u.name,
            role: u.role,
            cpf: u.cpf,
            phone: u.phone,
            passport: u.passport,
            address: u.address,
            birth_date: u.birth_date,
            has_profile_image: u.profile_image_key.is_some(),
            created_at: u.created_at,
        }
    }
}

/// Minimal projection returned by CPF search.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct UserSummary {
    pub id: DbId,
    pub name: Option<String>,
    pub email: String,
    pub cpf: Option<String>,
    pub role: String,
}

/// Row of the per-role user count.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct RoleCount {
    pub role: String,
    pub count: i64,
}

/// DTO for creating a new user. Values are already normalized and validated.
#[derive(Debug, Clone)]
pub struct CreateUser {
    pub email: String,
    pub name: Option<String>,
    pub password_hash: String,
    pub role: String,
    pub cpf: Option<String>,
    pub phone: Option<String>,
    pub passport: Option<String>,
    pub birth_date: Option<NaiveDate>,
}

/// DTO for updating an existing user. All fields are optional.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateUser {
    pub email: Option<String>,
    pub name: Option<String>,
    pub role: Option<String>,
    pub cpf: Option<String>,
    pub phone: Option<String>,
    pub passport: Option<String>,
    pub address: Option<String>,
    pub birth_date: Option<NaiveDate>,
    pub profile_image_key: Option<String>,
}
