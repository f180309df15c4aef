//! Role-based access control (RBAC) extractors.
//!
//! Each extractor wraps [`AuthUser`] and rejects requests whose role does not
//! meet the requirement with 403. Write access is separate, see
//! [`super::write_guard::RequireWriter`].

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use tna_core::roles::Role;

use super::auth::AuthUser;
use crate::error::AppError;
use crate::state::AppState;

/// Declares a newtype extractor accepting only the listed roles.
macro_rules! role_extractor {
    ($(#[$doc:meta])* $name:ident, $message:literal, $($role:path)|+) => {
        $(#[$doc])*
        pub struct $name(pub AuthUser);

        impl FromRequestParts<AppState> for $name {
            type Rejection = AppError;

            async fn from_request_parts(
                parts: &mut Parts,
                state: &AppState,
            ) -> Result<Self, Self::Rejection> {
                let user = AuthUser::from_request_parts(parts, state).await?;
                if !matches!(user.role, $($role)|+) {
                    return Err(AppError::forbidden($message));
                }
                Ok($name(user))
            }
        }
    };
}

role_extractor!(
    /// Requires `ARQUITETO`.
    RequireArquiteto,
    "Arquiteto role required",
    Role::Arquiteto
);

role_extractor!(
    /// Requires `ARQUITETO` or `ADMIN`.
    RequireArquitetoOrAdmin,
    "Arquiteto or Admin role required",
    Role::Arquiteto | Role::Admin
);

role_extractor!(
    /// Requires any staff role: `ARQUITETO`, `ADMIN` or `SUPERADMIN`.
    RequireStaff,
    "Staff role required",
    Role::Arquiteto | Role::Admin | Role::Superadmin
);

role_extractor!(
    /// Requires `SUPERADMIN`.
    RequireSuperAdmin,
    "Superadmin role required",
    Role::Superadmin
);

role_extractor!(
    /// Requires `MODELO`.
    RequireModelo,
    "Modelo role required",
    Role::Modelo
);

role_extractor!(
    /// Requires `MODELO` or `CLIENTE`, the roles that can be photographed.
    RequireSubject,
    "Modelo or Cliente role required",
    Role::Modelo | Role::Cliente
);
