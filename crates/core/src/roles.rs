//! User roles.
//!
//! Stored in `users.role` as upper-case text. The set must match the
//! `ck_users_role` check constraint in the initial migration.

use serde::{Deserialize, Serialize};

pub const ROLE_ARQUITETO: &str = "ARQUITETO";
pub const ROLE_ADMIN: &str = "ADMIN";
pub const ROLE_SUPERADMIN: &str = "SUPERADMIN";
pub const ROLE_MODELO: &str = "MODELO";
pub const ROLE_CLIENTE: &str = "CLIENTE";

/// Every role known to the system.
pub const ALL_ROLES: &[&str] = &[
    ROLE_ARQUITETO,
    ROLE_ADMIN,
    ROLE_SUPERADMIN,
    ROLE_MODELO,
    ROLE_CLIENTE,
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Role {
    /// Owns and edits all content. The only role with write access.
    Arquiteto,
    /// Read-only staff.
    Admin,
    /// Manages signing certificates; otherwise read-only staff.
    Superadmin,
    /// Subject of ensaios.
    Modelo,
    /// Customer; may also be the subject of an ensaio.
    Cliente,
}

impl Role {
    pub fn parse(s: &str) -> Option<Role> {
        match s {
            ROLE_ARQUITETO => Some(Role::Arquiteto),
            ROLE_ADMIN => Some(Role::Admin),
            ROLE_SUPERADMIN => Some(Role::Superadmin),
            ROLE_MODELO => Some(Role::Modelo),
            ROLE_CLIENTE => Some(Role::Cliente),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Role::Arquiteto => ROLE_ARQUITETO,
            Role::Admin => ROLE_ADMIN,
            Role::Superadmin => ROLE_SUPERADMIN,
            Role::Modelo => ROLE_MODELO,
            Role::Cliente => ROLE_CLIENTE,
        }
    }

    /// Staff roles may read every record.
    pub fn is_staff(self) -> bool {
        matches!(self, Role::Arquiteto | Role::Admin | Role::Superadmin)
    }

    /// Roles that can be the subject of an ensaio (looked up by CPF).
    pub fn is_subject(self) -> bool {
        matches!(self, Role::Modelo | Role::Cliente)
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_round_trips_every_role() {
        for name in ALL_ROLES {
            let role = Role::parse(name).expect("known role");
            assert_eq!(role.as_str(), *name);
        }
    }

    #[test]
    fn parse_is_case_sensitive() {
        assert_eq!(Role::parse("arquiteto"), None);
        assert_eq!(Role::parse(""), None);
    }

    #[test]
    fn staff_and_subject_are_disjoint() {
        for name in ALL_ROLES {
            let role = Role::parse(name).unwrap();
            assert!(!(role.is_staff() && role.is_subject()), "{role}");
        }
    }

    #[test]
    fn serde_uses_upper_case_names() {
        let json = serde_json::to_string(&Role::Superadmin).unwrap();
        assert_eq!(json, "\"SUPERADMIN\"");
        let back: Role = serde_json::from_str("\"MODELO\"").unwrap();
        assert_eq!(back, Role::Modelo);
    }
}
