//! Who may read and who may write.
//!
//! All checks are pure functions over the caller's role and ids so that the
//! handlers, the write guard, and the tests share one definition.

use crate::roles::Role;
use crate::status::EnsaioStatus;
use crate::types::DbId;

/// Why a permission check failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Denial {
    /// ADMIN can see everything but never change it.
    AdminReadOnly,
    /// Role has no write access at all.
    NoWritePermission,
    /// Caller is not the owner of the resource.
    NotOwner,
    /// MODELO profiles are maintained by the studio.
    ModeloReadOnly,
}

impl Denial {
    /// Machine-readable code, stable across releases.
    pub fn code(self) -> &'static str {
        match self {
            Denial::AdminReadOnly => "admin_readonly",
            Denial::NoWritePermission => "no_write_permission",
            Denial::NotOwner => "not_owner",
            Denial::ModeloReadOnly => "modelo_readonly",
        }
    }

    pub fn message(self) -> &'static str {
        match self {
            Denial::AdminReadOnly => "ADMIN accounts are read-only",
            Denial::NoWritePermission => "Only ARQUITETO accounts can change data",
            Denial::NotOwner => "You can only access your own data",
            Denial::ModeloReadOnly => {
                "MODELO profiles can only be changed through a change request"
            }
        }
    }
}

/// Only ARQUITETO may write.
pub fn can_write(role: Role) -> Result<(), Denial> {
    match role {
        Role::Arquiteto => Ok(()),
        Role::Admin => Err(Denial::AdminReadOnly),
        _ => Err(Denial::NoWritePermission),
    }
}

/// Staff read everything; MODELO and CLIENTE read only what they own.
///
/// `resource_owner` is `None` for resources that have no single owner, which
/// non-staff roles may never read through this check.
pub fn can_read(role: Role, resource_owner: Option<DbId>, user_id: DbId) -> Result<(), Denial> {
    if role.is_staff() {
        return Ok(());
    }
    match resource_owner {
        Some(owner) if owner == user_id => Ok(()),
        _ => Err(Denial::NotOwner),
    }
}

/// ARQUITETO edits any profile, MODELO none, everyone else only their own.
pub fn can_edit_profile(role: Role, target_id: DbId, user_id: DbId) -> Result<(), Denial> {
    match role {
        Role::Arquiteto => Ok(()),
        Role::Modelo => Err(Denial::ModeloReadOnly),
        _ if target_id == user_id => Ok(()),
        _ => Err(Denial::NotOwner),
    }
}

/// The fields of an ensaio that decide who may see it.
#[derive(Debug, Clone, Copy)]
pub struct EnsaioAccess<'a> {
    pub created_by_id: DbId,
    pub subject_cpf: &'a str,
    pub status: EnsaioStatus,
    pub deleted: bool,
}

/// The caller as seen by [`can_view_ensaio`].
#[derive(Debug, Clone, Copy)]
pub struct Viewer<'a> {
    pub user_id: DbId,
    pub role: Role,
    pub cpf: Option<&'a str>,
}

/// Ensaio read policy.
///
/// - ARQUITETO sees the ensaios it created.
/// - ADMIN and SUPERADMIN see every ensaio.
/// - MODELO and CLIENTE see published ensaios whose subject CPF is theirs.
///
/// Deleted ensaios are visible to nobody.
pub fn can_view_ensaio(viewer: Viewer<'_>, ensaio: EnsaioAccess<'_>) -> bool {
    if ensaio.deleted || ensaio.status == EnsaioStatus::Deleted {
        return false;
    }
    match viewer.role {
        Role::Arquiteto => ensaio.created_by_id == viewer.user_id,
        Role::Admin | Role::Superadmin => true,
        Role::Modelo | Role::Cliente => {
            ensaio.status == EnsaioStatus::Published
                && viewer.cpf.is_some_and(|cpf| cpf == ensaio.subject_cpf)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn only_arquiteto_writes() {
        assert!(can_write(Role::Arquiteto).is_ok());
        assert_matches!(can_write(Role::Admin), Err(Denial::AdminReadOnly));
        assert_matches!(can_write(Role::Superadmin), Err(Denial::NoWritePermission));
        assert_matches!(can_write(Role::Modelo), Err(Denial::NoWritePermission));
        assert_matches!(can_write(Role::Cliente), Err(Denial::NoWritePermission));
    }

    #[test]
    fn staff_read_anything() {
        for role in [Role::Arquiteto, Role::Admin, Role::Superadmin] {
            assert!(can_read(role, Some(99), 1).is_ok());
            assert!(can_read(role, None, 1).is_ok());
        }
    }

    #[test]
    fn subjects_read_only_their_own() {
        assert!(can_read(Role::Modelo, Some(7), 7).is_ok());
        assert_matches!(can_read(Role::Modelo, Some(8), 7), Err(Denial::NotOwner));
        assert_matches!(can_read(Role::Cliente, None, 7), Err(Denial::NotOwner));
    }

    #[test]
    fn profile_edit_rules() {
        assert!(can_edit_profile(Role::Arquiteto, 2, 1).is_ok());
        assert_matches!(
            can_edit_profile(Role::Modelo, 1, 1),
            Err(Denial::ModeloReadOnly)
        );
        assert!(can_edit_profile(Role::Cliente, 5, 5).is_ok());
        assert_matches!(can_edit_profile(Role::Admin, 5, 6), Err(Denial::NotOwner));
    }

    #[test]
    fn denial_codes_are_stable() {
        assert_eq!(Denial::ModeloReadOnly.code(), "modelo_readonly");
        assert_eq!(Denial::AdminReadOnly.code(), "admin_readonly");
    }

    fn ensaio(status: EnsaioStatus) -> EnsaioAccess<'static> {
        EnsaioAccess {
            created_by_id: 1,
            subject_cpf: "52998224725",
            status,
            deleted: false,
        }
    }

    #[test]
    fn arquiteto_sees_only_own_ensaios() {
        let own = Viewer { user_id: 1, role: Role::Arquiteto, cpf: None };
        let other = Viewer { user_id: 2, role: Role::Arquiteto, cpf: None };
        assert!(can_view_ensaio(own, ensaio(EnsaioStatus::Draft)));
        assert!(!can_view_ensaio(other, ensaio(EnsaioStatus::Published)));
    }

    #[test]
    fn admin_sees_drafts() {
        let admin = Viewer { user_id: 3, role: Role::Admin, cpf: None };
        assert!(can_view_ensaio(admin, ensaio(EnsaioStatus::Draft)));
    }

    #[test]
    fn modelo_needs_matching_cpf_and_published() {
        let modelo = Viewer { user_id: 4, role: Role::Modelo, cpf: Some("52998224725") };
        assert!(can_view_ensaio(modelo, ensaio(EnsaioStatus::Published)));
        assert!(!can_view_ensaio(modelo, ensaio(EnsaioStatus::Draft)));

        let stranger = Viewer { user_id: 5, role: Role::Cliente, cpf: Some("11144477735") };
        assert!(!can_view_ensaio(stranger, ensaio(EnsaioStatus::Published)));

        let no_cpf = Viewer { user_id: 6, role: Role::Cliente, cpf: None };
        assert!(!can_view_ensaio(no_cpf, ensaio(EnsaioStatus::Published)));
    }

    #[test]
    fn deleted_ensaio_is_hidden_from_everyone() {
        let admin = Viewer { user_id: 3, role: Role::Admin, cpf: None };
        let mut e = ensaio(EnsaioStatus::Published);
        e.deleted = true;
        assert!(!can_view_ensaio(admin, e));
        assert!(!can_view_ensaio(admin, ensaio(EnsaioStatus::Deleted)));
    }
}
