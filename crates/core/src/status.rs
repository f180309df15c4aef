//! Status values stored as text columns, and the transitions between them.

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Ensaio
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum EnsaioStatus {
    Draft,
    Published,
    Deleted,
}

impl EnsaioStatus {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "DRAFT" => Some(Self::Draft),
            "PUBLISHED" => Some(Self::Published),
            "DELETED" => Some(Self::Deleted),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Draft => "DRAFT",
            Self::Published => "PUBLISHED",
            Self::Deleted => "DELETED",
        }
    }

    /// Statuses a client may set directly. `DELETED` only comes from a delete.
    pub fn is_editable(self) -> bool {
        matches!(self, Self::Draft | Self::Published)
    }
}

// ---------------------------------------------------------------------------
// Purchase intent
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum IntencaoStatus {
    Pendente,
    Aprovada,
    Rejeitada,
    Concluida,
}

impl IntencaoStatus {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "PENDENTE" => Some(Self::Pendente),
            "APROVADA" => Some(Self::Aprovada),
            "REJEITADA" => Some(Self::Rejeitada),
            "CONCLUIDA" => Some(Self::Concluida),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pendente => "PENDENTE",
            Self::Aprovada => "APROVADA",
            Self::Rejeitada => "REJEITADA",
            Self::Concluida => "CONCLUIDA",
        }
    }

    /// PENDENTE -> APROVADA | REJEITADA, APROVADA -> CONCLUIDA.
    pub fn can_transition_to(self, next: Self) -> bool {
        matches!(
            (self, next),
            (Self::Pendente, Self::Aprovada)
                | (Self::Pendente, Self::Rejeitada)
                | (Self::Aprovada, Self::Concluida)
        )
    }
}

// ---------------------------------------------------------------------------
// Profile change request
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ChangeRequestStatus {
    Pending,
    Approved,
    Rejected,
}

impl ChangeRequestStatus {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "PENDING" => Some(Self::Pending),
            "APPROVED" => Some(Self::Approved),
            "REJECTED" => Some(Self::Rejected),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "PENDING",
            Self::Approved => "APPROVED",
            Self::Rejected => "REJECTED",
        }
    }
}

/// Profile fields a MODELO or CLIENTE may ask the studio to change.
pub const CHANGE_REQUEST_FIELDS: &[&str] = &["phone", "address", "name", "passport", "email"];

pub fn is_change_request_field(field: &str) -> bool {
    CHANGE_REQUEST_FIELDS.contains(&field)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deleted_is_not_editable() {
        assert!(EnsaioStatus::Draft.is_editable());
        assert!(EnsaioStatus::Published.is_editable());
        assert!(!EnsaioStatus::Deleted.is_editable());
    }

    #[test]
    fn ensaio_status_parse() {
        assert_eq!(EnsaioStatus::parse("PUBLISHED"), Some(EnsaioStatus::Published));
        assert_eq!(EnsaioStatus::parse("published"), None);
    }

    #[test]
    fn intencao_transitions() {
        use IntencaoStatus::*;
        assert!(Pendente.can_transition_to(Aprovada));
        assert!(Pendente.can_transition_to(Rejeitada));
        assert!(Aprovada.can_transition_to(Concluida));
        assert!(!Pendente.can_transition_to(Concluida));
        assert!(!Rejeitada.can_transition_to(Aprovada));
        assert!(!Concluida.can_transition_to(Pendente));
        assert!(!Aprovada.can_transition_to(Aprovada));
    }

    #[test]
    fn change_request_fields() {
        assert!(is_change_request_field("phone"));
        assert!(is_change_request_field("email"));
        assert!(!is_change_request_field("cpf"));
        assert!(!is_change_request_field("role"));
    }
}
