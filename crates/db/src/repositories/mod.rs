//! Repository layer: one zero-sized struct per table group.
//!
//! Every method takes `&PgPool` and returns `sqlx::Error` unchanged; mapping
//! to HTTP statuses happens in the API crate.

pub mod arquiteto_session_repo;
pub mod audit_repo;
pub mod certificate_repo;
pub mod change_request_repo;
pub mod ensaio_photo_repo;
pub mod ensaio_repo;
pub mod intencao_repo;
pub mod produto_repo;
pub mod projeto_repo;
pub mod user_repo;

pub use arquiteto_session_repo::ArquitetoSessionRepo;
pub use audit_repo::AuditRepo;
pub use certificate_repo::CertificateRepo;
pub use change_request_repo::ChangeRequestRepo;
pub use ensaio_photo_repo::{EnsaioPhotoRepo, PhotoSlot};
pub use ensaio_repo::EnsaioRepo;
pub use intencao_repo::IntencaoRepo;
pub use produto_repo::ProdutoRepo;
pub use projeto_repo::ProjetoRepo;
pub use user_repo::UserRepo;
