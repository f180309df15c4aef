//! Route definitions for the `/arquiteto` workspace.

use axum::extract::DefaultBodyLimit;
use axum::routing::{delete, get, patch, post};
use axum::Router;

use crate::handlers::ensaios::MAX_TERM_BYTES;
use crate::handlers::{ensaios, solicitacoes, users};
use crate::state::AppState;

/// Multipart framing on top of the largest accepted term.
const TERM_BODY_LIMIT: usize = MAX_TERM_BYTES + 1024 * 1024;

/// Routes mounted at `/arquiteto`.
///
/// ```text
/// GET    /users/search-by-cpf                 -> search_by_cpf
/// GET    /users/search                        -> search_users
/// POST   /users/reset-password                -> reset_password
///
/// GET    /ensaios                             -> list_ensaios
/// POST   /ensaios                             -> create_ensaio
/// POST   /ensaios/limpar-deletados            -> purge_deleted
/// GET    /ensaios/{id}                        -> get_ensaio
/// PATCH  /ensaios/{id}                        -> update_ensaio
/// DELETE /ensaios/{id}                        -> delete_ensaio
/// POST   /ensaios/{id}/restore                -> restore_ensaio
/// POST   /ensaios/{id}/term                   -> upload_term (multipart PDF, 20 MB)
/// POST   /ensaios/{id}/photos                 -> add_photo
/// PUT    /ensaios/{id}/photos                 -> reorder_photos
/// DELETE /ensaios/{id}/photos/{photo_id}      -> delete_photo
///
/// GET    /solicitacoes                        -> list_solicitacoes
/// PATCH  /solicitacoes/{id}                   -> review_solicitacao
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/users/search-by-cpf", get(users::search_by_cpf))
        .route("/users/search", get(users::search_users))
        .route("/users/reset-password", post(users::reset_password))
        .route(
            "/ensaios",
            get(ensaios::list_ensaios).post(ensaios::create_ensaio),
        )
        .route("/ensaios/limpar-deletados", post(ensaios::purge_deleted))
        .route(
            "/ensaios/{id}",
            get(ensaios::get_ensaio)
                .patch(ensaios::update_ensaio)
                .delete(ensaios::delete_ensaio),
        )
        .route("/ensaios/{id}/restore", post(ensaios::restore_ensaio))
        .route(
            "/ensaios/{id}/term",
            post(ensaios::upload_term).layer(DefaultBodyLimit::max(TERM_BODY_LIMIT)),
        )
        .route(
            "/ensaios/{id}/photos",
            post(ensaios::add_photo).put(ensaios::reorder_photos),
        )
        .route(
            "/ensaios/{id}/photos/{photo_id}",
            delete(ensaios::delete_photo),
        )
        .route("/solicitacoes", get(solicitacoes::list_solicitacoes))
        .route("/solicitacoes/{id}", patch(solicitacoes::review_solicitacao))
}
