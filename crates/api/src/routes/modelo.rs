//! Route definitions for the `/modelo` area.

use axum::routing::get;
use axum::Router;

use crate::handlers::{modelo, solicitacoes};
use crate::state::AppState;

/// Routes mounted at `/modelo`. MODELO and CLIENTE only.
///
/// ```text
/// GET    /ensaios                 -> list_my_ensaios
/// GET    /ensaios/{id}            -> get_my_ensaio
/// GET    /solicitacoes            -> list_my_solicitacoes
/// POST   /solicitacoes            -> create_solicitacao
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/ensaios", get(modelo::list_my_ensaios))
        .route("/ensaios/{id}", get(modelo::get_my_ensaio))
        .route(
            "/solicitacoes",
            get(solicitacoes::list_my_solicitacoes).post(solicitacoes::create_solicitacao),
        )
}
