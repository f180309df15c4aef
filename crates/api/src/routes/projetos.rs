//! Route definitions for the `/projetos` resource.

use axum::routing::get;
use axum::Router;

use crate::handlers::projetos;
use crate::state::AppState;

/// Routes mounted at `/projetos`.
///
/// ```text
/// GET    /                        -> list_projetos
/// POST   /                        -> create_projeto
/// GET    /{id}                    -> get_projeto
/// PATCH  /{id}                    -> update_projeto
/// DELETE /{id}                    -> delete_projeto
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(projetos::list_projetos).post(projetos::create_projeto),
        )
        .route(
            "/{id}",
            get(projetos::get_projeto)
                .patch(projetos::update_projeto)
                .delete(projetos::delete_projeto),
        )
}
