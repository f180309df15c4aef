//! Route definitions for the `/intencoes` resource.

use axum::routing::{get, patch};
use axum::Router;

use crate::handlers::intencoes;
use crate::state::AppState;

/// Routes mounted at `/intencoes`.
///
/// ```text
/// GET    /                        -> list_intencoes
/// POST   /                        -> create_intencao (MODELO)
/// PATCH  /{id}/status             -> update_status
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(intencoes::list_intencoes).post(intencoes::create_intencao),
        )
        .route("/{id}/status", patch(intencoes::update_status))
}
