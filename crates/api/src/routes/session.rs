//! Route definitions for secure URLs.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::secure_urls;
use crate::state::AppState;

/// Routes mounted at `/session`.
///
/// ```text
/// POST   /secure-url              -> create_secure_url
/// POST   /revoke                  -> revoke_all
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/secure-url", post(secure_urls::create_secure_url))
        .route("/revoke", post(secure_urls::revoke_all))
}

/// Root-level opener for issued links (not under `/api/v1`).
///
/// ```text
/// GET    /secure/{token}/{resource_type}/{resource_id}  -> open_secure_url
/// ```
pub fn secure_router() -> Router<AppState> {
    Router::new().route(
        "/secure/{token}/{resource_type}/{resource_id}",
        get(secure_urls::open_secure_url),
    )
}
