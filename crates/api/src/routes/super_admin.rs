//! Route definitions for the `/super-admin` resource.

use axum::extract::DefaultBodyLimit;
use axum::routing::{delete, get};
use axum::Router;

use crate::handlers::certificates;
use crate::state::AppState;

/// Certificate bundles are small; this only leaves room for the form.
const CERTIFICATE_BODY_LIMIT: usize = 1024 * 1024;

/// Routes mounted at `/super-admin`. SUPERADMIN only.
///
/// ```text
/// GET    /certificates            -> list_certificates
/// POST   /certificates            -> upload_certificate (multipart)
/// DELETE /certificates/{id}       -> revoke_certificate
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/certificates",
            get(certificates::list_certificates)
                .post(certificates::upload_certificate)
                .layer(DefaultBodyLimit::max(CERTIFICATE_BODY_LIMIT)),
        )
        .route("/certificates/{id}", delete(certificates::revoke_certificate))
}
