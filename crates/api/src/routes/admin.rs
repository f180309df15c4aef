//! Route definitions for the `/admin` resource.

use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::Router;

use crate::handlers::users::{self, MAX_PROFILE_IMAGE_BYTES};
use crate::state::AppState;

/// Multipart framing on top of the largest accepted picture.
const PROFILE_IMAGE_BODY_LIMIT: usize = MAX_PROFILE_IMAGE_BYTES + 1024 * 1024;

/// Routes mounted at `/admin`.
///
/// Reads need a staff role; writes need [`RequireWriter`](crate::middleware::write_guard::RequireWriter).
///
/// ```text
/// GET    /users                   -> list_users
/// POST   /users                   -> create_user
/// GET    /users/{id}              -> get_user
/// PATCH  /users/{id}              -> update_user
/// DELETE /users/{id}              -> delete_user
/// POST   /users/upload-profile-image -> upload_profile_image (multipart, 3 MB)
/// GET    /reports                 -> reports
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/users", get(users::list_users).post(users::create_user))
        .route(
            "/users/{id}",
            get(users::get_user)
                .patch(users::update_user)
                .delete(users::delete_user),
        )
        .route(
            "/users/upload-profile-image",
            post(users::upload_profile_image)
                .layer(DefaultBodyLimit::max(PROFILE_IMAGE_BODY_LIMIT)),
        )
        .route("/reports", get(users::reports))
}
