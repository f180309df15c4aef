//! Route definitions for the `/produtos` resource.

use axum::extract::DefaultBodyLimit;
use axum::routing::{delete, get, post};
use axum::Router;

use crate::handlers::produtos::{self, MAX_PRODUTO_PHOTO_BYTES};
use crate::state::AppState;

/// Multipart framing on top of the largest accepted photo.
const PHOTO_BODY_LIMIT: usize = MAX_PRODUTO_PHOTO_BYTES + 1024 * 1024;

/// Routes mounted at `/produtos`.
///
/// ```text
/// GET    /                        -> list_produtos
/// POST   /                        -> create_produto
/// GET    /{id}                    -> get_produto
/// PATCH  /{id}                    -> update_produto
/// DELETE /{id}                    -> delete_produto
/// GET    /{id}/cover              -> cover_url
/// POST   /upload-photo            -> upload_photo (multipart, 40 MB)
/// POST   /{id}/photos             -> add_photo
/// DELETE /{id}/photos/{photo_id}  -> delete_photo
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(produtos::list_produtos).post(produtos::create_produto),
        )
        .route(
            "/{id}",
            get(produtos::get_produto)
                .patch(produtos::update_produto)
                .delete(produtos::delete_produto),
        )
        .route("/{id}/cover", get(produtos::cover_url))
        .route(
            "/upload-photo",
            post(produtos::upload_photo).layer(DefaultBodyLimit::max(PHOTO_BODY_LIMIT)),
        )
        .route("/{id}/photos", post(produtos::add_photo))
        .route("/{id}/photos/{photo_id}", delete(produtos::delete_photo))
}
