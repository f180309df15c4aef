//! Route definitions for the `/auth` resource.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::auth;
use crate::state::AppState;

/// Routes mounted at `/auth`.
///
/// ```text
/// POST   /login                   -> login (public, rate limited)
/// POST   /logout                  -> logout
/// GET    /session                 -> session
/// POST   /session/extend          -> extend
/// POST   /signup/modelo           -> signup_modelo (public)
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/login", post(auth::login))
        .route("/logout", post(auth::logout))
        .route("/session", get(auth::session))
        .route("/session/extend", post(auth::extend))
        .route("/signup/modelo", post(auth::signup_modelo))
}
