pub mod admin;
pub mod arquiteto;
pub mod auth;
pub mod health;
pub mod intencoes;
pub mod media;
pub mod modelo;
pub mod produtos;
pub mod projetos;
pub mod session;
pub mod super_admin;

use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::Router;

use crate::handlers;
use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /auth/login                                      login (public)
/// /auth/logout                                     logout
/// /auth/session                                    current session
/// /auth/session/extend                             fresh token
/// /auth/signup/modelo                              self-registration (public)
///
/// /admin/users                                     list, create
/// /admin/users/{id}                                get, update, delete
/// /admin/users/upload-profile-image               profile picture (POST)
/// /admin/reports                                   recent users, counts by role
///
/// /users/{id}/profile-image                        signed profile picture URL
///
/// /arquiteto/users/search-by-cpf                   subject lookup
/// /arquiteto/users/search                          name, email or CPF lookup
/// /arquiteto/users/reset-password                  set a user's password (POST)
/// /arquiteto/ensaios                               list, create
/// /arquiteto/ensaios/limpar-deletados              purge old deletions (POST)
/// /arquiteto/ensaios/{id}                          get, update, delete
/// /arquiteto/ensaios/{id}/restore                  undo delete (POST)
/// /arquiteto/ensaios/{id}/term                     consent term PDF (POST)
/// /arquiteto/ensaios/{id}/photos                   add (POST), reorder (PUT)
/// /arquiteto/ensaios/{id}/photos/{photo_id}        delete
/// /arquiteto/solicitacoes                          list change requests
/// /arquiteto/solicitacoes/{id}                     approve or reject (PATCH)
///
/// /modelo/ensaios                                  own published ensaios
/// /modelo/ensaios/{id}                             one of them
/// /modelo/solicitacoes                             list, file change request
///
/// /ensaios/{id}/photos                             signed photo URLs
/// /ensaios/{id}/term                               signed consent term URL
/// /ensaios/{id}/sync-link                          sync folder link (staff)
///
/// /profile                                         get, update
/// /profile/password                                change password (POST)
///
/// /produtos                                        list, create
/// /produtos/{id}                                   get, update, delete
/// /produtos/{id}/cover                             signed cover URL
/// /produtos/upload-photo                           multipart photo (POST)
/// /produtos/{id}/photos                            add photo (POST)
/// /produtos/{id}/photos/{photo_id}                 delete photo
///
/// /projetos                                        list, create
/// /projetos/{id}                                   get, update, delete
///
/// /intencoes                                       list, create
/// /intencoes/{id}/status                           transition (PATCH)
///
/// /media/upload                                    multipart upload (POST)
/// /media/sign                                      signed URL for a photo
/// /log-error                                       client media error (public)
///
/// /session/secure-url                              issue secure link (POST)
/// /session/revoke                                  revoke own links (POST)
///
/// /audit-logs                                      audit trail
/// /currency/eur-brl                                exchange rate
///
/// /super-admin/certificates                        list, upload
/// /super-admin/certificates/{id}                   deactivate
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/auth", auth::router())
        .nest("/admin", admin::router())
        .nest("/arquiteto", arquiteto::router())
        .nest("/modelo", modelo::router())
        .route("/ensaios/{id}/photos", get(handlers::modelo::signed_photos))
        .route("/ensaios/{id}/term", get(handlers::ensaios::term_url))
        .route("/ensaios/{id}/sync-link", get(handlers::ensaios::sync_link))
        .route(
            "/users/{id}/profile-image",
            get(handlers::users::profile_image),
        )
        .route(
            "/profile",
            get(handlers::profile::get_profile).patch(handlers::profile::update_profile),
        )
        .route(
            "/profile/password",
            post(handlers::profile::change_password),
        )
        .nest("/produtos", produtos::router())
        .nest("/projetos", projetos::router())
        .nest("/intencoes", intencoes::router())
        .nest("/media", media::router())
        .route(
            "/log-error",
            post(handlers::media::log_client_error)
                .layer(DefaultBodyLimit::max(handlers::media::CLIENT_ERROR_BODY_LIMIT)),
        )
        .nest("/session", session::router())
        .route("/audit-logs", get(handlers::audit::list_audit_logs))
        .route("/currency/eur-brl", get(handlers::currency::eur_brl))
        .nest("/super-admin", super_admin::router())
}
