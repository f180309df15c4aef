//! Password resets, user search and profile pictures over HTTP.

mod common;

use std::sync::Arc;
use std::time::Duration;

use axum::http::StatusCode;
use common::{
    body_json, create_user, get_auth, post_json, post_json_auth, post_multipart_auth,
    test_config, token_for,
};
use serde_json::{json, Value};
use sqlx::PgPool;
use tna_storage::MemoryStore;

const PNG: &[u8] = &[0x89, b'P', b'N', b'G', 0x0d, 0x0a];

fn emails(listed: &Value) -> Vec<String> {
    listed["data"]
        .as_array()
        .expect("data array")
        .iter()
        .map(|u| u["email"].as_str().unwrap_or_default().to_string())
        .collect()
}

// ---------------------------------------------------------------------------
// Password reset
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn reset_password_replaces_the_login_secret(pool: PgPool) {
    let arq = create_user(&pool, "arq@tna.test", "ARQUITETO", None).await;
    let modelo = create_user(&pool, "modelo@tna.test", "MODELO", Some("12345678901")).await;
    let app = common::build_test_app(pool);
    let token = token_for(arq.id, "ARQUITETO");
    let uri = "/api/v1/arquiteto/users/reset-password";

    let response = post_json_auth(
        app.clone(),
        uri,
        json!({ "user_id": modelo.id, "new_password": "curta" }),
        &token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = post_json_auth(
        app.clone(),
        uri,
        json!({ "user_id": modelo.id + 1000, "new_password": "Senha-nova-456" }),
        &token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = post_json_auth(
        app.clone(),
        uri,
        json!({ "user_id": modelo.id, "new_password": "Senha-nova-456" }),
        &token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["data"]["user_id"], modelo.id);

    let response = post_json(
        app.clone(),
        "/api/v1/auth/login",
        json!({ "email": "modelo@tna.test", "password": common::PASSWORD }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = post_json(
        app,
        "/api/v1/auth/login",
        json!({ "email": "modelo@tna.test", "password": "Senha-nova-456" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn only_writers_reset_passwords(pool: PgPool) {
    let admin = create_user(&pool, "admin@tna.test", "ADMIN", None).await;
    let modelo = create_user(&pool, "modelo@tna.test", "MODELO", Some("12345678901")).await;
    let app = common::build_test_app(pool);

    let response = post_json_auth(
        app,
        "/api/v1/arquiteto/users/reset-password",
        json!({ "user_id": modelo.id, "new_password": "Senha-nova-456" }),
        &token_for(admin.id, "ADMIN"),
    )
    .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

// ---------------------------------------------------------------------------
// Search
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn search_matches_subjects_by_name_email_or_cpf(pool: PgPool) {
    let arq = create_user(&pool, "arq@tna.test", "ARQUITETO", None).await;
    let ana = create_user(&pool, "ana@tna.test", "MODELO", Some("12345678901")).await;
    create_user(&pool, "bruno@tna.test", "CLIENTE", Some("98765432100")).await;
    create_user(&pool, "ana.admin@tna.test", "ADMIN", None).await;
    let app = common::build_test_app(pool);
    let token = token_for(arq.id, "ARQUITETO");
    let search = |query: &str| format!("/api/v1/arquiteto/users/search?{query}");

    let listed = body_json(get_auth(app.clone(), &search("q=a"), &token).await).await;
    assert!(emails(&listed).is_empty());

    // Staff accounts never show up.
    let listed = body_json(get_auth(app.clone(), &search("q=ana"), &token).await).await;
    assert_eq!(emails(&listed), vec!["ana@tna.test"]);

    let listed = body_json(get_auth(app.clone(), &search("q=765432"), &token).await).await;
    assert_eq!(emails(&listed), vec!["bruno@tna.test"]);

    let listed = body_json(get_auth(app.clone(), &search("q=tna.test&role=CLIENTE"), &token).await).await;
    assert_eq!(emails(&listed), vec!["bruno@tna.test"]);

    let response = get_auth(app.clone(), &search("q=tna&role=ADMIN"), &token).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = get_auth(app, &search("q=ana"), &token_for(ana.id, "MODELO")).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

// ---------------------------------------------------------------------------
// Profile image
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn profile_image_upload_and_read(pool: PgPool) {
    let arq = create_user(&pool, "arq@tna.test", "ARQUITETO", None).await;
    let admin = create_user(&pool, "admin@tna.test", "ADMIN", None).await;
    let modelo = create_user(&pool, "modelo@tna.test", "MODELO", Some("12345678901")).await;
    let outra = create_user(&pool, "outra@tna.test", "MODELO", Some("98765432100")).await;

    let config = test_config();
    let store = Arc::new(MemoryStore::new(config.bucket.clone()));
    let (app, _) = common::build_app(pool, config, store.clone());
    let token = token_for(arq.id, "ARQUITETO");
    let modelo_token = token_for(modelo.id, "MODELO");
    let image_uri = format!("/api/v1/users/{}/profile-image", modelo.id);

    let response = get_auth(app.clone(), &image_uri, &modelo_token).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let user_id = modelo.id.to_string();
    let upload = |content_type: &'static str| {
        let app = app.clone();
        let user_id = user_id.clone();
        let token = token.clone();
        async move {
            post_multipart_auth(
                app,
                "/api/v1/admin/users/upload-profile-image",
                &[("user_id", user_id.as_str())],
                Some((content_type, PNG.to_vec())),
                &token,
            )
            .await
        }
    };

    assert_eq!(upload("image/gif").await.status(), StatusCode::BAD_REQUEST);

    let response = upload("image/png").await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let first_key = body_json(response).await["data"]["key"].as_str().unwrap().to_string();
    assert!(first_key.starts_with(&format!("profile-images/{}-", modelo.id)));
    assert!(store.contains(&first_key).await);

    let response = get_auth(app.clone(), &image_uri, &modelo_token).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()["cache-control"], "no-store, private");
    let url = body_json(response).await["data"]["url"].as_str().unwrap().to_string();
    assert!(url.contains(&first_key));

    let response = get_auth(app.clone(), &image_uri, &token_for(outra.id, "MODELO")).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = get_auth(app.clone(), &image_uri, &token_for(admin.id, "ADMIN")).await;
    assert_eq!(response.status(), StatusCode::OK);

    // Keys carry a millisecond timestamp.
    tokio::time::sleep(Duration::from_millis(5)).await;
    let response = upload("image/png").await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let second_key = body_json(response).await["data"]["key"].as_str().unwrap().to_string();
    assert_ne!(first_key, second_key);
    assert!(store.contains(&second_key).await);
    assert!(!store.contains(&first_key).await);

    let detail = body_json(
        get_auth(app, &format!("/api/v1/admin/users/{}", modelo.id), &token).await,
    )
    .await;
    assert_eq!(detail["data"]["has_profile_image"], true);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn profile_image_for_unknown_user_is_not_stored(pool: PgPool) {
    let arq = create_user(&pool, "arq@tna.test", "ARQUITETO", None).await;
    let config = test_config();
    let store = Arc::new(MemoryStore::new(config.bucket.clone()));
    let (app, _) = common::build_app(pool, config, store.clone());

    let response = post_multipart_auth(
        app,
        "/api/v1/admin/users/upload-profile-image",
        &[("user_id", "999999")],
        Some(("image/png", PNG.to_vec())),
        &token_for(arq.id, "ARQUITETO"),
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert!(store.is_empty().await);
}
