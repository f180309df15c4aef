//! Architect sessions, change requests, and audit queries.

use chrono::{Duration, Utc};
use sqlx::PgPool;
use tna_db::models::audit::{AuditQuery, CreateAuditLog};
use tna_db::models::change_request::CreateChangeRequest;
use tna_db::models::user::{CreateUser, UpdateUser};
use tna_db::repositories::{ArquitetoSessionRepo, AuditRepo, ChangeRequestRepo, UserRepo};

async fn seed_user(pool: &PgPool, email: &str, role: &str) -> i64 {
    UserRepo::create(
        pool,
        &CreateUser {
            email: email.to_string(),
            name: None,
            password_hash: "hash".to_string(),
            role: role.to_string(),
            cpf: None,
            phone: None,
            passport: None,
            birth_date: None,
        },
    )
    .await
    .unwrap()
    .id
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_new_login_demotes_previous_session(pool: PgPool) {
    let arq = seed_user(&pool, "arq@example.com", "ARQUITETO").await;
    let expires = Utc::now() + Duration::hours(8);

    ArquitetoSessionRepo::activate(&pool, arq, "first", expires).await.unwrap();
    ArquitetoSessionRepo::activate(&pool, arq, "second", expires).await.unwrap();

    let first = ArquitetoSessionRepo::find_by_session_id(&pool, "first")
        .await
        .unwrap()
        .unwrap();
    assert!(!first.is_active);

    let active = ArquitetoSessionRepo::find_active_for_user(&pool, arq)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(active.session_id, "second");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_extend_never_restores_write_power(pool: PgPool) {
    let arq = seed_user(&pool, "arq@example.com", "ARQUITETO").await;
    let expires = Utc::now() + Duration::hours(8);
    let later = expires + Duration::hours(8);

    ArquitetoSessionRepo::activate(&pool, arq, "demoted", expires).await.unwrap();
    ArquitetoSessionRepo::activate(&pool, arq, "logged-out", expires).await.unwrap();
    assert!(ArquitetoSessionRepo::delete_by_session_id(&pool, "logged-out").await.unwrap());
    ArquitetoSessionRepo::activate(&pool, arq, "current", expires).await.unwrap();

    assert!(!ArquitetoSessionRepo::extend_active(&pool, arq, "demoted", later).await.unwrap());
    assert!(!ArquitetoSessionRepo::extend_active(&pool, arq, "logged-out", later).await.unwrap());
    assert!(ArquitetoSessionRepo::find_by_session_id(&pool, "logged-out")
        .await
        .unwrap()
        .is_none());

    let demoted = ArquitetoSessionRepo::find_by_session_id(&pool, "demoted")
        .await
        .unwrap()
        .unwrap();
    assert!(!demoted.is_active);

    assert!(ArquitetoSessionRepo::extend_active(&pool, arq, "current", later).await.unwrap());
    let current = ArquitetoSessionRepo::find_active_for_user(&pool, arq)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(current.session_id, "current");
    assert!(current.expires_at > expires);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_extend_ignores_other_users_session(pool: PgPool) {
    let arq = seed_user(&pool, "arq@example.com", "ARQUITETO").await;
    let other = seed_user(&pool, "outro@example.com", "ARQUITETO").await;
    let expires = Utc::now() + Duration::hours(8);
    ArquitetoSessionRepo::activate(&pool, arq, "mine", expires).await.unwrap();

    assert!(!ArquitetoSessionRepo::extend_active(&pool, other, "mine", expires + Duration::hours(1))
        .await
        .unwrap());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_expired_sessions_are_cleaned(pool: PgPool) {
    let arq = seed_user(&pool, "arq@example.com", "ARQUITETO").await;
    ArquitetoSessionRepo::activate(&pool, arq, "old", Utc::now() - Duration::minutes(1))
        .await
        .unwrap();
    ArquitetoSessionRepo::activate(&pool, arq, "live", Utc::now() + Duration::hours(1))
        .await
        .unwrap();

    assert_eq!(ArquitetoSessionRepo::delete_expired(&pool).await.unwrap(), 1);
    assert!(ArquitetoSessionRepo::find_by_session_id(&pool, "old").await.unwrap().is_none());
    assert!(ArquitetoSessionRepo::delete_by_session_id(&pool, "live").await.unwrap());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_change_request_resolves_once(pool: PgPool) {
    let modelo = seed_user(&pool, "modelo@example.com", "MODELO").await;
    let arq = seed_user(&pool, "arq@example.com", "ARQUITETO").await;

    let request = ChangeRequestRepo::create(
        &pool,
        &CreateChangeRequest {
            user_id: modelo,
            field: "phone".to_string(),
            old_value: None,
            new_value: "+5511987654321".to_string(),
        },
    )
    .await
    .unwrap();
    assert_eq!(request.status, "PENDING");
    assert!(ChangeRequestRepo::has_pending(&pool, modelo, "phone").await.unwrap());

    let approved = ChangeRequestRepo::resolve(&pool, request.id, "APPROVED", arq, None)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(approved.reviewed_by_id, Some(arq));
    assert!(ChangeRequestRepo::resolve(&pool, request.id, "REJECTED", arq, Some("no"))
        .await
        .unwrap()
        .is_none());
    assert!(!ChangeRequestRepo::has_pending(&pool, modelo, "phone").await.unwrap());
}

async fn pending_request(pool: &PgPool, user_id: i64, field: &str, new_value: &str) -> i64 {
    ChangeRequestRepo::create(
        pool,
        &CreateChangeRequest {
            user_id,
            field: field.to_string(),
            old_value: None,
            new_value: new_value.to_string(),
        },
    )
    .await
    .unwrap()
    .id
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_approve_applies_change_once(pool: PgPool) {
    let modelo = seed_user(&pool, "modelo@example.com", "MODELO").await;
    let arq = seed_user(&pool, "arq@example.com", "ARQUITETO").await;
    let id = pending_request(&pool, modelo, "name", "Nome Novo").await;

    let change = UpdateUser {
        name: Some("Nome Novo".to_string()),
        ..Default::default()
    };
    let approved = ChangeRequestRepo::approve(&pool, id, arq, &change)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(approved.status, "APPROVED");
    let user = UserRepo::find_by_id(&pool, modelo).await.unwrap().unwrap();
    assert_eq!(user.name.as_deref(), Some("Nome Novo"));

    let again = UpdateUser {
        name: Some("Outro Nome".to_string()),
        ..Default::default()
    };
    assert!(ChangeRequestRepo::approve(&pool, id, arq, &again).await.unwrap().is_none());
    let user = UserRepo::find_by_id(&pool, modelo).await.unwrap().unwrap();
    assert_eq!(user.name.as_deref(), Some("Nome Novo"));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_failed_approval_leaves_request_pending(pool: PgPool) {
    let modelo = seed_user(&pool, "modelo@example.com", "MODELO").await;
    let arq = seed_user(&pool, "arq@example.com", "ARQUITETO").await;
    let id = pending_request(&pool, modelo, "email", "arq@example.com").await;

    // The target email belongs to another account, so the user update fails.
    let change = UpdateUser {
        email: Some("arq@example.com".to_string()),
        ..Default::default()
    };
    assert!(ChangeRequestRepo::approve(&pool, id, arq, &change).await.is_err());

    let request = ChangeRequestRepo::find_by_id(&pool, id).await.unwrap().unwrap();
    assert_eq!(request.status, "PENDING");
    assert!(request.reviewed_by_id.is_none());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_audit_query_filters(pool: PgPool) {
    let arq = seed_user(&pool, "arq@example.com", "ARQUITETO").await;
    for (entity, entity_id) in [("Ensaio", "1"), ("Ensaio", "2"), ("Produto", "1")] {
        AuditRepo::insert(
            &pool,
            &CreateAuditLog {
                actor_id: Some(arq),
                action: "CREATE".to_string(),
                entity: entity.to_string(),
                entity_id: entity_id.to_string(),
                metadata: None,
                signature: "sig".to_string(),
            },
        )
        .await
        .unwrap();
    }

    let params = AuditQuery {
        entity: Some("Ensaio".to_string()),
        ..Default::default()
    };
    assert_eq!(AuditRepo::query(&pool, &params).await.unwrap().len(), 2);
    assert_eq!(AuditRepo::count(&pool, &params).await.unwrap(), 2);

    let paged = AuditQuery {
        limit: Some(1),
        offset: Some(1),
        ..Default::default()
    };
    assert_eq!(AuditRepo::query(&pool, &paged).await.unwrap().len(), 1);
}
