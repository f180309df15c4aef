//! Soft-delete visibility across ensaios, produtos, and projetos.
//!
//! Checks that deleted rows disappear from `find_by_id` and listings, that
//! deleted ensaios become purgeable, and that hard-delete removes photos.

use chrono::{Duration, Utc};
use sqlx::PgPool;
use tna_db::models::ensaio::{CreateEnsaio, Ensaio};
use tna_db::models::produto::CreateProduto;
use tna_db::models::projeto::CreateProjeto;
use tna_db::models::user::CreateUser;
use tna_db::repositories::{EnsaioPhotoRepo, EnsaioRepo, ProdutoRepo, ProjetoRepo, UserRepo};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

async fn seed_user(pool: &PgPool, email: &str, role: &str, cpf: Option<&str>) -> i64 {
    UserRepo::create(
        pool,
        &CreateUser {
            email: email.to_string(),
            name: Some("Test".to_string()),
            password_hash: "hash".to_string(),
            role: role.to_string(),
            cpf: cpf.map(str::to_string),
            phone: None,
            passport: None,
            birth_date: None,
        },
    )
    .await
    .unwrap()
    .id
}

async fn insert_ensaio(pool: &PgPool, input: &CreateEnsaio) -> Result<Ensaio, sqlx::Error> {
    EnsaioRepo::create_with_links(pool, input, &[], &[], &[])
        .await
        .map(|(ensaio, _)| ensaio)
}

fn new_ensaio(created_by_id: i64, slug: &str, cpf: &str) -> CreateEnsaio {
    CreateEnsaio {
        title: "Ensaio".to_string(),
        slug: slug.to_string(),
        description: None,
        shoot_date: None,
        status: None,
        created_by_id,
        subject_cpf: cpf.to_string(),
        cover_image_key: None,
        term_pdf_key: None,
        sync_folder_url: None,
    }
}

// ---------------------------------------------------------------------------
// Ensaios
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_ensaio_soft_delete_hides_row(pool: PgPool) {
    let arq = seed_user(&pool, "arq@example.com", "ARQUITETO", None).await;
    let ensaio = insert_ensaio(&pool, &new_ensaio(arq, "verao", "52998224725"))
        .await
        .unwrap();
    assert_eq!(ensaio.status, "PUBLISHED");

    assert!(EnsaioRepo::soft_delete(&pool, ensaio.id).await.unwrap());
    assert!(!EnsaioRepo::soft_delete(&pool, ensaio.id).await.unwrap());

    assert!(EnsaioRepo::find_by_id(&pool, ensaio.id).await.unwrap().is_none());
    let deleted = EnsaioRepo::find_by_id_include_deleted(&pool, ensaio.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(deleted.status, "DELETED");
    assert!(deleted.deleted_at.is_some());

    let listed = EnsaioRepo::list(&pool, Some(arq), None).await.unwrap();
    assert!(listed.is_empty());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_ensaio_restore_returns_as_draft(pool: PgPool) {
    let arq = seed_user(&pool, "arq@example.com", "ARQUITETO", None).await;
    let ensaio = insert_ensaio(&pool, &new_ensaio(arq, "restauro", "52998224725"))
        .await
        .unwrap();
    EnsaioRepo::soft_delete(&pool, ensaio.id).await.unwrap();

    assert!(EnsaioRepo::restore(&pool, ensaio.id).await.unwrap());
    let restored = EnsaioRepo::find_by_id(&pool, ensaio.id).await.unwrap().unwrap();
    assert_eq!(restored.status, "DRAFT");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_subject_sees_only_published(pool: PgPool) {
    let arq = seed_user(&pool, "arq@example.com", "ARQUITETO", None).await;
    let cpf = "52998224725";

    insert_ensaio(&pool, &new_ensaio(arq, "publicado", cpf)).await.unwrap();
    let mut draft = new_ensaio(arq, "rascunho", cpf);
    draft.status = Some("DRAFT".to_string());
    insert_ensaio(&pool, &draft).await.unwrap();
    let gone = insert_ensaio(&pool, &new_ensaio(arq, "apagado", cpf)).await.unwrap();
    EnsaioRepo::soft_delete(&pool, gone.id).await.unwrap();

    let visible = EnsaioRepo::list_published_for_subject(&pool, cpf).await.unwrap();
    assert_eq!(visible.len(), 1);
    assert_eq!(visible[0].slug, "publicado");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_purge_removes_row_and_photos(pool: PgPool) {
    let arq = seed_user(&pool, "arq@example.com", "ARQUITETO", None).await;
    let keys = vec!["a.jpg".to_string(), "b.jpg".to_string()];
    let (ensaio, photos) =
        EnsaioRepo::create_with_links(&pool, &new_ensaio(arq, "purga", "52998224725"), &[], &[], &keys)
            .await
            .unwrap();
    assert_eq!(photos, 2);
    EnsaioRepo::soft_delete(&pool, ensaio.id).await.unwrap();

    // Deleted just now: not yet older than a cutoff in the past.
    let week_ago = Utc::now() - Duration::days(7);
    assert!(EnsaioRepo::list_purgeable(&pool, arq, week_ago).await.unwrap().is_empty());

    let purgeable = EnsaioRepo::list_purgeable(&pool, arq, Utc::now() + Duration::seconds(1))
        .await
        .unwrap();
    assert_eq!(purgeable.len(), 1);
    assert_eq!(EnsaioPhotoRepo::list_all_keys(&pool, ensaio.id).await.unwrap(), keys);

    assert!(EnsaioRepo::hard_delete(&pool, ensaio.id).await.unwrap());
    assert!(EnsaioPhotoRepo::list_all_keys(&pool, ensaio.id).await.unwrap().is_empty());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_create_with_unknown_link_leaves_nothing(pool: PgPool) {
    let arq = seed_user(&pool, "arq@example.com", "ARQUITETO", None).await;
    let keys = vec!["a.jpg".to_string()];
    let result = EnsaioRepo::create_with_links(
        &pool,
        &new_ensaio(arq, "orfao", "52998224725"),
        &[987_654],
        &[],
        &keys,
    )
    .await;
    assert!(result.is_err());

    // The row, its photos and the slug were rolled back together.
    assert!(!EnsaioRepo::slug_exists(&pool, "orfao", None).await.unwrap());
    let photos: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM ensaio_photos")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(photos, 0);
    insert_ensaio(&pool, &new_ensaio(arq, "orfao", "52998224725")).await.unwrap();
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_photos_keep_index_order(pool: PgPool) {
    let arq = seed_user(&pool, "arq@example.com", "ARQUITETO", None).await;
    let keys: Vec<String> = ["x.jpg", "y.jpg", "z.jpg"].iter().map(|k| k.to_string()).collect();
    let (ensaio, _) =
        EnsaioRepo::create_with_links(&pool, &new_ensaio(arq, "ordem", "52998224725"), &[], &[], &keys)
            .await
            .unwrap();

    let photos = EnsaioPhotoRepo::list_for_ensaio(&pool, ensaio.id).await.unwrap();
    let orders: Vec<i32> = photos.iter().map(|p| p.sort_order).collect();
    assert_eq!(orders, vec![0, 1, 2]);

    EnsaioPhotoRepo::soft_delete(&pool, photos[1].id).await.unwrap();
    assert_eq!(EnsaioPhotoRepo::count_for_ensaio(&pool, ensaio.id).await.unwrap(), 2);
}

// ---------------------------------------------------------------------------
// Catalog
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_produto_soft_delete_hides_from_listing(pool: PgPool) {
    let produto = ProdutoRepo::create(
        &pool,
        &CreateProduto {
            slug: "album".to_string(),
            nome: "Álbum".to_string(),
            short_description: None,
            full_description: None,
            preco_euro: Some(120.0),
            categoria: Some("impressos".to_string()),
            cover_image_key: None,
            display_order: None,
        },
    )
    .await
    .unwrap();

    let listed = ProdutoRepo::list_active(&pool, None).await.unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].ensaio_count, 0);

    assert!(ProdutoRepo::soft_delete(&pool, produto.id).await.unwrap());
    assert!(ProdutoRepo::find_by_id(&pool, produto.id).await.unwrap().is_none());
    assert!(ProdutoRepo::list_active(&pool, None).await.unwrap().is_empty());
    // The slug stays reserved by the deleted row.
    assert!(ProdutoRepo::slug_exists(&pool, "album", None).await.unwrap());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_projeto_active_filter(pool: PgPool) {
    for (name, active) in [("Alpha", true), ("Beta", false)] {
        ProjetoRepo::create(
            &pool,
            &CreateProjeto {
                name: name.to_string(),
                slug: name.to_lowercase(),
                description: None,
                active: Some(active),
            },
        )
        .await
        .unwrap();
    }

    assert_eq!(ProjetoRepo::list(&pool, false).await.unwrap().len(), 2);
    let active = ProjetoRepo::list(&pool, true).await.unwrap();
    assert_eq!(active.len(), 1);
    assert_eq!(active[0].projeto.name, "Alpha");
}
