//! Integration tests for User repository using in-memory SurrealDB.

use rolekeep_core::error::RolekeepError;
use rolekeep_core::models::user::CreateUser;
use rolekeep_core::repository::UserRepository;
use rolekeep_db::repository::SurrealUserRepository;
use surrealdb::Surreal;
use surrealdb::engine::local::{Db, Mem};
use uuid::Uuid;

/// Helper: spin up in-memory DB and run migrations.
async fn setup() -> Surreal<Db> {
    let db = Surreal::new::<Mem>(()).await.unwrap();
    db.use_ns("test").use_db("test").await.unwrap();
    rolekeep_db::run_migrations(&db).await.unwrap();
    db
}

fn new_user(name: &str) -> CreateUser {
    CreateUser {
        id: None,
        name: name.into(),
        email: format!("{}@example.com", name.to_lowercase()),
    }
}

#[tokio::test]
async fn create_and_get_user() {
    let repo = SurrealUserRepository::new(setup().await);

    let user = repo.create(new_user("alice")).await.unwrap();

    assert_eq!(user.name, "alice");
    assert_eq!(user.email, "alice@example.com");

    let fetched = repo.get_by_id(user.id).await.unwrap();
    assert_eq!(fetched, user);
}

#[tokio::test]
async fn get_unknown_user_is_not_found() {
    let repo = SurrealUserRepository::new(setup().await);

    let err = repo.get_by_id(Uuid::new_v4()).await.unwrap_err();
    assert!(matches!(err, RolekeepError::NotFound { .. }));
}

#[tokio::test]
async fn caller_supplied_id_is_used() {
    let repo = SurrealUserRepository::new(setup().await);
    let id = Uuid::new_v4();

    let user = repo
        .create(CreateUser {
            id: Some(id),
            ..new_user("bob")
        })
        .await
        .unwrap();

    assert_eq!(user.id, id);
}

#[tokio::test]
async fn duplicate_id_is_a_conflict() {
    let repo = SurrealUserRepository::new(setup().await);
    let id = Uuid::new_v4();

    let original = repo
        .create(CreateUser {
            id: Some(id),
            ..new_user("carol")
        })
        .await
        .unwrap();

    let err = repo
        .create(CreateUser {
            id: Some(id),
            ..new_user("mallory")
        })
        .await
        .unwrap_err();
    assert!(matches!(err, RolekeepError::AlreadyExists { .. }));

    let fetched = repo.get_by_id(id).await.unwrap();
    assert_eq!(fetched, original);
}

#[tokio::test]
async fn invalid_input_is_rejected_before_write() {
    let repo = SurrealUserRepository::new(setup().await);

    let err = repo
        .create(CreateUser {
            id: None,
            name: "dave".into(),
            email: "not-an-email".into(),
        })
        .await
        .unwrap_err();
    assert!(matches!(err, RolekeepError::Validation { .. }));

    assert!(repo.list(None).await.unwrap().is_empty());
}

#[tokio::test]
async fn list_without_filter_returns_everyone() {
    let repo = SurrealUserRepository::new(setup().await);

    for name in ["alice", "bob", "carol"] {
        repo.create(new_user(name)).await.unwrap();
    }

    let users = repo.list(None).await.unwrap();
    assert_eq!(users.len(), 3);
}

#[tokio::test]
async fn name_filter_is_case_insensitive_substring() {
    let repo = SurrealUserRepository::new(setup().await);

    for name in ["Ann", "annette", "JoANNa", "Bob", "Anders"] {
        repo.create(new_user(name)).await.unwrap();
    }

    let mut names: Vec<String> = repo
        .list(Some("ann"))
        .await
        .unwrap()
        .into_iter()
        .map(|u| u.name)
        .collect();
    names.sort();

    assert_eq!(names, vec!["Ann", "JoANNa", "annette"]);
}

#[tokio::test]
async fn empty_filter_behaves_like_no_filter() {
    let repo = SurrealUserRepository::new(setup().await);

    repo.create(new_user("alice")).await.unwrap();

    assert_eq!(repo.list(Some("")).await.unwrap().len(), 1);
}
