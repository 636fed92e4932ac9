use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult};
use uuid::Uuid;

use agora_core::domain::{Level, Post, PostStatus};
use agora_core::ports::{BaseRepository, BookmarkRepository, PostRepository, UserRepository};

use crate::database::entity::{post, user};
use crate::database::postgres_repo::{
    PostgresBookmarkRepository, PostgresPostRepository, PostgresUserRepository,
};

fn post_model(id: Uuid, status_code: i16) -> post::Model {
    let now = chrono::Utc::now();
    post::Model {
        id,
        user_id: Uuid::new_v4(),
        content: "Content".to_owned(),
        status_code,
        created_at: now.into(),
        updated_at: now.into(),
    }
}

#[tokio::test]
async fn test_find_post_by_id() {
    let post_id = Uuid::new_v4();

    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results(vec![vec![post_model(post_id, 2)]])
        .into_connection();

    let repo = PostgresPostRepository::new(db);

    let result: Option<Post> = repo.find_by_id(post_id).await.unwrap();

    let post = result.unwrap();
    assert_eq!(post.id, post_id);
    assert_eq!(post.status().unwrap(), PostStatus::Published);
}

#[tokio::test]
async fn test_corrupt_status_is_loaded_raw() {
    let post_id = Uuid::new_v4();
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results(vec![vec![post_model(post_id, 9)]])
        .into_connection();

    let repo = PostgresPostRepository::new(db);
    let post: Post = repo.find_by_id(post_id).await.unwrap().unwrap();

    assert!(post.status().is_err());
}

#[tokio::test]
async fn test_compare_and_set_reports_lost_race() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_exec_results(vec![
            MockExecResult {
                last_insert_id: 0,
                rows_affected: 1,
            },
            MockExecResult {
                last_insert_id: 0,
                rows_affected: 0,
            },
        ])
        .into_connection();

    let repo = PostgresPostRepository::new(db);
    let id = Uuid::new_v4();
    let now = chrono::Utc::now();

    let first = repo
        .compare_and_set_status(id, PostStatus::Pending, PostStatus::Published, now)
        .await
        .unwrap();
    let second = repo
        .compare_and_set_status(id, PostStatus::Pending, PostStatus::Published, now)
        .await
        .unwrap();

    assert!(first);
    assert!(!second);
}

#[tokio::test]
async fn test_update_if_status_reports_missing_row() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_exec_results(vec![MockExecResult {
            last_insert_id: 0,
            rows_affected: 0,
        }])
        .into_connection();

    let repo = PostgresPostRepository::new(db);
    let draft = Post::new(Uuid::new_v4(), "edited".into(), false, chrono::Utc::now()).unwrap();

    let applied = repo.update_if_status(&draft, PostStatus::Draft).await.unwrap();
    assert!(!applied);
}

#[tokio::test]
async fn test_find_users_by_level() {
    let now = chrono::Utc::now();
    let verifier = user::Model {
        id: Uuid::new_v4(),
        email: "verifier@example.com".to_owned(),
        password_hash: "hash".to_owned(),
        display_name: Some("Vera".to_owned()),
        handle: Some("@vera".to_owned()),
        level: 5,
        created_at: now.into(),
        updated_at: now.into(),
    };

    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results(vec![vec![verifier.clone()]])
        .into_connection();

    let repo = PostgresUserRepository::new(db);
    let users = repo.find_by_level(Level::VERIFIER).await.unwrap();

    assert_eq!(users.len(), 1);
    assert_eq!(users[0].id, verifier.id);
    assert_eq!(users[0].level().unwrap(), Level::VERIFIER);
}

#[tokio::test]
async fn test_bookmark_toggle_removes_existing() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_exec_results(vec![MockExecResult {
            last_insert_id: 0,
            rows_affected: 1,
        }])
        .into_connection();

    let repo = PostgresBookmarkRepository::new(db);
    let bookmarked = repo
        .toggle(Uuid::new_v4(), Uuid::new_v4(), chrono::Utc::now())
        .await
        .unwrap();

    assert!(!bookmarked);
}
