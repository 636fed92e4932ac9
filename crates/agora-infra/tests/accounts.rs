//! Level management and peer verification over in-memory adapters.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use uuid::Uuid;

use agora_core::domain::{Level, User, VerificationDecision};
use agora_core::ports::BaseRepository;
use agora_core::services::{
    BookmarkService, PostService, UserService, VerificationConfig, VerificationService,
};
use agora_core::DomainError;
use agora_infra::{
    InMemoryBookmarkRepository, InMemoryCache, InMemoryPostRepository, InMemoryUserRepository,
};

struct Harness {
    users: Arc<InMemoryUserRepository>,
    accounts: UserService,
    posts: PostService,
    bookmarks: BookmarkService,
    verification: VerificationService,
}

fn harness(code_ttl: Duration) -> Harness {
    let users = Arc::new(InMemoryUserRepository::new());
    let post_repo = Arc::new(InMemoryPostRepository::new());
    let bookmark_repo = Arc::new(InMemoryBookmarkRepository::new());
    let cache = Arc::new(InMemoryCache::new());

    Harness {
        accounts: UserService::new(users.clone(), post_repo.clone(), bookmark_repo.clone()),
        posts: PostService::new(post_repo.clone(), bookmark_repo.clone()),
        bookmarks: BookmarkService::new(bookmark_repo, post_repo),
        verification: VerificationService::new(users.clone(), cache, VerificationConfig { code_ttl }),
        users,
    }
}

impl Harness {
    async fn user(&self, email: &str, level: i16) -> User {
        let mut user = User::new(email.to_string(), "hash".to_string(), None);
        user.set_level(Level::new(level).unwrap(), Utc::now());
        self.users.save(user).await.unwrap()
    }
}

fn default_harness() -> Harness {
    harness(Duration::from_secs(900))
}

#[tokio::test]
async fn test_register_starts_unverified_and_rejects_duplicates() {
    let h = default_harness();
    let user = h
        .accounts
        .register(" Alice@Example.com ".into(), "hash".into(), Some("Alice".into()))
        .await
        .unwrap();
    assert_eq!(user.email, "alice@example.com");
    assert_eq!(user.level().unwrap(), Level::UNVERIFIED);

    let dup = h
        .accounts
        .register("alice@example.com".into(), "hash".into(), None)
        .await;
    assert!(matches!(dup, Err(DomainError::Duplicate(_))));
}

#[tokio::test]
async fn test_band_admin_cannot_assign_outside_band() {
    let h = default_harness();
    let admin = h.user("admin8@example.com", 8).await;
    let target = h.user("target@example.com", 5).await;

    let result = h.accounts.set_level(&admin, target.id, 3, Utc::now()).await;
    assert!(matches!(result, Err(DomainError::ForbiddenAction(_))));

    let promoted = h.accounts.set_level(&admin, target.id, 7, Utc::now()).await.unwrap();
    assert_eq!(promoted.level().unwrap(), Level::new(7).unwrap());
}

#[tokio::test]
async fn test_set_level_rejects_out_of_range_value() {
    let h = default_harness();
    let root = h.user("root@example.com", 9).await;
    let target = h.user("target@example.com", 1).await;

    let result = h.accounts.set_level(&root, target.id, 10, Utc::now()).await;
    assert!(matches!(result, Err(DomainError::InvalidLevel(10))));
}

#[tokio::test]
async fn test_cannot_reach_users_above_own_delegation() {
    let h = default_harness();
    let moderator = h.user("mod@example.com", 6).await;
    let senior = h.user("senior@example.com", 7).await;

    let result = h.accounts.set_level(&moderator, senior.id, 2, Utc::now()).await;
    assert!(matches!(result, Err(DomainError::ForbiddenAction(_))));

    let own = h.accounts.set_level(&moderator, moderator.id, 5, Utc::now()).await;
    assert!(matches!(own, Err(DomainError::ForbiddenAction(_))));
}

#[tokio::test]
async fn test_user_directory_requires_manager_level() {
    let h = default_harness();
    let verifier = h.user("verifier@example.com", 5).await;
    let manager = h.user("manager@example.com", 6).await;

    assert!(matches!(
        h.accounts.list_users(&verifier).await,
        Err(DomainError::ForbiddenAction(_))
    ));
    assert_eq!(h.accounts.list_users(&manager).await.unwrap().len(), 2);
    assert_eq!(h.accounts.verifiers().await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_verification_approve_flow() {
    let h = default_harness();
    let newcomer = h.user("new@example.com", 0).await;
    let verifier = h.user("verifier@example.com", 5).await;

    let issued = h
        .verification
        .request_code(&newcomer, verifier.id, Utc::now())
        .await
        .unwrap();
    assert_eq!(issued.code.len(), 6);

    let found = h.verification.check_code(&verifier, &issued.code).await.unwrap();
    assert_eq!(found.id, newcomer.id);

    let approved = h
        .verification
        .apply_decision(&verifier, newcomer.id, VerificationDecision::Approve, Utc::now())
        .await
        .unwrap();
    assert_eq!(approved.level().unwrap(), Level::VERIFIED);

    let reused = h.verification.check_code(&verifier, &issued.code).await;
    assert!(matches!(reused, Err(DomainError::Validation(_))));
}

#[tokio::test]
async fn test_verification_reject_keeps_level() {
    let h = default_harness();
    let newcomer = h.user("new@example.com", 0).await;
    let verifier = h.user("verifier@example.com", 5).await;

    h.verification
        .request_code(&newcomer, verifier.id, Utc::now())
        .await
        .unwrap();
    let rejected = h
        .verification
        .apply_decision(&verifier, newcomer.id, VerificationDecision::Reject, Utc::now())
        .await
        .unwrap();
    assert_eq!(rejected.level().unwrap(), Level::UNVERIFIED);
}

#[tokio::test]
async fn test_code_is_bound_to_chosen_verifier() {
    let h = default_harness();
    let newcomer = h.user("new@example.com", 0).await;
    let chosen = h.user("chosen@example.com", 5).await;
    let other = h.user("other@example.com", 5).await;
    let admin = h.user("admin@example.com", 9).await;

    let issued = h
        .verification
        .request_code(&newcomer, chosen.id, Utc::now())
        .await
        .unwrap();

    assert!(matches!(
        h.verification.check_code(&other, &issued.code).await,
        Err(DomainError::ForbiddenAction(_))
    ));
    // Only level 5 verifies, not administrators.
    assert!(matches!(
        h.verification.check_code(&admin, &issued.code).await,
        Err(DomainError::ForbiddenAction(_))
    ));
}

#[tokio::test]
async fn test_request_code_validation() {
    let h = default_harness();
    let member = h.user("member@example.com", 1).await;
    let newcomer = h.user("new@example.com", 0).await;
    let admin = h.user("admin@example.com", 9).await;

    assert!(matches!(
        h.verification.request_code(&member, admin.id, Utc::now()).await,
        Err(DomainError::ForbiddenAction(_))
    ));
    assert!(matches!(
        h.verification.request_code(&newcomer, admin.id, Utc::now()).await,
        Err(DomainError::Validation(_))
    ));
    assert!(matches!(
        h.verification.request_code(&newcomer, Uuid::new_v4(), Utc::now()).await,
        Err(DomainError::NotFound { .. })
    ));
}

#[tokio::test]
async fn test_expired_code_is_rejected() {
    let h = harness(Duration::from_millis(5));
    let newcomer = h.user("new@example.com", 0).await;
    let verifier = h.user("verifier@example.com", 5).await;

    let issued = h
        .verification
        .request_code(&newcomer, verifier.id, Utc::now())
        .await
        .unwrap();
    tokio::time::sleep(Duration::from_millis(20)).await;

    let result = h.verification.check_code(&verifier, &issued.code).await;
    assert!(matches!(result, Err(DomainError::Validation(_))));
}

#[tokio::test]
async fn test_decision_needs_matching_pending_request() {
    let h = default_harness();
    let newcomer = h.user("new@example.com", 0).await;
    let chosen = h.user("chosen@example.com", 5).await;
    let other = h.user("other@example.com", 5).await;

    let none = h
        .verification
        .apply_decision(&chosen, newcomer.id, VerificationDecision::Approve, Utc::now())
        .await;
    assert!(matches!(none, Err(DomainError::NotFound { .. })));

    h.verification
        .request_code(&newcomer, chosen.id, Utc::now())
        .await
        .unwrap();
    let wrong = h
        .verification
        .apply_decision(&other, newcomer.id, VerificationDecision::Approve, Utc::now())
        .await;
    assert!(matches!(wrong, Err(DomainError::NotFound { .. })));

    let still_pending = h.accounts.profile(newcomer.id).await.unwrap();
    assert_eq!(still_pending.level().unwrap(), Level::UNVERIFIED);
}

#[tokio::test]
async fn test_level_listing_is_open_only_for_verifiers() {
    let h = default_harness();
    let newcomer = h.user("new@example.com", 0).await;
    h.user("verifier@example.com", 5).await;

    let verifiers = h
        .accounts
        .users_at_level(&newcomer, Level::VERIFIER)
        .await
        .unwrap();
    assert_eq!(verifiers.len(), 1);

    let admins = h.accounts.users_at_level(&newcomer, Level::new(9).unwrap()).await;
    assert!(matches!(admins, Err(DomainError::ForbiddenAction(_))));
}

#[tokio::test]
async fn test_handle_is_unique_and_usable_for_login() {
    let h = default_harness();
    let alice = h.user("alice@example.com", 1).await;
    let bob = h.user("bob@example.com", 1).await;

    let alice = h.accounts.set_handle(&alice, "@Alice", Utc::now()).await.unwrap();
    assert_eq!(alice.handle.as_deref(), Some("@alice"));

    let taken = h.accounts.set_handle(&bob, "@alice", Utc::now()).await;
    assert!(matches!(taken, Err(DomainError::Duplicate(_))));
    let malformed = h.accounts.set_handle(&bob, "bob", Utc::now()).await;
    assert!(matches!(malformed, Err(DomainError::Validation(_))));

    // Re-claiming your own handle is a no-op, not a clash.
    h.accounts.set_handle(&alice, "@alice", Utc::now()).await.unwrap();

    let by_handle = h.accounts.find_for_login(" @ALICE ").await.unwrap().unwrap();
    let by_email = h.accounts.find_for_login("Alice@Example.com").await.unwrap().unwrap();
    assert_eq!(by_handle.id, alice.id);
    assert_eq!(by_email.id, alice.id);
}

#[tokio::test]
async fn test_delete_account_removes_posts_and_bookmarks() {
    let h = default_harness();
    let now = Utc::now();
    let leaving = h.user("leaving@example.com", 1).await;
    let staying = h.user("staying@example.com", 1).await;

    let theirs = h.posts.create(&leaving, "bye".into(), false, now).await.unwrap();
    let kept = h.posts.create(&staying, "still here".into(), false, now).await.unwrap();
    h.bookmarks.toggle(&staying, theirs.id, now).await.unwrap();
    h.bookmarks.toggle(&staying, kept.id, now).await.unwrap();
    h.bookmarks.toggle(&leaving, kept.id, now).await.unwrap();

    h.accounts.delete_account(&leaving).await.unwrap();

    assert!(matches!(
        h.accounts.profile(leaving.id).await,
        Err(DomainError::NotFound { .. })
    ));
    assert!(matches!(
        h.posts.get(&staying, theirs.id, now).await,
        Err(DomainError::NotFound { .. })
    ));

    let remaining = h.bookmarks.list(&staying, now).await.unwrap();
    assert_eq!(remaining.len(), 1);
    assert_eq!(remaining[0].post.id, kept.id);

    let again = h.accounts.delete_account(&leaving).await;
    assert!(matches!(again, Err(DomainError::NotFound { .. })));
}
