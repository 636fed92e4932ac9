use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::{Level, Post, PostStatus, User};
use crate::error::RepoError;

/// Generic repository trait defining standard CRUD operations.
#[async_trait]
pub trait BaseRepository<T, ID>: Send + Sync {
    /// Find an entity by its unique ID.
    async fn find_by_id(&self, id: ID) -> Result<Option<T>, RepoError>;

    /// Save an entity (create or update).
    async fn save(&self, entity: T) -> Result<T, RepoError>;

    /// Delete an entity by its ID.
    async fn delete(&self, id: ID) -> Result<(), RepoError>;
}

/// User repository with domain-specific methods.
#[async_trait]
pub trait UserRepository: BaseRepository<User, Uuid> {
    /// Find a user by their email address.
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, RepoError>;

    /// All users, ordered by creation time.
    async fn list_all(&self) -> Result<Vec<User>, RepoError>;

    /// Users currently holding exactly `level`.
    async fn find_by_level(&self, level: Level) -> Result<Vec<User>, RepoError>;

    /// Look up a public `@handle`, compared exactly.
    async fn find_by_handle(&self, handle: &str) -> Result<Option<User>, RepoError>;
}

/// Post repository.
#[async_trait]
pub trait PostRepository: BaseRepository<Post, Uuid> {
    /// Posts written by one author, newest first.
    async fn find_by_user_id(&self, user_id: Uuid) -> Result<Vec<Post>, RepoError>;

    /// Posts visible to a viewer: every published post plus the viewer's own
    /// posts in any state, newest first.
    async fn find_feed(&self, viewer_id: Uuid) -> Result<Vec<Post>, RepoError>;

    /// Posts whose ids are in `ids`. Unknown ids are skipped.
    async fn find_by_ids(&self, ids: &[Uuid]) -> Result<Vec<Post>, RepoError>;

    /// Pending posts created at or before `created_before`.
    async fn find_due_pending(
        &self,
        created_before: DateTime<Utc>,
    ) -> Result<Vec<Post>, RepoError>;

    /// Atomically move a post from `expected` to `new`.
    ///
    /// Returns `false` when the stored status no longer equals `expected`
    /// (or the post is gone); the row is left untouched in that case.
    async fn compare_and_set_status(
        &self,
        id: Uuid,
        expected: PostStatus,
        new: PostStatus,
        now: DateTime<Utc>,
    ) -> Result<bool, RepoError>;

    /// Overwrite content, status and `updated_at` of an existing post, only
    /// while its stored status is still `expected`. Never inserts.
    ///
    /// Returns `false` when the row is gone or its status moved on.
    async fn update_if_status(&self, post: &Post, expected: PostStatus) -> Result<bool, RepoError>;
}

/// Bookmark storage: a user x post membership set.
#[async_trait]
pub trait BookmarkRepository: Send + Sync {
    /// Flip membership. Returns `true` when the pair is bookmarked afterwards.
    async fn toggle(
        &self,
        user_id: Uuid,
        post_id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<bool, RepoError>;

    /// Bookmarked post ids, most recent first.
    async fn list_post_ids(&self, user_id: Uuid) -> Result<Vec<Uuid>, RepoError>;

    async fn is_bookmarked(&self, user_id: Uuid, post_id: Uuid) -> Result<bool, RepoError>;

    /// Drop every bookmark pointing at a deleted post.
    async fn delete_for_post(&self, post_id: Uuid) -> Result<(), RepoError>;

    /// Drop every bookmark a user holds.
    async fn delete_for_user(&self, user_id: Uuid) -> Result<(), RepoError>;
}
