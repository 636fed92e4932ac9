//! In-memory repositories - used when no database is configured and in tests.
//!
//! Data is lost on process restart.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use uuid::Uuid;

use agora_core::domain::{Level, Post, PostStatus, User};
use agora_core::error::RepoError;
use agora_core::ports::{BaseRepository, BookmarkRepository, PostRepository, UserRepository};

/// In-memory user repository.
#[derive(Default)]
pub struct InMemoryUserRepository {
    store: RwLock<HashMap<Uuid, User>>,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl BaseRepository<User, Uuid> for InMemoryUserRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, RepoError> {
        Ok(self.store.read().await.get(&id).cloned())
    }

    async fn save(&self, user: User) -> Result<User, RepoError> {
        let mut store = self.store.write().await;

        let clashes = store.values().any(|existing| {
            existing.id != user.id
                && (existing.email == user.email
                    || (user.handle.is_some() && existing.handle == user.handle))
        });
        if clashes {
            return Err(RepoError::Constraint("Entity already exists".to_string()));
        }

        store.insert(user.id, user.clone());
        Ok(user)
    }

    async fn delete(&self, id: Uuid) -> Result<(), RepoError> {
        match self.store.write().await.remove(&id) {
            Some(_) => Ok(()),
            None => Err(RepoError::NotFound),
        }
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, RepoError> {
        let store = self.store.read().await;
        Ok(store.values().find(|u| u.email == email).cloned())
    }

    async fn list_all(&self) -> Result<Vec<User>, RepoError> {
        let mut users: Vec<User> = self.store.read().await.values().cloned().collect();
        users.sort_by_key(|u| u.created_at);
        Ok(users)
    }

    async fn find_by_level(&self, level: Level) -> Result<Vec<User>, RepoError> {
        let raw: i16 = level.into();
        let mut users: Vec<User> = self
            .store
            .read()
            .await
            .values()
            .filter(|u| u.level == raw)
            .cloned()
            .collect();
        users.sort_by_key(|u| u.created_at);
        Ok(users)
    }

    async fn find_by_handle(&self, handle: &str) -> Result<Option<User>, RepoError> {
        let store = self.store.read().await;
        Ok(store
            .values()
            .find(|u| u.handle.as_deref() == Some(handle))
            .cloned())
    }
}

/// In-memory post repository.
#[derive(Default)]
pub struct InMemoryPostRepository {
    store: RwLock<HashMap<Uuid, Post>>,
}

impl InMemoryPostRepository {
    pub fn new() -> Self {
        Self::default()
    }

    fn newest_first(mut posts: Vec<Post>) -> Vec<Post> {
        posts.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        posts
    }
}

#[async_trait]
impl BaseRepository<Post, Uuid> for InMemoryPostRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Post>, RepoError> {
        Ok(self.store.read().await.get(&id).cloned())
    }

    async fn save(&self, post: Post) -> Result<Post, RepoError> {
        self.store.write().await.insert(post.id, post.clone());
        Ok(post)
    }

    async fn delete(&self, id: Uuid) -> Result<(), RepoError> {
        match self.store.write().await.remove(&id) {
            Some(_) => Ok(()),
            None => Err(RepoError::NotFound),
        }
    }
}

#[async_trait]
impl PostRepository for InMemoryPostRepository {
    async fn find_by_user_id(&self, user_id: Uuid) -> Result<Vec<Post>, RepoError> {
        let store = self.store.read().await;
        let posts = store.values().filter(|p| p.user_id == user_id).cloned().collect();
        Ok(Self::newest_first(posts))
    }

    async fn find_feed(&self, viewer_id: Uuid) -> Result<Vec<Post>, RepoError> {
        let published = PostStatus::Published.code();
        let store = self.store.read().await;
        let posts = store
            .values()
            .filter(|p| p.user_id == viewer_id || p.status_code == published)
            .cloned()
            .collect();
        Ok(Self::newest_first(posts))
    }

    async fn find_by_ids(&self, ids: &[Uuid]) -> Result<Vec<Post>, RepoError> {
        let store = self.store.read().await;
        Ok(ids.iter().filter_map(|id| store.get(id).cloned()).collect())
    }

    async fn find_due_pending(&self, created_before: DateTime<Utc>) -> Result<Vec<Post>, RepoError> {
        let pending = PostStatus::Pending.code();
        let store = self.store.read().await;
        let mut due: Vec<Post> = store
            .values()
            .filter(|p| p.status_code == pending && p.created_at <= created_before)
            .cloned()
            .collect();
        due.sort_by_key(|p| p.created_at);
        Ok(due)
    }

    async fn compare_and_set_status(
        &self,
        id: Uuid,
        expected: PostStatus,
        new: PostStatus,
        now: DateTime<Utc>,
    ) -> Result<bool, RepoError> {
        // Check and write under one write lock.
        let mut store = self.store.write().await;
        match store.get_mut(&id) {
            Some(post) if post.status_code == expected.code() => {
                post.status_code = new.code();
                post.updated_at = now;
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn update_if_status(&self, post: &Post, expected: PostStatus) -> Result<bool, RepoError> {
        let mut store = self.store.write().await;
        match store.get_mut(&post.id) {
            Some(stored) if stored.status_code == expected.code() => {
                stored.content.clone_from(&post.content);
                stored.status_code = post.status_code;
                stored.updated_at = post.updated_at;
                Ok(true)
            }
            _ => Ok(false),
        }
    }
}

/// In-memory bookmark repository.
#[derive(Default)]
pub struct InMemoryBookmarkRepository {
    store: RwLock<HashMap<(Uuid, Uuid), DateTime<Utc>>>,
}

impl InMemoryBookmarkRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl BookmarkRepository for InMemoryBookmarkRepository {
    async fn toggle(&self, user_id: Uuid, post_id: Uuid, now: DateTime<Utc>) -> Result<bool, RepoError> {
        let mut store = self.store.write().await;
        let key = (user_id, post_id);

        if store.remove(&key).is_some() {
            Ok(false)
        } else {
            store.insert(key, now);
            Ok(true)
        }
    }

    async fn list_post_ids(&self, user_id: Uuid) -> Result<Vec<Uuid>, RepoError> {
        let store = self.store.read().await;
        let mut marked: Vec<(Uuid, DateTime<Utc>)> = store
            .iter()
            .filter(|((user, _), _)| *user == user_id)
            .map(|((_, post), at)| (*post, *at))
            .collect();
        marked.sort_by(|a, b| b.1.cmp(&a.1));
        Ok(marked.into_iter().map(|(post, _)| post).collect())
    }

    async fn is_bookmarked(&self, user_id: Uuid, post_id: Uuid) -> Result<bool, RepoError> {
        Ok(self.store.read().await.contains_key(&(user_id, post_id)))
    }

    async fn delete_for_post(&self, post_id: Uuid) -> Result<(), RepoError> {
        self.store.write().await.retain(|(_, post), _| *post != post_id);
        Ok(())
    }

    async fn delete_for_user(&self, user_id: Uuid) -> Result<(), RepoError> {
        self.store.write().await.retain(|(user, _), _| *user != user_id);
        Ok(())
    }
}
