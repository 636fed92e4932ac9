use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::ClassifiedPost;
use crate::domain::{User, privilege};
use crate::error::{DomainError, DomainResult};
use crate::ports::{BookmarkRepository, PostRepository};

/// Per-user bookmark set.
#[derive(Clone)]
pub struct BookmarkService {
    bookmarks: Arc<dyn BookmarkRepository>,
    posts: Arc<dyn PostRepository>,
}

impl BookmarkService {
    pub fn new(bookmarks: Arc<dyn BookmarkRepository>, posts: Arc<dyn PostRepository>) -> Self {
        Self { bookmarks, posts }
    }

    /// Add or remove a bookmark. Returns the membership after the toggle.
    pub async fn toggle(&self, user: &User, post_id: Uuid, now: DateTime<Utc>) -> DomainResult<bool> {
        if !privilege::can_bookmark_or_share(user.level()?) {
            return Err(DomainError::forbidden("bookmarking is not available"));
        }

        // Membership is independent of the post's status or author.
        if self.posts.find_by_id(post_id).await?.is_none() {
            return Err(DomainError::not_found("Post", post_id));
        }

        let bookmarked = self.bookmarks.toggle(user.id, post_id, now).await?;
        tracing::debug!(user_id = %user.id, post_id = %post_id, bookmarked, "Bookmark toggled");
        Ok(bookmarked)
    }

    /// Bookmarked posts that still exist, most recently bookmarked first.
    pub async fn list(&self, user: &User, now: DateTime<Utc>) -> DomainResult<Vec<ClassifiedPost>> {
        let ids = self.bookmarks.list_post_ids(user.id).await?;
        let mut by_id: HashMap<Uuid, _> = self
            .posts
            .find_by_ids(&ids)
            .await?
            .into_iter()
            .map(|post| (post.id, post))
            .collect();

        let viewer = user.viewer()?;
        let mut listed = Vec::with_capacity(ids.len());
        for id in ids {
            if let Some(post) = by_id.remove(&id) {
                listed.push(ClassifiedPost::new(post, &viewer, true, now)?);
            }
        }
        Ok(listed)
    }
}
