use std::collections::HashSet;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::{ClassifiedPost, is_visible_to};
use crate::domain::{Post, PostStatus, User, lifecycle, privilege, publish_delay};
use crate::error::{DomainError, DomainResult};
use crate::ports::{BookmarkRepository, PostRepository};

/// Outcome of one auto-publish sweep.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SweepReport {
    /// Posts this sweep moved to Published.
    pub published: Vec<Uuid>,
    /// Posts another writer transitioned first.
    pub lost_races: usize,
}

/// Post lifecycle operations.
#[derive(Clone)]
pub struct PostService {
    posts: Arc<dyn PostRepository>,
    bookmarks: Arc<dyn BookmarkRepository>,
}

impl PostService {
    pub fn new(posts: Arc<dyn PostRepository>, bookmarks: Arc<dyn BookmarkRepository>) -> Self {
        Self { posts, bookmarks }
    }

    /// Create a draft, or a pending post when `publish` is set.
    pub async fn create(
        &self,
        author: &User,
        content: String,
        publish: bool,
        now: DateTime<Utc>,
    ) -> DomainResult<Post> {
        if !privilege::can_create_post(author.level()?) {
            return Err(DomainError::forbidden(
                "account not verified: verify your account to create posts",
            ));
        }

        let post = Post::new(author.id, content, publish, now)?;
        let saved = self.posts.save(post).await?;
        let status = saved.status()?;

        tracing::info!(
            post_id = %saved.id,
            author_id = %author.id,
            status = %status,
            "Post created"
        );
        Ok(saved)
    }

    pub async fn edit(
        &self,
        actor: &User,
        post_id: Uuid,
        content: String,
        now: DateTime<Utc>,
    ) -> DomainResult<Post> {
        require_active(actor, "edit")?;
        let mut post = self.load(post_id).await?;
        post.edit_content(actor.id, content, now)?;

        let saved = self.commit(post, PostStatus::Draft).await?;
        tracing::debug!(post_id = %post_id, "Draft edited");
        Ok(saved)
    }

    pub async fn withdraw(&self, actor: &User, post_id: Uuid, now: DateTime<Utc>) -> DomainResult<Post> {
        require_active(actor, "withdraw")?;
        let mut post = self.load(post_id).await?;
        post.withdraw(actor.id, now)?;

        let saved = self.commit(post, PostStatus::Published).await?;
        tracing::info!(post_id = %post_id, "Post withdrawn");
        Ok(saved)
    }

    /// Reuse a withdrawn post as a fresh draft with the same id.
    pub async fn repost(
        &self,
        actor: &User,
        post_id: Uuid,
        content: String,
        now: DateTime<Utc>,
    ) -> DomainResult<Post> {
        require_active(actor, "repost")?;
        let mut post = self.load(post_id).await?;
        post.repost(actor.id, content, now)?;

        let saved = self.commit(post, PostStatus::Withdrawn).await?;
        tracing::info!(post_id = %post_id, "Withdrawn post reposted as draft");
        Ok(saved)
    }

    pub async fn delete(&self, actor: &User, post_id: Uuid) -> DomainResult<()> {
        require_active(actor, "delete")?;
        let post = self.load(post_id).await?;
        post.ensure_deletable_by(actor.id, actor.level()?)?;

        self.posts.delete(post_id).await?;
        self.bookmarks.delete_for_post(post_id).await?;

        tracing::info!(
            post_id = %post_id,
            actor_id = %actor.id,
            by_author = post.is_authored_by(actor.id),
            "Post deleted"
        );
        Ok(())
    }

    /// Flag a post for moderators. Reports are recorded in the audit log.
    pub async fn report(&self, actor: &User, post_id: Uuid, reason: Option<&str>) -> DomainResult<()> {
        let post = self.load(post_id).await?;
        if !privilege::can_report(actor.level()?, post.is_authored_by(actor.id)) {
            return Err(DomainError::forbidden(
                "reporting requires a verified account and cannot target your own post",
            ));
        }

        tracing::warn!(
            target: "agora::reports",
            post_id = %post_id,
            reporter_id = %actor.id,
            reason = reason.unwrap_or(""),
            "Post reported"
        );
        Ok(())
    }

    /// One post as seen by `viewer`. Posts the viewer may not see are
    /// reported as missing.
    pub async fn get(&self, viewer: &User, post_id: Uuid, now: DateTime<Utc>) -> DomainResult<ClassifiedPost> {
        let post = self.load(post_id).await?;
        if !is_visible_to(&post, viewer.id)? {
            return Err(DomainError::not_found("Post", post_id));
        }

        let bookmarked = self.bookmarks.is_bookmarked(viewer.id, post_id).await?;
        ClassifiedPost::new(post, &viewer.viewer()?, bookmarked, now)
    }

    /// The viewer's feed: published posts plus their own, newest first.
    pub async fn feed(&self, viewer: &User, now: DateTime<Utc>) -> DomainResult<Vec<ClassifiedPost>> {
        let posts = self.posts.find_feed(viewer.id).await?;
        self.classify_all(viewer, posts, now).await
    }

    /// Posts by one author that the viewer may see.
    pub async fn posts_by_user(
        &self,
        viewer: &User,
        author_id: Uuid,
        now: DateTime<Utc>,
    ) -> DomainResult<Vec<ClassifiedPost>> {
        let mut visible = Vec::new();
        for post in self.posts.find_by_user_id(author_id).await? {
            if is_visible_to(&post, viewer.id)? {
                visible.push(post);
            }
        }
        self.classify_all(viewer, visible, now).await
    }

    /// Apply every due Pending -> Published transition.
    ///
    /// Each post is moved with a compare-and-set, so a concurrent writer that
    /// got there first is counted rather than overwritten.
    pub async fn publish_due(&self, now: DateTime<Utc>) -> DomainResult<SweepReport> {
        let candidates = self.posts.find_due_pending(now - publish_delay()).await?;
        let mut report = SweepReport::default();

        for post in candidates {
            if !lifecycle::is_auto_publish_due(&post, now)? {
                continue;
            }

            let applied = self
                .posts
                .compare_and_set_status(post.id, PostStatus::Pending, PostStatus::Published, now)
                .await?;

            if applied {
                report.published.push(post.id);
            } else {
                report.lost_races += 1;
                tracing::debug!(post_id = %post.id, "Auto-publish already applied elsewhere");
            }
        }

        if !report.published.is_empty() || report.lost_races > 0 {
            tracing::info!(
                published = report.published.len(),
                lost_races = report.lost_races,
                "Auto-publish sweep finished"
            );
        }
        Ok(report)
    }

    /// Publish a single due post, failing with `StaleState` if another
    /// writer already published it.
    pub async fn publish_one(&self, post_id: Uuid, now: DateTime<Utc>) -> DomainResult<Post> {
        let mut post = self.load(post_id).await?;
        if post.status()? == PostStatus::Published {
            return Err(DomainError::StaleState { post_id });
        }
        post.publish_if_due(now)?;

        let applied = self
            .posts
            .compare_and_set_status(post_id, PostStatus::Pending, PostStatus::Published, now)
            .await?;
        if !applied {
            return Err(DomainError::StaleState { post_id });
        }

        Ok(post)
    }

    /// Write a transitioned post back, provided nobody changed or deleted it
    /// since it was loaded in `expected` state.
    async fn commit(&self, post: Post, expected: PostStatus) -> DomainResult<Post> {
        if self.posts.update_if_status(&post, expected).await? {
            return Ok(post);
        }

        match self.posts.find_by_id(post.id).await? {
            None => Err(DomainError::not_found("Post", post.id)),
            Some(_) => Err(DomainError::StaleState { post_id: post.id }),
        }
    }

    async fn load(&self, post_id: Uuid) -> DomainResult<Post> {
        self.posts
            .find_by_id(post_id)
            .await?
            .ok_or_else(|| DomainError::not_found("Post", post_id))
    }

    async fn classify_all(
        &self,
        viewer: &User,
        posts: Vec<Post>,
        now: DateTime<Utc>,
    ) -> DomainResult<Vec<ClassifiedPost>> {
        let as_viewer = viewer.viewer()?;
        let bookmarked: HashSet<Uuid> = self
            .bookmarks
            .list_post_ids(viewer.id)
            .await?
            .into_iter()
            .collect();

        posts
            .into_iter()
            .map(|post| {
                let marked = bookmarked.contains(&post.id);
                ClassifiedPost::new(post, &as_viewer, marked, now)
            })
            .collect()
    }
}

/// Level 0 accounts are read-only, including towards their own posts.
fn require_active(actor: &User, action: &str) -> DomainResult<()> {
    if privilege::can_create_post(actor.level()?) {
        Ok(())
    } else {
        Err(DomainError::forbidden(format!(
            "account not verified: cannot {action} posts"
        )))
    }
}
