use std::fmt;

use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{Level, privilege};
use crate::error::DomainError;

/// Seconds a pending post waits before it becomes eligible for publication.
pub const PUBLISH_DELAY_SECS: i64 = 3 * 60 * 60;

/// The fixed auto-publish delay.
pub fn publish_delay() -> TimeDelta {
    TimeDelta::seconds(PUBLISH_DELAY_SECS)
}

/// Lifecycle state of a post, persisted as a small integer code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PostStatus {
    Draft,
    Pending,
    Published,
    Withdrawn,
}

impl PostStatus {
    pub fn from_code(code: i16) -> Result<Self, DomainError> {
        match code {
            0 => Ok(PostStatus::Draft),
            1 => Ok(PostStatus::Pending),
            2 => Ok(PostStatus::Published),
            3 => Ok(PostStatus::Withdrawn),
            other => Err(DomainError::InvalidStatus(other)),
        }
    }

    pub const fn code(self) -> i16 {
        match self {
            PostStatus::Draft => 0,
            PostStatus::Pending => 1,
            PostStatus::Published => 2,
            PostStatus::Withdrawn => 3,
        }
    }

    /// Display label, independent of the viewer.
    pub const fn label(self) -> &'static str {
        match self {
            PostStatus::Draft => "Draft",
            PostStatus::Pending => "Pending",
            PostStatus::Published => "Published",
            PostStatus::Withdrawn => "Withdrawn",
        }
    }
}

impl fmt::Display for PostStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Post entity.
///
/// `status_code` is kept raw so that corrupt rows are detected at the point
/// of use (see [`Post::status`]) instead of being coerced on load.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Post {
    pub id: Uuid,
    pub user_id: Uuid,
    pub content: String,
    pub status_code: i16,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Post {
    /// Create a new post. Publishing is deferred: `publish` yields a pending
    /// post, otherwise a draft.
    pub fn new(
        user_id: Uuid,
        content: String,
        publish: bool,
        now: DateTime<Utc>,
    ) -> Result<Self, DomainError> {
        validate_content(&content)?;

        let status = if publish {
            PostStatus::Pending
        } else {
            PostStatus::Draft
        };

        Ok(Self {
            id: Uuid::new_v4(),
            user_id,
            content,
            status_code: status.code(),
            created_at: now,
            updated_at: now,
        })
    }

    pub fn status(&self) -> Result<PostStatus, DomainError> {
        PostStatus::from_code(self.status_code)
    }

    pub fn is_authored_by(&self, user_id: Uuid) -> bool {
        self.user_id == user_id
    }

    /// Instant at which a pending post becomes due.
    pub fn publish_at(&self) -> DateTime<Utc> {
        self.created_at + publish_delay()
    }

    /// Replace the content of a draft.
    pub fn edit_content(
        &mut self,
        actor_id: Uuid,
        content: String,
        now: DateTime<Utc>,
    ) -> Result<(), DomainError> {
        self.require_author(actor_id, "edit")?;
        self.require_status(PostStatus::Draft, "edit")?;
        validate_content(&content)?;

        self.content = content;
        self.updated_at = now;
        Ok(())
    }

    /// Published -> Withdrawn.
    pub fn withdraw(&mut self, actor_id: Uuid, now: DateTime<Utc>) -> Result<(), DomainError> {
        self.require_author(actor_id, "withdraw")?;
        self.require_status(PostStatus::Published, "withdraw")?;

        self.set_status(PostStatus::Withdrawn, now);
        Ok(())
    }

    /// Withdrawn -> Draft with fresh content. The id is kept, the withdrawn
    /// content is overwritten.
    pub fn repost(
        &mut self,
        actor_id: Uuid,
        content: String,
        now: DateTime<Utc>,
    ) -> Result<(), DomainError> {
        self.require_author(actor_id, "repost")?;
        self.require_status(PostStatus::Withdrawn, "repost")?;
        validate_content(&content)?;

        self.content = content;
        self.set_status(PostStatus::Draft, now);
        Ok(())
    }

    /// Pending -> Published once the delay has elapsed.
    pub fn publish_if_due(&mut self, now: DateTime<Utc>) -> Result<(), DomainError> {
        self.require_status(PostStatus::Pending, "publish")?;
        if now < self.publish_at() {
            return Err(DomainError::NotYetDue {
                post_id: self.id,
                due_at: self.publish_at(),
            });
        }

        self.set_status(PostStatus::Published, now);
        Ok(())
    }

    /// Check the delete rule for an actor.
    ///
    /// Authors may delete their drafts and pending posts. Administrators may
    /// delete other users' posts unless they were withdrawn.
    pub fn ensure_deletable_by(&self, actor_id: Uuid, actor_level: Level) -> Result<(), DomainError> {
        let status = self.status()?;

        if self.is_authored_by(actor_id) {
            return match status {
                PostStatus::Draft | PostStatus::Pending => Ok(()),
                other => Err(DomainError::ForbiddenTransition {
                    action: "delete",
                    status: other,
                }),
            };
        }

        if !privilege::has_admin_delete_rights(actor_level) {
            return Err(DomainError::forbidden(
                "only the author or an administrator may delete this post",
            ));
        }

        if status == PostStatus::Withdrawn {
            return Err(DomainError::ForbiddenTransition {
                action: "delete",
                status,
            });
        }

        Ok(())
    }

    fn require_author(&self, actor_id: Uuid, action: &str) -> Result<(), DomainError> {
        if self.is_authored_by(actor_id) {
            Ok(())
        } else {
            Err(DomainError::forbidden(format!(
                "only the author may {action} this post"
            )))
        }
    }

    fn require_status(&self, expected: PostStatus, action: &'static str) -> Result<(), DomainError> {
        let status = self.status()?;
        if status == expected {
            Ok(())
        } else {
            Err(DomainError::ForbiddenTransition { action, status })
        }
    }

    fn set_status(&mut self, status: PostStatus, now: DateTime<Utc>) {
        self.status_code = status.code();
        self.updated_at = now;
    }
}

/// Content must be non-empty once surrounding whitespace is removed.
pub fn validate_content(content: &str) -> Result<(), DomainError> {
    if content.trim().is_empty() {
        return Err(DomainError::Validation(
            "post content cannot be empty".to_string(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap()
    }

    fn post_with(status: PostStatus, author: Uuid) -> Post {
        let mut post = Post::new(author, "hello".to_string(), false, t0()).unwrap();
        post.status_code = status.code();
        post
    }

    #[test]
    fn test_new_post_status_follows_publish_choice() {
        let author = Uuid::new_v4();
        let draft = Post::new(author, "a".into(), false, t0()).unwrap();
        let pending = Post::new(author, "b".into(), true, t0()).unwrap();

        assert_eq!(draft.status().unwrap(), PostStatus::Draft);
        assert_eq!(pending.status().unwrap(), PostStatus::Pending);
        assert_eq!(pending.publish_at(), t0() + TimeDelta::hours(3));
    }

    #[test]
    fn test_empty_content_rejected() {
        let result = Post::new(Uuid::new_v4(), "   ".into(), false, t0());
        assert!(matches!(result, Err(DomainError::Validation(_))));
    }

    #[test]
    fn test_malformed_status_code_is_integrity_error() {
        let mut post = post_with(PostStatus::Draft, Uuid::new_v4());
        post.status_code = 7;
        assert!(matches!(post.status(), Err(DomainError::InvalidStatus(7))));
    }

    #[test]
    fn test_edit_only_drafts() {
        let author = Uuid::new_v4();
        let mut draft = post_with(PostStatus::Draft, author);
        draft.edit_content(author, "changed".into(), t0()).unwrap();
        assert_eq!(draft.content, "changed");
        assert_eq!(draft.created_at, t0());

        let mut published = post_with(PostStatus::Published, author);
        let err = published.edit_content(author, "x".into(), t0()).unwrap_err();
        assert!(matches!(
            err,
            DomainError::ForbiddenTransition {
                action: "edit",
                status: PostStatus::Published
            }
        ));
    }

    #[test]
    fn test_non_author_cannot_edit() {
        let mut draft = post_with(PostStatus::Draft, Uuid::new_v4());
        let err = draft
            .edit_content(Uuid::new_v4(), "x".into(), t0())
            .unwrap_err();
        assert!(matches!(err, DomainError::ForbiddenAction(_)));
    }

    #[test]
    fn test_withdraw_requires_published() {
        let author = Uuid::new_v4();
        let mut draft = post_with(PostStatus::Draft, author);
        assert!(matches!(
            draft.withdraw(author, t0()),
            Err(DomainError::ForbiddenTransition { .. })
        ));

        let mut published = post_with(PostStatus::Published, author);
        published.withdraw(author, t0()).unwrap();
        assert_eq!(published.status().unwrap(), PostStatus::Withdrawn);
    }

    #[test]
    fn test_repost_resets_to_draft_with_same_id() {
        let author = Uuid::new_v4();
        let mut withdrawn = post_with(PostStatus::Withdrawn, author);
        let id = withdrawn.id;

        withdrawn.repost(author, "fresh".into(), t0()).unwrap();

        assert_eq!(withdrawn.id, id);
        assert_eq!(withdrawn.status().unwrap(), PostStatus::Draft);
        assert_eq!(withdrawn.content, "fresh");
    }

    #[test]
    fn test_publish_if_due_boundary() {
        let mut pending = Post::new(Uuid::new_v4(), "p".into(), true, t0()).unwrap();
        let due = t0() + TimeDelta::hours(3);

        let early = pending.publish_if_due(due - TimeDelta::seconds(1)).unwrap_err();
        assert!(matches!(early, DomainError::NotYetDue { due_at, .. } if due_at == due));
        assert_eq!(pending.status().unwrap(), PostStatus::Pending);

        pending.publish_if_due(due).unwrap();
        assert_eq!(pending.status().unwrap(), PostStatus::Published);
        assert!(matches!(
            pending.publish_if_due(due),
            Err(DomainError::ForbiddenTransition { .. })
        ));
    }

    #[test]
    fn test_delete_rules() {
        let author = Uuid::new_v4();
        let admin = Uuid::new_v4();
        let seven = Level::new(7).unwrap();
        let six = Level::new(6).unwrap();

        assert!(post_with(PostStatus::Draft, author).ensure_deletable_by(author, Level::VERIFIED).is_ok());
        assert!(post_with(PostStatus::Pending, author).ensure_deletable_by(author, Level::VERIFIED).is_ok());
        assert!(post_with(PostStatus::Published, author).ensure_deletable_by(author, Level::MAX).is_err());

        assert!(post_with(PostStatus::Published, author).ensure_deletable_by(admin, seven).is_ok());
        assert!(matches!(
            post_with(PostStatus::Published, author).ensure_deletable_by(admin, six),
            Err(DomainError::ForbiddenAction(_))
        ));
        assert!(matches!(
            post_with(PostStatus::Withdrawn, author).ensure_deletable_by(admin, Level::MAX),
            Err(DomainError::ForbiddenTransition { .. })
        ));
    }
}
