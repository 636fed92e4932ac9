//! Post lifecycle engine: per-viewer classification of a post.
//!
//! Everything here is a pure function of the post, the viewer and a
//! caller-supplied `now`. Mutations live on [`Post`] and in the services.

use chrono::{DateTime, TimeDelta, Utc};
use serde::Serialize;
use uuid::Uuid;

use super::{Level, Post, PostStatus, privilege};
use crate::error::DomainError;

/// The user looking at a post.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewer {
    pub id: Uuid,
    pub level: Level,
}

impl Viewer {
    pub fn new(id: Uuid, level: Level) -> Self {
        Self { id, level }
    }
}

/// Where a post stands relative to its auto-publish deadline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PublishCountdown {
    /// Not pending; no transition is scheduled.
    NotScheduled,
    /// Pending, strictly positive time left before the post is due.
    Remaining(TimeDelta),
    /// Pending, delay elapsed, transition not yet applied by storage.
    AwaitingPublication,
}

impl PublishCountdown {
    pub fn is_awaiting_publication(&self) -> bool {
        matches!(self, PublishCountdown::AwaitingPublication)
    }
}

/// True iff the post is pending and `now` has reached `created_at + delay`.
pub fn is_auto_publish_due(post: &Post, now: DateTime<Utc>) -> Result<bool, DomainError> {
    Ok(post.status()? == PostStatus::Pending && now >= post.publish_at())
}

/// Time left before a pending post is due.
pub fn remaining(post: &Post, now: DateTime<Utc>) -> Result<PublishCountdown, DomainError> {
    if post.status()? != PostStatus::Pending {
        return Ok(PublishCountdown::NotScheduled);
    }

    let left = post.publish_at() - now;
    if left > TimeDelta::zero() {
        Ok(PublishCountdown::Remaining(left))
    } else {
        Ok(PublishCountdown::AwaitingPublication)
    }
}

/// Actions offered to a viewer. The flags are independent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct PostActions {
    pub can_edit: bool,
    pub can_withdraw: bool,
    pub can_repost: bool,
    pub can_delete: bool,
    pub can_report: bool,
    /// Whether the action menu is shown at all.
    pub show_menu: bool,
}

impl PostActions {
    pub fn derive(status: PostStatus, is_author: bool, viewer_level: Level) -> Self {
        let can_edit = is_author && status == PostStatus::Draft;
        let can_withdraw = is_author && status == PostStatus::Published;
        let can_repost = is_author && status == PostStatus::Withdrawn;

        let author_delete =
            is_author && matches!(status, PostStatus::Draft | PostStatus::Pending);
        let admin_delete = privilege::has_admin_delete_rights(viewer_level)
            && status != PostStatus::Withdrawn
            && !is_author;
        let can_delete = author_delete || admin_delete;

        let can_report = privilege::can_report(viewer_level, is_author);

        // Level 0 accounts are read-only; they never get the menu.
        let show_menu = viewer_level != Level::UNVERIFIED
            && (can_edit || can_withdraw || can_delete || can_report);

        Self {
            can_edit,
            can_withdraw,
            can_repost,
            can_delete,
            can_report,
            show_menu,
        }
    }
}

/// Result of classifying one post for one viewer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Classification {
    pub display_status: PostStatus,
    pub countdown: PublishCountdown,
    pub actions: PostActions,
}

pub fn classify(post: &Post, viewer: &Viewer, now: DateTime<Utc>) -> Result<Classification, DomainError> {
    let display_status = post.status()?;
    let is_author = post.is_authored_by(viewer.id);

    Ok(Classification {
        display_status,
        countdown: remaining(post, now)?,
        actions: PostActions::derive(display_status, is_author, viewer.level),
    })
}
