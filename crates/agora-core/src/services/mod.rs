//! Application services - the engine plus the ports it mutates through.
//!
//! Every operation takes the acting user (already loaded by the caller) and
//! a caller-supplied `now`, so the services stay deterministic under test.

mod bookmark_service;
mod post_service;
mod user_service;
mod verification_service;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::{Classification, Post, PostStatus, Viewer, classify};
use crate::error::DomainResult;

pub use bookmark_service::BookmarkService;
pub use post_service::{PostService, SweepReport};
pub use user_service::UserService;
pub use verification_service::{VerificationConfig, VerificationService};

/// A post together with how it looks to one viewer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassifiedPost {
    pub post: Post,
    pub classification: Classification,
    pub bookmarked: bool,
}

impl ClassifiedPost {
    pub fn new(
        post: Post,
        viewer: &Viewer,
        bookmarked: bool,
        now: DateTime<Utc>,
    ) -> DomainResult<Self> {
        let classification = classify(&post, viewer, now)?;
        Ok(Self {
            post,
            classification,
            bookmarked,
        })
    }
}

/// Published posts are public; everything else is only shown to its author.
pub(crate) fn is_visible_to(post: &Post, viewer_id: Uuid) -> DomainResult<bool> {
    Ok(post.is_authored_by(viewer_id) || post.status()? == PostStatus::Published)
}
