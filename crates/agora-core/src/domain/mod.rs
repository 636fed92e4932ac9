//! Domain entities and the rules that govern them.

mod bookmark;
mod level;
pub mod lifecycle;
mod post;
pub mod privilege;
mod user;
mod verification;

pub use bookmark::Bookmark;
pub use level::Level;
pub use lifecycle::{Classification, PostActions, PublishCountdown, Viewer, classify};
pub use post::{PUBLISH_DELAY_SECS, Post, PostStatus, publish_delay, validate_content};
pub use privilege::Capabilities;
pub use user::{User, normalize_handle};
pub use verification::{VerificationCode, VerificationDecision};
