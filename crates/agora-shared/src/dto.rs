//! Data Transfer Objects - request/response types for the API.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ---- auth & profile ----

/// Request to register a new user.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterUserRequest {
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub display_name: Option<String>,
}

/// Request to login.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    /// Email address or `@handle`.
    #[serde(alias = "email")]
    pub login: String,
    pub password: String,
}

/// Response containing authentication tokens.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthResponse {
    pub access_token: String,
    pub token_type: String,
    pub expires_in: u64,
}

/// What a level unlocks, as shown to the account holder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CapabilitiesResponse {
    pub create_post: bool,
    pub bookmark_or_share: bool,
    pub verify_others: bool,
    pub manage_user_levels: bool,
    pub access_user_management: bool,
    pub admin_delete: bool,
    pub assignable_levels: Vec<i16>,
}

/// Response containing a user's public information.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserResponse {
    pub id: Uuid,
    pub email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub handle: Option<String>,
    pub level: i16,
    pub created_at: DateTime<Utc>,
}

/// The signed-in user together with their capabilities.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfileResponse {
    #[serde(flatten)]
    pub user: UserResponse,
    pub capabilities: CapabilitiesResponse,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateProfileRequest {
    #[serde(default)]
    pub display_name: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SetHandleRequest {
    pub handle: String,
}

// ---- posts ----

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreatePostRequest {
    pub content: String,
    /// Submit for publication instead of saving a draft.
    #[serde(default)]
    pub publish: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdatePostRequest {
    pub content: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RepostRequest {
    pub content: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReportRequest {
    #[serde(default)]
    pub reason: Option<String>,
}

/// Auto-publish countdown of a post.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum CountdownResponse {
    NotScheduled,
    Remaining { remaining_seconds: i64 },
    AwaitingPublication,
}

/// Actions the requesting user may take on a post.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostActionsResponse {
    pub can_edit: bool,
    pub can_withdraw: bool,
    pub can_repost: bool,
    pub can_delete: bool,
    pub can_report: bool,
    pub show_menu: bool,
}

/// A post as classified for the requesting user.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostResponse {
    pub id: Uuid,
    pub author_id: Uuid,
    pub content: String,
    pub status_code: i16,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub publish_at: DateTime<Utc>,
    pub countdown: CountdownResponse,
    pub actions: PostActionsResponse,
    pub bookmarked: bool,
    /// Set only on the response of a repost.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub is_repost: bool,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct BookmarkToggleResponse {
    pub post_id: Uuid,
    pub bookmarked: bool,
}

// ---- user management ----

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct SetLevelRequest {
    pub level: i16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LevelOptionsResponse {
    pub current_level: i16,
    pub assignable: Vec<i16>,
}

// ---- verification ----

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct RequestCodeRequest {
    pub verifier_id: Uuid,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerificationCodeResponse {
    pub code: String,
    pub verifier_id: Uuid,
    pub expires_in: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckCodeRequest {
    pub code: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VerificationDecisionRequest {
    Approve,
    Reject,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerificationActionRequest {
    pub user_id: Uuid,
    pub decision: VerificationDecisionRequest,
}
