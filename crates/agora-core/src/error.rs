//! Domain-level error types.

use chrono::{DateTime, Utc};
use thiserror::Error;
use uuid::Uuid;

use crate::domain::PostStatus;

/// Domain errors - business logic failures.
///
/// Every lifecycle and privilege failure has its own variant so callers can
/// branch on the kind instead of parsing a message.
#[derive(Debug, Error)]
pub enum DomainError {
    #[error("Invalid level {0}: levels range from 0 to 9")]
    InvalidLevel(i16),

    #[error("Invalid post status code {0}: codes range from 0 to 3")]
    InvalidStatus(i16),

    #[error("Cannot {action} a post that is {status}")]
    ForbiddenTransition {
        action: &'static str,
        status: PostStatus,
    },

    #[error("Forbidden: {0}")]
    ForbiddenAction(String),

    #[error("Post {post_id} was already transitioned by another writer")]
    StaleState { post_id: Uuid },

    #[error("Post {post_id} is not due for publication until {due_at}")]
    NotYetDue {
        post_id: Uuid,
        due_at: DateTime<Utc>,
    },

    #[error("Entity not found: {entity_type} with id {id}")]
    NotFound { entity_type: &'static str, id: Uuid },

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Duplicate entity: {0}")]
    Duplicate(String),

    #[error("Unauthorized access")]
    Unauthorized,

    #[error("Internal error: {0}")]
    Internal(String),

    #[error(transparent)]
    Repository(#[from] RepoError),
}

impl DomainError {
    pub fn forbidden(reason: impl Into<String>) -> Self {
        DomainError::ForbiddenAction(reason.into())
    }

    pub fn not_found(entity_type: &'static str, id: Uuid) -> Self {
        DomainError::NotFound { entity_type, id }
    }
}

/// Repository-level errors.
#[derive(Debug, Error)]
pub enum RepoError {
    #[error("Database connection failed: {0}")]
    Connection(String),

    #[error("Query execution failed: {0}")]
    Query(String),

    #[error("Entity not found")]
    NotFound,

    #[error("Constraint violation: {0}")]
    Constraint(String),
}

/// Result alias for domain operations.
pub type DomainResult<T> = Result<T, DomainError>;
