//! Error handling middleware - RFC 7807 compliant responses.

use actix_web::{HttpResponse, ResponseError, http::StatusCode};

use agora_core::error::{DomainError, RepoError};
use agora_core::ports::AuthError;
use agora_shared::ErrorResponse;

/// Application-level error type that converts to RFC 7807 responses.
///
/// `problem` is the kind clients branch on (`forbidden-transition`,
/// `stale-state`, `invalid-level`, ...).
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Unauthorized")]
    Unauthorized,

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Conflict ({problem}): {detail}")]
    Conflict { problem: &'static str, detail: String },

    /// Stored data failed an integrity check.
    #[error("Unprocessable ({problem}): {detail}")]
    Unprocessable { problem: &'static str, detail: String },

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    fn conflict(problem: &'static str, detail: impl Into<String>) -> Self {
        AppError::Conflict {
            problem,
            detail: detail.into(),
        }
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Unauthorized => StatusCode::UNAUTHORIZED,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::Conflict { .. } => StatusCode::CONFLICT,
            AppError::Unprocessable { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let error = match self {
            AppError::NotFound(detail) => ErrorResponse::not_found(detail),
            AppError::BadRequest(detail) => ErrorResponse::bad_request(detail),
            AppError::Unauthorized => ErrorResponse::unauthorized(),
            AppError::Forbidden(detail) => {
                ErrorResponse::forbidden(detail).with_problem("forbidden-action")
            }
            AppError::Conflict { problem, detail } => {
                ErrorResponse::conflict(detail).with_problem(problem)
            }
            AppError::Unprocessable { problem, detail } => {
                tracing::warn!(problem, detail = %detail, "Integrity check failed");
                ErrorResponse::unprocessable(detail).with_problem(problem)
            }
            AppError::Internal(detail) => {
                tracing::error!(detail = %detail, "Internal error");
                ErrorResponse::internal_error()
            }
        };

        HttpResponse::build(self.status_code()).json(error)
    }
}

impl From<DomainError> for AppError {
    fn from(err: DomainError) -> Self {
        let detail = err.to_string();
        match err {
            DomainError::InvalidLevel(_) => AppError::Unprocessable {
                problem: "invalid-level",
                detail,
            },
            DomainError::InvalidStatus(_) => AppError::Unprocessable {
                problem: "invalid-status",
                detail,
            },
            DomainError::ForbiddenTransition { .. } => {
                AppError::conflict("forbidden-transition", detail)
            }
            DomainError::StaleState { .. } => AppError::conflict("stale-state", detail),
            DomainError::NotYetDue { .. } => AppError::conflict("not-yet-due", detail),
            DomainError::Duplicate(msg) => AppError::conflict("duplicate", msg),
            DomainError::ForbiddenAction(msg) => AppError::Forbidden(msg),
            DomainError::NotFound { entity_type, id } => {
                AppError::NotFound(format!("{entity_type} with id {id} not found"))
            }
            DomainError::Validation(msg) => AppError::BadRequest(msg),
            DomainError::Unauthorized => AppError::Unauthorized,
            DomainError::Internal(msg) => AppError::Internal(msg),
            DomainError::Repository(repo) => repo.into(),
        }
    }
}

impl From<RepoError> for AppError {
    fn from(err: RepoError) -> Self {
        match err {
            RepoError::NotFound => AppError::NotFound("Resource not found".to_string()),
            RepoError::Constraint(msg) => AppError::conflict("duplicate", msg),
            RepoError::Connection(msg) => {
                tracing::error!(error = %msg, "Database connection error");
                AppError::Internal("Database error".to_string())
            }
            RepoError::Query(msg) => {
                tracing::error!(error = %msg, "Database query error");
                AppError::Internal("Database error".to_string())
            }
        }
    }
}

impl From<AuthError> for AppError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::InvalidCredentials
            | AuthError::MissingAuth
            | AuthError::TokenExpired
            | AuthError::InvalidToken(_) => AppError::Unauthorized,
            AuthError::HashingError(msg) => AppError::Internal(msg),
        }
    }
}

/// Result type alias for handlers.
pub type AppResult<T> = Result<T, AppError>;
