//! Blog Error Types
//!
//! Store, use-case and token failures converge here and render through the
//! unified `kernel::error::AppError` system.

use auth::AuthError;
use axum::response::{IntoResponse, Response};
use kernel::error::{app_error::AppError, kind::ErrorKind};
use kernel::validation::ValidationErrors;
use platform::password::PasswordHashError;
use thiserror::Error;

/// Blog-specific result type alias
pub type BlogResult<T> = Result<T, BlogError>;

/// Blog-specific error variants
#[derive(Debug, Error)]
pub enum BlogError {
    /// Field-level validation failures
    #[error("Validation failed: {0}")]
    Validation(ValidationErrors),

    #[error("User not found")]
    UserNotFound,

    #[error("Article not found")]
    ArticleNotFound,

    #[error("Comment not found")]
    CommentNotFound,

    #[error("Username is already taken")]
    UsernameTaken,

    #[error("Email is already registered")]
    EmailTaken,

    #[error("Already following this user")]
    AlreadyFollowing,

    #[error("Not following this user")]
    NotFollowing,

    #[error("Article is already favorited")]
    AlreadyFavorited,

    #[error("Article is not favorited")]
    NotFavorited,

    #[error("Users cannot follow themselves")]
    CannotFollowSelf,

    /// Caller does not own the resource
    #[error("Only the author can modify this resource")]
    Forbidden,

    /// Unknown email or wrong password (indistinguishable on purpose)
    #[error("Invalid email or password")]
    InvalidCredentials,

    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Password hashing error: {0}")]
    PasswordHash(#[from] PasswordHashError),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl BlogError {
    /// Get the ErrorKind for this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            BlogError::Validation(_) | BlogError::CannotFollowSelf => {
                ErrorKind::UnprocessableEntity
            }
            BlogError::UserNotFound | BlogError::ArticleNotFound | BlogError::CommentNotFound => {
                ErrorKind::NotFound
            }
            BlogError::UsernameTaken
            | BlogError::EmailTaken
            | BlogError::AlreadyFollowing
            | BlogError::NotFollowing
            | BlogError::AlreadyFavorited
            | BlogError::NotFavorited => ErrorKind::Conflict,
            BlogError::Forbidden => ErrorKind::Forbidden,
            BlogError::InvalidCredentials => ErrorKind::Unauthorized,
            BlogError::Auth(e) => e.kind(),
            BlogError::Database(sqlx::Error::PoolTimedOut) => ErrorKind::ServiceUnavailable,
            BlogError::Database(_) | BlogError::PasswordHash(_) | BlogError::Internal(_) => {
                ErrorKind::InternalServerError
            }
        }
    }

    /// Convert to AppError
    pub fn to_app_error(&self) -> AppError {
        match self {
            BlogError::Validation(errors) => AppError::from(errors.clone()),
            BlogError::Auth(e) => e.to_app_error(),
            BlogError::Database(sqlx::Error::PoolTimedOut) => {
                AppError::service_unavailable("Database is busy, try again later")
            }
            _ if self.kind().is_server_error() => AppError::internal("Internal server error"),
            _ => AppError::new(self.kind(), self.to_string()),
        }
    }

    fn log(&self) {
        match self {
            BlogError::Database(e) => {
                tracing::error!(error = %e, "Blog database error");
            }
            BlogError::PasswordHash(e) => {
                tracing::error!(error = %e, "Password hashing failed");
            }
            BlogError::Internal(msg) => {
                tracing::error!(message = %msg, "Blog internal error");
            }
            BlogError::InvalidCredentials => {
                tracing::warn!("Invalid login attempt");
            }
            BlogError::Forbidden => {
                tracing::warn!("Rejected modification by non-author");
            }
            BlogError::Auth(_) => {
                // AuthError logs itself
            }
            _ => {
                tracing::debug!(error = %self, "Blog error");
            }
        }
    }
}

impl From<ValidationErrors> for BlogError {
    fn from(errors: ValidationErrors) -> Self {
        BlogError::Validation(errors)
    }
}

impl IntoResponse for BlogError {
    fn into_response(self) -> Response {
        if let BlogError::Auth(e) = self {
            return e.into_response();
        }
        self.log();
        self.to_app_error().into_response()
    }
}
