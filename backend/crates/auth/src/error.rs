//! Auth Error Types
//!
//! Token failures integrate with the unified `kernel::error::AppError`
//! system. Every verification failure is `Unauthorized`; issuance and
//! transport failures are internal.

use axum::response::{IntoResponse, Response};
use kernel::error::{app_error::AppError, kind::ErrorKind};
use thiserror::Error;

use crate::domain::token::TokenKind;

/// Auth-specific result type alias
pub type AuthResult<T> = Result<T, AuthError>;

/// Auth-specific error variants
#[derive(Debug, Error)]
pub enum AuthError {
    /// Signing secret not configured
    #[error("Token secret must not be empty")]
    EmptySecret,

    /// Cookie absent (or empty) where a token is required
    #[error("Missing {0} token")]
    MissingToken(TokenKind),

    /// Route requires an authenticated user
    #[error("Authentication required")]
    Unauthenticated,

    #[error("Token has expired")]
    Expired,

    /// Token declares an algorithm outside the HMAC family
    #[error("Token algorithm is not accepted")]
    InvalidAlgorithm,

    #[error("Token signature mismatch")]
    InvalidSignature,

    /// Undecodable token or claims (bad subject, missing exp/iat, ...)
    #[error("Malformed token")]
    MalformedToken,

    /// Token encoding failed
    #[error("Token signing failed: {0}")]
    Signing(#[source] jsonwebtoken::errors::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AuthError {
    /// Get the ErrorKind for this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            AuthError::MissingToken(_)
            | AuthError::Unauthenticated
            | AuthError::Expired
            | AuthError::InvalidAlgorithm
            | AuthError::InvalidSignature
            | AuthError::MalformedToken => ErrorKind::Unauthorized,
            AuthError::EmptySecret | AuthError::Signing(_) | AuthError::Internal(_) => {
                ErrorKind::InternalServerError
            }
        }
    }

    /// Convert to AppError
    pub fn to_app_error(&self) -> AppError {
        if self.kind().is_server_error() {
            // Internal details stay in the logs
            return AppError::internal("Internal server error");
        }
        AppError::new(self.kind(), self.to_string())
    }

    fn log(&self) {
        match self {
            AuthError::Signing(e) => {
                tracing::error!(error = %e, "Token signing failed");
            }
            AuthError::EmptySecret | AuthError::Internal(_) => {
                tracing::error!(error = %self, "Auth internal error");
            }
            AuthError::InvalidAlgorithm | AuthError::InvalidSignature => {
                tracing::warn!(error = %self, "Rejected forged or foreign token");
            }
            _ => {
                tracing::debug!(error = %self, "Auth error");
            }
        }
    }
}

impl From<jsonwebtoken::errors::Error> for AuthError {
    fn from(err: jsonwebtoken::errors::Error) -> Self {
        use jsonwebtoken::errors::ErrorKind as JwtErrorKind;

        match err.kind() {
            JwtErrorKind::InvalidSignature => AuthError::InvalidSignature,
            JwtErrorKind::InvalidAlgorithm | JwtErrorKind::InvalidAlgorithmName => {
                AuthError::InvalidAlgorithm
            }
            JwtErrorKind::ExpiredSignature => AuthError::Expired,
            _ => AuthError::MalformedToken,
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        self.log();
        self.to_app_error().into_response()
    }
}
