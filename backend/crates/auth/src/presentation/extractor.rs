//! Identity Extractors

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use kernel::id::UserId;

use crate::domain::context::request_context;
use crate::error::AuthError;

/// Authenticated user id; rejects anonymous requests with 401
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CurrentUser(pub UserId);

/// User id if the request carries a valid access token
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MaybeUser(pub Option<UserId>);

impl<S> FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        request_context(&parts.extensions)
            .user_id()
            .map(CurrentUser)
            .ok_or(AuthError::Unauthenticated)
    }
}

impl<S> FromRequestParts<S> for MaybeUser
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(MaybeUser(request_context(&parts.extensions).user_id()))
    }
}
