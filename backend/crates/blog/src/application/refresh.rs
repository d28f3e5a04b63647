//! Refresh Use Case
//!
//! Trades a valid refresh cookie for a new token pair.

use std::sync::Arc;

use auth::{AuthError, Strictness, TokenKind, TokenService};
use axum::http::HeaderMap;

use crate::application::SignedInUser;
use crate::domain::repository::UserRepository;
use crate::error::{BlogError, BlogResult};

pub struct RefreshUseCase<U>
where
    U: UserRepository,
{
    users: Arc<U>,
    tokens: Arc<TokenService>,
}

impl<U> RefreshUseCase<U>
where
    U: UserRepository,
{
    pub fn new(users: Arc<U>, tokens: Arc<TokenService>) -> Self {
        Self { users, tokens }
    }

    pub async fn execute(&self, headers: &HeaderMap) -> BlogResult<SignedInUser> {
        let user_id = self
            .tokens
            .extract_user_id(headers, Strictness::Strict, TokenKind::Refresh)?
            .ok_or(AuthError::MissingToken(TokenKind::Refresh))?;

        // A deleted account cannot refresh
        let user = match self.users.find_by_id(user_id).await {
            Ok(user) => user,
            Err(BlogError::UserNotFound) => return Err(AuthError::Unauthenticated.into()),
            Err(e) => return Err(e),
        };

        let tokens = self.tokens.issue_token_pair(user.id)?;

        tracing::debug!(user_id = %user.id, "Token pair refreshed");

        Ok(SignedInUser { user, tokens })
    }
}
