//! Login Use Case

use std::sync::Arc;

use auth::TokenService;
use platform::password::ClearTextPassword;

use crate::application::SignedInUser;
use crate::domain::entity::user::normalize_email;
use crate::domain::repository::UserRepository;
use crate::error::{BlogError, BlogResult};

/// Login input
pub struct LoginInput {
    pub email: String,
    pub password: String,
}

/// Login use case
pub struct LoginUseCase<U>
where
    U: UserRepository,
{
    users: Arc<U>,
    tokens: Arc<TokenService>,
}

impl<U> LoginUseCase<U>
where
    U: UserRepository,
{
    pub fn new(users: Arc<U>, tokens: Arc<TokenService>) -> Self {
        Self { users, tokens }
    }

    /// Unknown email and wrong password both yield `InvalidCredentials`
    pub async fn execute(&self, input: LoginInput) -> BlogResult<SignedInUser> {
        let email = normalize_email(&input.email);
        let candidate = ClearTextPassword::candidate(input.password);

        let user = match self.users.find_by_email(&email).await {
            Ok(user) => user,
            Err(BlogError::UserNotFound) => return Err(BlogError::InvalidCredentials),
            Err(e) => return Err(e),
        };

        if !user.password_hash.verify(&candidate) {
            return Err(BlogError::InvalidCredentials);
        }

        let tokens = self.tokens.issue_token_pair(user.id)?;

        tracing::info!(user_id = %user.id, "User logged in");

        Ok(SignedInUser { user, tokens })
    }
}
