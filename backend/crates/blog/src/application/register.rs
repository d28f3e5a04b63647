//! Register Use Case
//!
//! Creates a new user account and signs it in.

use std::sync::Arc;

use auth::TokenService;
use kernel::validation::ValidationErrors;
use platform::password::ClearTextPassword;

use crate::application::SignedInUser;
use crate::application::config::BlogConfig;
use crate::domain::entity::user::{
    NewUser, check_identity, normalize_email, normalize_username, password_violation,
};
use crate::domain::repository::UserRepository;
use crate::error::BlogResult;

/// Register input
pub struct RegisterInput {
    pub username: String,
    pub email: String,
    pub password: String,
}

/// Register use case
pub struct RegisterUseCase<U>
where
    U: UserRepository,
{
    users: Arc<U>,
    tokens: Arc<TokenService>,
    config: Arc<BlogConfig>,
}

impl<U> RegisterUseCase<U>
where
    U: UserRepository,
{
    pub fn new(users: Arc<U>, tokens: Arc<TokenService>, config: Arc<BlogConfig>) -> Self {
        Self {
            users,
            tokens,
            config,
        }
    }

    pub async fn execute(&self, input: RegisterInput) -> BlogResult<SignedInUser> {
        let username = normalize_username(&input.username);
        let email = normalize_email(&input.email);

        // Collect every field problem before hashing
        let mut errors = ValidationErrors::new();
        check_identity(&username, &email, &mut errors);
        let password = ClearTextPassword::new(input.password).map_err(|e| password_violation(&e));
        if let Err(violation) = &password {
            errors.push(violation.clone());
        }
        errors.into_result()?;
        let password = password.map_err(ValidationErrors::from)?;

        let password_hash = password.hash(self.config.hash_cost)?;

        let user = self
            .users
            .create(NewUser::new(&username, &email, password_hash))
            .await?;

        let tokens = self.tokens.issue_token_pair(user.id)?;

        tracing::info!(user_id = %user.id, username = %user.username, "User registered");

        Ok(SignedInUser { user, tokens })
    }
}
