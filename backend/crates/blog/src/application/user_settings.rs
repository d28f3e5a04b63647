//! User Settings Use Case
//!
//! Reads and partially updates the signed-in user.

use std::sync::Arc;

use kernel::id::UserId;
use kernel::validation::ValidationErrors;
use platform::password::ClearTextPassword;

use crate::application::config::BlogConfig;
use crate::domain::entity::user::password_violation;
use crate::domain::entity::{User, UserPatch};
use crate::domain::repository::UserRepository;
use crate::error::BlogResult;

pub struct UserSettingsUseCase<U>
where
    U: UserRepository,
{
    users: Arc<U>,
    config: Arc<BlogConfig>,
}

impl<U> UserSettingsUseCase<U>
where
    U: UserRepository,
{
    pub fn new(users: Arc<U>, config: Arc<BlogConfig>) -> Self {
        Self { users, config }
    }

    pub async fn current(&self, user_id: UserId) -> BlogResult<User> {
        self.users.find_by_id(user_id).await
    }

    /// Merge `patch` over the stored user; re-hash only on a new password
    pub async fn update(&self, user_id: UserId, patch: UserPatch) -> BlogResult<User> {
        let stored = self.users.find_by_id(user_id).await?;
        if patch.is_empty() {
            return Ok(stored);
        }

        let mut merged = patch.merge(&stored);

        let mut errors = match merged.validate() {
            Ok(()) => ValidationErrors::new(),
            Err(errors) => errors,
        };
        let password = patch
            .new_password()
            .map(ClearTextPassword::new)
            .transpose()
            .map_err(|e| password_violation(&e));
        if let Err(violation) = &password {
            errors.push(violation.clone());
        }
        errors.into_result()?;

        if let Some(password) = password.map_err(ValidationErrors::from)? {
            merged.password_hash = password.hash(self.config.hash_cost)?;
        }

        let updated = self.users.update(&merged).await?;

        tracing::info!(
            user_id = %updated.id,
            password_changed = patch.new_password().is_some(),
            "User settings updated"
        );

        Ok(updated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::BlogError;
    use crate::testing::InMemoryBlogRepository;

    fn use_case(repo: &Arc<InMemoryBlogRepository>) -> UserSettingsUseCase<InMemoryBlogRepository> {
        UserSettingsUseCase::new(repo.clone(), Arc::new(BlogConfig::for_tests()))
    }

    #[tokio::test]
    async fn test_empty_patch_keeps_everything() {
        let repo = Arc::new(InMemoryBlogRepository::new());
        let alice = repo.seed_user("alice", "Str0ngP@ss!");

        let patch = UserPatch {
            username: Some(String::new()),
            bio: Some(String::new()),
            password: Some(String::new()),
            ..Default::default()
        };
        let updated = use_case(&repo).update(alice.id, patch).await.unwrap();

        assert_eq!(updated, alice);
        assert_eq!(repo.user_update_count(), 0);
    }

    #[tokio::test]
    async fn test_partial_update_without_password_keeps_hash() {
        let repo = Arc::new(InMemoryBlogRepository::new());
        let alice = repo.seed_user("alice", "Str0ngP@ss!");

        let patch = UserPatch {
            bio: Some("I write things".into()),
            ..Default::default()
        };
        let updated = use_case(&repo).update(alice.id, patch).await.unwrap();

        assert_eq!(updated.bio, "I write things");
        assert_eq!(updated.username, "alice");
        assert_eq!(updated.password_hash, alice.password_hash);
    }

    #[tokio::test]
    async fn test_new_password_is_rehashed() {
        let repo = Arc::new(InMemoryBlogRepository::new());
        let alice = repo.seed_user("alice", "Str0ngP@ss!");

        let patch = UserPatch {
            password: Some("N3wP@ssword".into()),
            ..Default::default()
        };
        let updated = use_case(&repo).update(alice.id, patch).await.unwrap();

        assert_ne!(updated.password_hash, alice.password_hash);
        assert!(
            updated
                .password_hash
                .verify(&ClearTextPassword::candidate("N3wP@ssword"))
        );
    }

    #[tokio::test]
    async fn test_invalid_merge_is_rejected() {
        let repo = Arc::new(InMemoryBlogRepository::new());
        let alice = repo.seed_user("alice", "Str0ngP@ss!");

        let patch = UserPatch {
            email: Some("broken".into()),
            password: Some("short".into()),
            ..Default::default()
        };
        let err = use_case(&repo).update(alice.id, patch).await.unwrap_err();

        let BlogError::Validation(errors) = err else {
            panic!("expected validation error");
        };
        assert!(errors.has_field("email"));
        assert!(errors.has_field("password"));
    }

    #[tokio::test]
    async fn test_username_conflict() {
        let repo = Arc::new(InMemoryBlogRepository::new());
        let alice = repo.seed_user("alice", "Str0ngP@ss!");
        repo.seed_user("bob", "Str0ngP@ss!");

        let patch = UserPatch {
            username: Some("bob".into()),
            ..Default::default()
        };
        let err = use_case(&repo).update(alice.id, patch).await.unwrap_err();
        assert!(matches!(err, BlogError::UsernameTaken));
    }
}
