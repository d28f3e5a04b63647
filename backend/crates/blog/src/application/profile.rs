//! Profile Use Case
//!
//! Profile lookup and follow/unfollow. Self-follow and duplicate
//! (un)follows are rejected here, before the store is touched.

use std::sync::Arc;

use kernel::id::UserId;

use crate::domain::entity::Profile;
use crate::domain::repository::{FollowRepository, UserRepository};
use crate::error::{BlogError, BlogResult};

pub struct ProfileUseCase<R>
where
    R: UserRepository + FollowRepository,
{
    repo: Arc<R>,
}

impl<R> ProfileUseCase<R>
where
    R: UserRepository + FollowRepository,
{
    pub fn new(repo: Arc<R>) -> Self {
        Self { repo }
    }

    pub async fn get(&self, viewer: Option<UserId>, username: &str) -> BlogResult<Profile> {
        let user = self.repo.find_by_username(username).await?;
        let following = self.repo.is_following(viewer, Some(user.id)).await?;
        Ok(Profile::new(&user.summary(), following))
    }

    pub async fn follow(&self, viewer: UserId, username: &str) -> BlogResult<Profile> {
        let target = self.repo.find_by_username(username).await?;

        if target.id == viewer {
            return Err(BlogError::CannotFollowSelf);
        }
        if self.repo.is_following(Some(viewer), Some(target.id)).await? {
            return Err(BlogError::AlreadyFollowing);
        }

        if !self.repo.follow(viewer, target.id).await? {
            return Err(BlogError::AlreadyFollowing);
        }

        tracing::info!(follower = %viewer, followee = %target.id, "User followed");

        Ok(Profile::new(&target.summary(), true))
    }

    pub async fn unfollow(&self, viewer: UserId, username: &str) -> BlogResult<Profile> {
        let target = self.repo.find_by_username(username).await?;

        if !self.repo.is_following(Some(viewer), Some(target.id)).await? {
            return Err(BlogError::NotFollowing);
        }

        if !self.repo.unfollow(viewer, target.id).await? {
            return Err(BlogError::NotFollowing);
        }

        tracing::info!(follower = %viewer, followee = %target.id, "User unfollowed");

        Ok(Profile::new(&target.summary(), false))
    }
}
