//! HTTP Handlers

pub mod articles;
pub mod comments;
pub mod profiles;
pub mod users;

use std::sync::Arc;

use auth::TokenService;

use crate::application::config::BlogConfig;
use crate::domain::repository::{
    ArticleRepository, CommentRepository, FavoriteRepository, FollowRepository, TagRepository,
    UserRepository,
};

/// Every repository the HTTP surface needs, behind one bound
pub trait BlogRepository:
    UserRepository
    + FollowRepository
    + ArticleRepository
    + FavoriteRepository
    + TagRepository
    + CommentRepository
    + Send
    + Sync
    + 'static
{
}

impl<T> BlogRepository for T where
    T: UserRepository
        + FollowRepository
        + ArticleRepository
        + FavoriteRepository
        + TagRepository
        + CommentRepository
        + Send
        + Sync
        + 'static
{
}

/// Shared state for blog handlers
pub struct BlogAppState<R>
where
    R: BlogRepository,
{
    pub repo: Arc<R>,
    pub tokens: Arc<TokenService>,
    pub config: Arc<BlogConfig>,
}

// Manual impl: the repository itself need not be Clone
impl<R> Clone for BlogAppState<R>
where
    R: BlogRepository,
{
    fn clone(&self) -> Self {
        Self {
            repo: self.repo.clone(),
            tokens: self.tokens.clone(),
            config: self.config.clone(),
        }
    }
}
