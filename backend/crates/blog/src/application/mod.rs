//! Application Layer
//!
//! Use cases sit between the HTTP handlers and the repositories. They own
//! the checks the store does not: ownership, self-follow, duplicate
//! follow/favorite, patch validation and password hashing.

pub mod article;
pub mod comment;
pub mod config;
pub mod login;
pub mod profile;
pub mod refresh;
pub mod register;
pub mod user_settings;

pub use article::{ArticleUseCase, ArticleView, CreateArticleInput};
pub use comment::{CommentUseCase, CommentView};
pub use login::{LoginInput, LoginUseCase};
pub use profile::ProfileUseCase;
pub use refresh::RefreshUseCase;
pub use register::{RegisterInput, RegisterUseCase};
pub use user_settings::UserSettingsUseCase;

use auth::TokenPair;

use crate::domain::entity::User;

/// User plus a freshly issued token pair
#[derive(Debug, Clone)]
pub struct SignedInUser {
    pub user: User,
    pub tokens: TokenPair,
}
