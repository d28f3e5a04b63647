//! Repository Traits
//!
//! Interfaces for data persistence. Implementation is in infrastructure layer.
//! Lookups report a missing row as the matching `*NotFound` error, never as
//! `Ok(None)`.

use kernel::id::{ArticleId, CommentId, UserId};

use crate::domain::entity::{
    Article, ArticleFilter, ArticlePage, ArticlePatch, Comment, FavoriteOutcome, NewArticle,
    NewComment, NewUser, Page, User,
};
use crate::error::BlogResult;

/// User repository trait
#[trait_variant::make(UserRepository: Send)]
pub trait LocalUserRepository {
    async fn find_by_id(&self, id: UserId) -> BlogResult<User>;

    async fn find_by_email(&self, email: &str) -> BlogResult<User>;

    async fn find_by_username(&self, username: &str) -> BlogResult<User>;

    /// Insert a user; duplicates fail with `UsernameTaken` / `EmailTaken`
    async fn create(&self, user: NewUser) -> BlogResult<User>;

    /// Overwrite every mutable column; returns the stored row
    async fn update(&self, user: &User) -> BlogResult<User>;
}

/// Follow relation repository trait
#[trait_variant::make(FollowRepository: Send)]
pub trait LocalFollowRepository {
    /// `false` when either side is anonymous
    async fn is_following(
        &self,
        follower: Option<UserId>,
        followee: Option<UserId>,
    ) -> BlogResult<bool>;

    /// Returns whether a row was inserted
    async fn follow(&self, follower: UserId, followee: UserId) -> BlogResult<bool>;

    /// Returns whether a row was deleted
    async fn unfollow(&self, follower: UserId, followee: UserId) -> BlogResult<bool>;

    async fn following_ids(&self, follower: UserId) -> BlogResult<Vec<UserId>>;
}

/// Article repository trait
#[trait_variant::make(ArticleRepository: Send)]
pub trait LocalArticleRepository {
    /// Insert the article and upsert its tags in one transaction
    async fn create(&self, article: NewArticle) -> BlogResult<Article>;

    async fn find_by_id(&self, id: ArticleId) -> BlogResult<Article>;

    /// Apply the supplied fields; tags are left as they are
    async fn update(&self, id: ArticleId, patch: &ArticlePatch) -> BlogResult<Article>;

    /// Newest first
    async fn list(&self, filter: &ArticleFilter, page: Page) -> BlogResult<ArticlePage>;

    /// Articles written by any of `authors`, newest first
    async fn feed(&self, authors: &[UserId], page: Page) -> BlogResult<ArticlePage>;

    /// Remove the article with its comments, favorites and tag links
    async fn delete(&self, id: ArticleId) -> BlogResult<()>;
}

/// Favorite relation repository trait
#[trait_variant::make(FavoriteRepository: Send)]
pub trait LocalFavoriteRepository {
    /// `false` when the user is anonymous
    async fn is_favorited(&self, article: ArticleId, user: Option<UserId>) -> BlogResult<bool>;

    /// Subset of `articles` favorited by `user`
    async fn favorited_among(
        &self,
        user: UserId,
        articles: &[ArticleId],
    ) -> BlogResult<Vec<ArticleId>>;

    /// Insert the relation and bump the counter in one transaction
    async fn add_favorite(&self, article: ArticleId, user: UserId) -> BlogResult<FavoriteOutcome>;

    /// Delete the relation and lower the counter in one transaction
    async fn remove_favorite(
        &self,
        article: ArticleId,
        user: UserId,
    ) -> BlogResult<FavoriteOutcome>;
}

/// Tag repository trait
#[trait_variant::make(TagRepository: Send)]
pub trait LocalTagRepository {
    /// Every tag name, sorted
    async fn all_names(&self) -> BlogResult<Vec<String>>;
}

/// Comment repository trait
#[trait_variant::make(CommentRepository: Send)]
pub trait LocalCommentRepository {
    async fn create(&self, comment: NewComment) -> BlogResult<Comment>;

    /// Oldest first; `ArticleNotFound` for a missing article
    async fn list_for_article(&self, article: ArticleId) -> BlogResult<Vec<Comment>>;

    async fn find_by_id(&self, id: CommentId) -> BlogResult<Comment>;

    /// No ownership check
    async fn delete(&self, id: CommentId) -> BlogResult<()>;
}
