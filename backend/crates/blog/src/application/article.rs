//! Article Use Case
//!
//! Authoring, listing and favoriting. Results are `ArticleView`s carrying the
//! viewer-relative `favorited` and author `following` flags.

use std::collections::HashSet;
use std::sync::Arc;

use kernel::id::{ArticleId, UserId};

use crate::domain::entity::{Article, ArticleFilter, ArticlePage, ArticlePatch, NewArticle, Page};
use crate::domain::repository::{
    ArticleRepository, FavoriteRepository, FollowRepository, TagRepository,
};
use crate::error::{BlogError, BlogResult};

/// Article as seen by a (possibly anonymous) viewer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArticleView {
    pub article: Article,
    pub favorited: bool,
    pub author_following: bool,
}

/// Article creation input
pub struct CreateArticleInput {
    pub title: String,
    pub description: String,
    pub body: String,
    pub tag_list: Vec<String>,
}

pub struct ArticleUseCase<R>
where
    R: ArticleRepository + FollowRepository + FavoriteRepository + TagRepository,
{
    repo: Arc<R>,
}

impl<R> ArticleUseCase<R>
where
    R: ArticleRepository + FollowRepository + FavoriteRepository + TagRepository,
{
    pub fn new(repo: Arc<R>) -> Self {
        Self { repo }
    }

    pub async fn create(&self, author: UserId, input: CreateArticleInput) -> BlogResult<ArticleView> {
        let new_article = NewArticle::new(
            author,
            &input.title,
            &input.description,
            &input.body,
            &input.tag_list,
        );
        new_article.validate()?;

        let article = self.repo.create(new_article).await?;

        tracing::info!(article_id = %article.id, author = %author, "Article created");

        Ok(ArticleView {
            article,
            favorited: false,
            author_following: false,
        })
    }

    pub async fn get(&self, viewer: Option<UserId>, id: ArticleId) -> BlogResult<ArticleView> {
        let article = self.repo.find_by_id(id).await?;
        self.view(viewer, article).await
    }

    /// Author only
    pub async fn update(
        &self,
        viewer: UserId,
        id: ArticleId,
        patch: ArticlePatch,
    ) -> BlogResult<ArticleView> {
        let article = self.owned_article(viewer, id).await?;

        let patch = patch.normalized();
        if patch.is_empty() {
            return self.view(Some(viewer), article).await;
        }
        patch.merge(&article).validate()?;

        let updated = self.repo.update(id, &patch).await?;

        tracing::info!(article_id = %id, "Article updated");

        self.view(Some(viewer), updated).await
    }

    /// Author only
    pub async fn delete(&self, viewer: UserId, id: ArticleId) -> BlogResult<()> {
        self.owned_article(viewer, id).await?;
        self.repo.delete(id).await?;

        tracing::info!(article_id = %id, "Article deleted");

        Ok(())
    }

    pub async fn list(
        &self,
        viewer: Option<UserId>,
        filter: &ArticleFilter,
        page: Page,
    ) -> BlogResult<(Vec<ArticleView>, i64)> {
        let page = self.repo.list(filter, page).await?;
        let following = match viewer {
            Some(viewer) => self.repo.following_ids(viewer).await?,
            None => Vec::new(),
        };
        self.views(viewer, following, page).await
    }

    /// Articles by users the viewer follows
    pub async fn feed(&self, viewer: UserId, page: Page) -> BlogResult<(Vec<ArticleView>, i64)> {
        let authors = self.repo.following_ids(viewer).await?;
        if authors.is_empty() {
            return Ok((Vec::new(), 0));
        }
        let page = self.repo.feed(&authors, page).await?;
        self.views(Some(viewer), authors, page).await
    }

    /// Conflict if already favorited, even when a concurrent request wins
    /// the race after the pre-check
    pub async fn favorite(&self, viewer: UserId, id: ArticleId) -> BlogResult<ArticleView> {
        let article = self.repo.find_by_id(id).await?;
        if self.repo.is_favorited(id, Some(viewer)).await? {
            return Err(BlogError::AlreadyFavorited);
        }

        let outcome = self.repo.add_favorite(id, viewer).await?;
        if !outcome.relation_changed {
            return Err(BlogError::AlreadyFavorited);
        }
        tracing::info!(
            article_id = %id,
            user_id = %viewer,
            favorites_count = outcome.favorites_count,
            "Article favorited"
        );

        let article = Article {
            favorites_count: outcome.favorites_count,
            ..article
        };
        self.view(Some(viewer), article).await
    }

    pub async fn unfavorite(&self, viewer: UserId, id: ArticleId) -> BlogResult<ArticleView> {
        let article = self.repo.find_by_id(id).await?;
        if !self.repo.is_favorited(id, Some(viewer)).await? {
            return Err(BlogError::NotFavorited);
        }

        let outcome = self.repo.remove_favorite(id, viewer).await?;
        if !outcome.relation_changed {
            return Err(BlogError::NotFavorited);
        }
        tracing::info!(
            article_id = %id,
            user_id = %viewer,
            favorites_count = outcome.favorites_count,
            "Article unfavorited"
        );

        let article = Article {
            favorites_count: outcome.favorites_count,
            ..article
        };
        self.view(Some(viewer), article).await
    }

    pub async fn tags(&self) -> BlogResult<Vec<String>> {
        self.repo.all_names().await
    }

    // ========================================================================
    // Helpers
    // ========================================================================

    async fn owned_article(&self, viewer: UserId, id: ArticleId) -> BlogResult<Article> {
        let article = self.repo.find_by_id(id).await?;
        if !article.is_authored_by(viewer) {
            return Err(BlogError::Forbidden);
        }
        Ok(article)
    }

    async fn view(&self, viewer: Option<UserId>, article: Article) -> BlogResult<ArticleView> {
        let favorited = self.repo.is_favorited(article.id, viewer).await?;
        let author_following = self
            .repo
            .is_following(viewer, Some(article.author.id))
            .await?;

        Ok(ArticleView {
            article,
            favorited,
            author_following,
        })
    }

    /// `following` is the viewer's followee set, looked up once per page
    async fn views(
        &self,
        viewer: Option<UserId>,
        following: Vec<UserId>,
        page: ArticlePage,
    ) -> BlogResult<(Vec<ArticleView>, i64)> {
        let favorited: HashSet<ArticleId> = match viewer {
            Some(viewer) if !page.articles.is_empty() => {
                let ids: Vec<ArticleId> = page.articles.iter().map(|a| a.id).collect();
                self.repo
                    .favorited_among(viewer, &ids)
                    .await?
                    .into_iter()
                    .collect()
            }
            _ => HashSet::new(),
        };
        let following: HashSet<UserId> = following.into_iter().collect();

        let views = page
            .articles
            .into_iter()
            .map(|article| ArticleView {
                favorited: favorited.contains(&article.id),
                author_following: following.contains(&article.author.id),
                article,
            })
            .collect();

        Ok((views, page.total))
    }
}
