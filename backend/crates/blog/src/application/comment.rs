//! Comment Use Case

use std::collections::HashSet;
use std::sync::Arc;

use kernel::id::{ArticleId, CommentId, UserId};

use crate::domain::entity::{Comment, NewComment};
use crate::domain::repository::{ArticleRepository, CommentRepository, FollowRepository};
use crate::error::{BlogError, BlogResult};

/// Comment as seen by a (possibly anonymous) viewer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommentView {
    pub comment: Comment,
    pub author_following: bool,
}

pub struct CommentUseCase<C, A>
where
    C: CommentRepository + FollowRepository,
    A: ArticleRepository,
{
    comments: Arc<C>,
    articles: Arc<A>,
}

impl<C, A> CommentUseCase<C, A>
where
    C: CommentRepository + FollowRepository,
    A: ArticleRepository,
{
    pub fn new(comments: Arc<C>, articles: Arc<A>) -> Self {
        Self { comments, articles }
    }

    pub async fn add(&self, author: UserId, article: ArticleId, body: String) -> BlogResult<CommentView> {
        let new_comment = NewComment {
            article_id: article,
            author_id: author,
            body,
        };
        new_comment.validate()?;

        // Explicit check so a missing article is not reported as a DB error
        self.articles.find_by_id(article).await?;

        let comment = self.comments.create(new_comment).await?;

        tracing::info!(comment_id = %comment.id, article_id = %article, "Comment added");

        Ok(CommentView {
            comment,
            author_following: false,
        })
    }

    pub async fn list(&self, viewer: Option<UserId>, article: ArticleId) -> BlogResult<Vec<CommentView>> {
        let comments = self.comments.list_for_article(article).await?;

        let following: HashSet<UserId> = match viewer {
            Some(viewer) if !comments.is_empty() => {
                self.comments.following_ids(viewer).await?.into_iter().collect()
            }
            _ => HashSet::new(),
        };

        Ok(comments
            .into_iter()
            .map(|comment| CommentView {
                author_following: following.contains(&comment.author.id),
                comment,
            })
            .collect())
    }

    /// Comment author only; the comment must belong to `article`
    pub async fn delete(&self, viewer: UserId, article: ArticleId, id: CommentId) -> BlogResult<()> {
        let comment = self.comments.find_by_id(id).await?;

        if comment.article_id != article {
            return Err(BlogError::CommentNotFound);
        }
        if !comment.is_authored_by(viewer) {
            return Err(BlogError::Forbidden);
        }

        self.comments.delete(id).await?;

        tracing::info!(comment_id = %id, article_id = %article, "Comment deleted");

        Ok(())
    }
}
