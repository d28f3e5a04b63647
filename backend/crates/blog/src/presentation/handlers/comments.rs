//! Comment handlers

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;

use auth::{CurrentUser, MaybeUser};
use kernel::id::{ArticleId, CommentId};

use super::{BlogAppState, BlogRepository};
use crate::application::CommentUseCase;
use crate::error::BlogResult;
use crate::presentation::dto::{CommentResponse, MultipleCommentsResponse, NewCommentRequest};

/// GET /api/articles/{id}/comments
pub async fn list<R>(
    State(state): State<BlogAppState<R>>,
    MaybeUser(viewer): MaybeUser,
    Path(article_id): Path<ArticleId>,
) -> BlogResult<Json<MultipleCommentsResponse>>
where
    R: BlogRepository,
{
    let views = CommentUseCase::new(state.repo.clone(), state.repo.clone())
        .list(viewer, article_id)
        .await?;

    Ok(Json(MultipleCommentsResponse {
        comments: views.into_iter().map(Into::into).collect(),
    }))
}

/// POST /api/articles/{id}/comments
pub async fn add<R>(
    State(state): State<BlogAppState<R>>,
    CurrentUser(author): CurrentUser,
    Path(article_id): Path<ArticleId>,
    Json(req): Json<NewCommentRequest>,
) -> BlogResult<(StatusCode, Json<CommentResponse>)>
where
    R: BlogRepository,
{
    let view = CommentUseCase::new(state.repo.clone(), state.repo.clone())
        .add(author, article_id, req.comment.body)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(CommentResponse {
            comment: view.into(),
        }),
    ))
}

/// DELETE /api/articles/{id}/comments/{comment_id}
pub async fn delete<R>(
    State(state): State<BlogAppState<R>>,
    CurrentUser(viewer): CurrentUser,
    Path((article_id, comment_id)): Path<(ArticleId, CommentId)>,
) -> BlogResult<StatusCode>
where
    R: BlogRepository,
{
    CommentUseCase::new(state.repo.clone(), state.repo.clone())
        .delete(viewer, article_id, comment_id)
        .await?;

    Ok(StatusCode::NO_CONTENT)
}
