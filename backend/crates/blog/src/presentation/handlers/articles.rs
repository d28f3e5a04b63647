//! Article, favorite and tag handlers

use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;

use auth::{CurrentUser, MaybeUser};
use kernel::id::ArticleId;

use super::{BlogAppState, BlogRepository};
use crate::application::{ArticleUseCase, ArticleView, CreateArticleInput};
use crate::domain::entity::{ArticleFilter, ArticlePatch, Page};
use crate::error::BlogResult;
use crate::presentation::dto::{
    ArticleResponse, FeedQuery, ListArticlesQuery, MultipleArticlesResponse, NewArticleRequest,
    TagsResponse, UpdateArticleRequest,
};

fn multiple(views: Vec<ArticleView>, total: i64) -> MultipleArticlesResponse {
    MultipleArticlesResponse {
        articles: views.into_iter().map(Into::into).collect(),
        articles_count: total,
    }
}

/// GET /api/articles
pub async fn list<R>(
    State(state): State<BlogAppState<R>>,
    MaybeUser(viewer): MaybeUser,
    Query(query): Query<ListArticlesQuery>,
) -> BlogResult<Json<MultipleArticlesResponse>>
where
    R: BlogRepository,
{
    let filter = ArticleFilter {
        tag: query.tag,
        author: query.author,
        favorited_by: query.favorited,
    };
    let page = Page::new(query.limit, query.offset);

    let (views, total) = ArticleUseCase::new(state.repo.clone())
        .list(viewer, &filter, page)
        .await?;

    Ok(Json(multiple(views, total)))
}

/// GET /api/articles/feed
pub async fn feed<R>(
    State(state): State<BlogAppState<R>>,
    CurrentUser(viewer): CurrentUser,
    Query(query): Query<FeedQuery>,
) -> BlogResult<Json<MultipleArticlesResponse>>
where
    R: BlogRepository,
{
    let page = Page::new(query.limit, query.offset);

    let (views, total) = ArticleUseCase::new(state.repo.clone())
        .feed(viewer, page)
        .await?;

    Ok(Json(multiple(views, total)))
}

/// POST /api/articles
pub async fn create<R>(
    State(state): State<BlogAppState<R>>,
    CurrentUser(author): CurrentUser,
    Json(req): Json<NewArticleRequest>,
) -> BlogResult<(StatusCode, Json<ArticleResponse>)>
where
    R: BlogRepository,
{
    let input = CreateArticleInput {
        title: req.article.title,
        description: req.article.description,
        body: req.article.body,
        tag_list: req.article.tag_list,
    };

    let view = ArticleUseCase::new(state.repo.clone())
        .create(author, input)
        .await?;

    Ok((StatusCode::CREATED, Json(view.into())))
}

/// GET /api/articles/{id}
pub async fn get<R>(
    State(state): State<BlogAppState<R>>,
    MaybeUser(viewer): MaybeUser,
    Path(id): Path<ArticleId>,
) -> BlogResult<Json<ArticleResponse>>
where
    R: BlogRepository,
{
    let view = ArticleUseCase::new(state.repo.clone()).get(viewer, id).await?;

    Ok(Json(view.into()))
}

/// PUT /api/articles/{id}
pub async fn update<R>(
    State(state): State<BlogAppState<R>>,
    CurrentUser(viewer): CurrentUser,
    Path(id): Path<ArticleId>,
    Json(req): Json<UpdateArticleRequest>,
) -> BlogResult<Json<ArticleResponse>>
where
    R: BlogRepository,
{
    let patch = ArticlePatch {
        title: req.article.title,
        description: req.article.description,
        body: req.article.body,
    };

    let view = ArticleUseCase::new(state.repo.clone())
        .update(viewer, id, patch)
        .await?;

    Ok(Json(view.into()))
}

/// DELETE /api/articles/{id}
pub async fn delete<R>(
    State(state): State<BlogAppState<R>>,
    CurrentUser(viewer): CurrentUser,
    Path(id): Path<ArticleId>,
) -> BlogResult<StatusCode>
where
    R: BlogRepository,
{
    ArticleUseCase::new(state.repo.clone())
        .delete(viewer, id)
        .await?;

    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/articles/{id}/favorite
pub async fn favorite<R>(
    State(state): State<BlogAppState<R>>,
    CurrentUser(viewer): CurrentUser,
    Path(id): Path<ArticleId>,
) -> BlogResult<Json<ArticleResponse>>
where
    R: BlogRepository,
{
    let view = ArticleUseCase::new(state.repo.clone())
        .favorite(viewer, id)
        .await?;

    Ok(Json(view.into()))
}

/// DELETE /api/articles/{id}/favorite
pub async fn unfavorite<R>(
    State(state): State<BlogAppState<R>>,
    CurrentUser(viewer): CurrentUser,
    Path(id): Path<ArticleId>,
) -> BlogResult<Json<ArticleResponse>>
where
    R: BlogRepository,
{
    let view = ArticleUseCase::new(state.repo.clone())
        .unfavorite(viewer, id)
        .await?;

    Ok(Json(view.into()))
}

/// GET /api/tags
pub async fn tags<R>(State(state): State<BlogAppState<R>>) -> BlogResult<Json<TagsResponse>>
where
    R: BlogRepository,
{
    let tags = ArticleUseCase::new(state.repo.clone()).tags().await?;

    Ok(Json(TagsResponse { tags }))
}
