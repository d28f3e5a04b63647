//! Blog Router

use axum::{
    Router, middleware,
    routing::{delete, get, post},
};
use std::sync::Arc;

use auth::{TokenService, resolve_identity};

use crate::application::config::BlogConfig;
use crate::infra::postgres::PgBlogRepository;
use crate::presentation::handlers::{
    BlogAppState, BlogRepository, articles, comments, profiles, users,
};

/// Create the Blog router with PostgreSQL repository
pub fn blog_router(repo: PgBlogRepository, tokens: Arc<TokenService>, config: BlogConfig) -> Router {
    blog_router_generic(repo, tokens, config)
}

/// Create a generic Blog router for any repository implementation
///
/// Account routes skip identity resolution so a stale access cookie never
/// blocks login, refresh or logout.
pub fn blog_router_generic<R>(repo: R, tokens: Arc<TokenService>, config: BlogConfig) -> Router
where
    R: BlogRepository,
{
    let state = BlogAppState {
        repo: Arc::new(repo),
        tokens: tokens.clone(),
        config: Arc::new(config),
    };

    let accounts = Router::new()
        .route("/users", post(users::register::<R>))
        .route("/users/login", post(users::login::<R>))
        .route("/users/refresh", post(users::refresh::<R>))
        .route("/users/logout", post(users::logout::<R>))
        .route("/tags", get(articles::tags::<R>));

    let resolved = Router::new()
        .route(
            "/user",
            get(users::current_user::<R>).put(users::update_user::<R>),
        )
        .route("/profiles/{username}", get(profiles::get_profile::<R>))
        .route(
            "/profiles/{username}/follow",
            post(profiles::follow::<R>).delete(profiles::unfollow::<R>),
        )
        .route(
            "/articles",
            get(articles::list::<R>).post(articles::create::<R>),
        )
        .route("/articles/feed", get(articles::feed::<R>))
        .route(
            "/articles/{id}",
            get(articles::get::<R>)
                .put(articles::update::<R>)
                .delete(articles::delete::<R>),
        )
        .route(
            "/articles/{id}/favorite",
            post(articles::favorite::<R>).delete(articles::unfavorite::<R>),
        )
        .route(
            "/articles/{id}/comments",
            get(comments::list::<R>).post(comments::add::<R>),
        )
        .route(
            "/articles/{id}/comments/{comment_id}",
            delete(comments::delete::<R>),
        )
        .layer(middleware::from_fn_with_state(tokens, resolve_identity));

    accounts.merge(resolved).with_state(state)
}
