//! User account handlers

use axum::Json;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::response::IntoResponse;

use auth::{CurrentUser, TokenPair};

use super::{BlogAppState, BlogRepository};
use crate::application::{
    LoginInput, LoginUseCase, RefreshUseCase, RegisterInput, RegisterUseCase, UserSettingsUseCase,
};
use crate::domain::entity::UserPatch;
use crate::error::BlogResult;
use crate::presentation::dto::{LoginRequest, RegisterRequest, UpdateUserRequest, UserResponse};

fn token_cookies<R>(state: &BlogAppState<R>, tokens: &TokenPair) -> BlogResult<HeaderMap>
where
    R: BlogRepository,
{
    let mut headers = HeaderMap::new();
    state
        .tokens
        .attach_tokens(&mut headers, tokens, &state.config.cookie_path)?;
    Ok(headers)
}

/// POST /api/users
pub async fn register<R>(
    State(state): State<BlogAppState<R>>,
    Json(req): Json<RegisterRequest>,
) -> BlogResult<impl IntoResponse>
where
    R: BlogRepository,
{
    let use_case = RegisterUseCase::new(state.repo.clone(), state.tokens.clone(), state.config.clone());

    let input = RegisterInput {
        username: req.user.username,
        email: req.user.email,
        password: req.user.password,
    };

    let output = use_case.execute(input).await?;
    let headers = token_cookies(&state, &output.tokens)?;

    Ok((StatusCode::CREATED, headers, Json(UserResponse::from(&output.user))))
}

/// POST /api/users/login
pub async fn login<R>(
    State(state): State<BlogAppState<R>>,
    Json(req): Json<LoginRequest>,
) -> BlogResult<impl IntoResponse>
where
    R: BlogRepository,
{
    let use_case = LoginUseCase::new(state.repo.clone(), state.tokens.clone());

    let input = LoginInput {
        email: req.user.email,
        password: req.user.password,
    };

    let output = use_case.execute(input).await?;
    let headers = token_cookies(&state, &output.tokens)?;

    Ok((headers, Json(UserResponse::from(&output.user))))
}

/// POST /api/users/refresh
///
/// Reads the refresh cookie and issues a fresh pair.
pub async fn refresh<R>(
    State(state): State<BlogAppState<R>>,
    headers: HeaderMap,
) -> BlogResult<impl IntoResponse>
where
    R: BlogRepository,
{
    let use_case = RefreshUseCase::new(state.repo.clone(), state.tokens.clone());

    let output = use_case.execute(&headers).await?;
    let cookies = token_cookies(&state, &output.tokens)?;

    Ok((cookies, Json(UserResponse::from(&output.user))))
}

/// POST /api/users/logout
pub async fn logout<R>(State(state): State<BlogAppState<R>>) -> BlogResult<impl IntoResponse>
where
    R: BlogRepository,
{
    let mut headers = HeaderMap::new();
    state
        .tokens
        .clear_tokens(&mut headers, &state.config.cookie_path)?;

    Ok((StatusCode::NO_CONTENT, headers))
}

/// GET /api/user
pub async fn current_user<R>(
    State(state): State<BlogAppState<R>>,
    CurrentUser(user_id): CurrentUser,
) -> BlogResult<Json<UserResponse>>
where
    R: BlogRepository,
{
    let use_case = UserSettingsUseCase::new(state.repo.clone(), state.config.clone());
    let user = use_case.current(user_id).await?;

    Ok(Json(UserResponse::from(&user)))
}

/// PUT /api/user
pub async fn update_user<R>(
    State(state): State<BlogAppState<R>>,
    CurrentUser(user_id): CurrentUser,
    Json(req): Json<UpdateUserRequest>,
) -> BlogResult<Json<UserResponse>>
where
    R: BlogRepository,
{
    let use_case = UserSettingsUseCase::new(state.repo.clone(), state.config.clone());

    let patch = UserPatch {
        username: req.user.username,
        email: req.user.email,
        password: req.user.password,
        display_name: req.user.display_name,
        bio: req.user.bio,
        image: req.user.image,
    };

    let user = use_case.update(user_id, patch).await?;

    Ok(Json(UserResponse::from(&user)))
}
