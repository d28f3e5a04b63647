//! Profile handlers

use axum::Json;
use axum::extract::{Path, State};

use auth::{CurrentUser, MaybeUser};

use super::{BlogAppState, BlogRepository};
use crate::application::ProfileUseCase;
use crate::error::BlogResult;
use crate::presentation::dto::ProfileResponse;

/// GET /api/profiles/{username}
pub async fn get_profile<R>(
    State(state): State<BlogAppState<R>>,
    MaybeUser(viewer): MaybeUser,
    Path(username): Path<String>,
) -> BlogResult<Json<ProfileResponse>>
where
    R: BlogRepository,
{
    let profile = ProfileUseCase::new(state.repo.clone())
        .get(viewer, &username)
        .await?;

    Ok(Json(ProfileResponse {
        profile: profile.into(),
    }))
}

/// POST /api/profiles/{username}/follow
pub async fn follow<R>(
    State(state): State<BlogAppState<R>>,
    CurrentUser(viewer): CurrentUser,
    Path(username): Path<String>,
) -> BlogResult<Json<ProfileResponse>>
where
    R: BlogRepository,
{
    let profile = ProfileUseCase::new(state.repo.clone())
        .follow(viewer, &username)
        .await?;

    Ok(Json(ProfileResponse {
        profile: profile.into(),
    }))
}

/// DELETE /api/profiles/{username}/follow
pub async fn unfollow<R>(
    State(state): State<BlogAppState<R>>,
    CurrentUser(viewer): CurrentUser,
    Path(username): Path<String>,
) -> BlogResult<Json<ProfileResponse>>
where
    R: BlogRepository,
{
    let profile = ProfileUseCase::new(state.repo.clone())
        .unfollow(viewer, &username)
        .await?;

    Ok(Json(ProfileResponse {
        profile: profile.into(),
    }))
}
