//! API DTOs (Data Transfer Objects)

use chrono::{DateTime, Utc};
use kernel::id::{ArticleId, CommentId};
use serde::{Deserialize, Serialize};

use crate::application::{ArticleView, CommentView};
use crate::domain::entity::{Profile, User, UserSummary};

// ============================================================================
// Users
// ============================================================================

#[derive(Debug, Clone, Deserialize)]
pub struct RegisterRequest {
    pub user: RegisterUser,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RegisterUser {
    pub username: String,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoginRequest {
    pub user: LoginUser,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoginUser {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UpdateUserRequest {
    pub user: UpdateUser,
}

/// Omitted or empty fields are left unchanged
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UpdateUser {
    pub username: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub display_name: Option<String>,
    pub bio: Option<String>,
    pub image: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct UserResponse {
    pub user: UserBody,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserBody {
    pub username: String,
    pub email: String,
    pub display_name: String,
    pub bio: String,
    pub image: String,
}

impl From<&User> for UserResponse {
    fn from(user: &User) -> Self {
        Self {
            user: UserBody {
                username: user.username.clone(),
                email: user.email.clone(),
                display_name: user.display_name.clone(),
                bio: user.bio.clone(),
                image: user.image.clone(),
            },
        }
    }
}

// ============================================================================
// Profiles
// ============================================================================

#[derive(Debug, Clone, Serialize)]
pub struct ProfileResponse {
    pub profile: ProfileBody,
}

#[derive(Debug, Clone, Serialize)]
pub struct ProfileBody {
    pub username: String,
    pub bio: String,
    pub image: String,
    pub following: bool,
}

impl From<Profile> for ProfileBody {
    fn from(profile: Profile) -> Self {
        Self {
            username: profile.username,
            bio: profile.bio,
            image: profile.image,
            following: profile.following,
        }
    }
}

impl ProfileBody {
    fn author(summary: UserSummary, following: bool) -> Self {
        Self {
            username: summary.username,
            bio: summary.bio,
            image: summary.image,
            following,
        }
    }
}

// ============================================================================
// Articles
// ============================================================================

#[derive(Debug, Clone, Deserialize)]
pub struct NewArticleRequest {
    pub article: NewArticleBody,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewArticleBody {
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub body: String,
    #[serde(default)]
    pub tag_list: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UpdateArticleRequest {
    pub article: UpdateArticleBody,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct UpdateArticleBody {
    pub title: Option<String>,
    pub description: Option<String>,
    pub body: Option<String>,
}

/// `GET /articles` query string
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ListArticlesQuery {
    pub tag: Option<String>,
    pub author: Option<String>,
    pub favorited: Option<String>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

/// `GET /articles/feed` query string
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct FeedQuery {
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ArticleResponse {
    pub article: ArticleBody,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MultipleArticlesResponse {
    pub articles: Vec<ArticleBody>,
    pub articles_count: i64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ArticleBody {
    pub id: ArticleId,
    pub title: String,
    pub description: String,
    pub body: String,
    pub tag_list: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub favorited: bool,
    pub favorites_count: i64,
    pub author: ProfileBody,
}

impl From<ArticleView> for ArticleBody {
    fn from(view: ArticleView) -> Self {
        let tag_list = view.article.tag_names();
        let article = view.article;
        Self {
            id: article.id,
            title: article.title,
            description: article.description,
            body: article.body,
            tag_list,
            created_at: article.created_at,
            updated_at: article.updated_at,
            favorited: view.favorited,
            favorites_count: article.favorites_count,
            author: ProfileBody::author(article.author, view.author_following),
        }
    }
}

impl From<ArticleView> for ArticleResponse {
    fn from(view: ArticleView) -> Self {
        Self {
            article: view.into(),
        }
    }
}

// ============================================================================
// Comments
// ============================================================================

#[derive(Debug, Clone, Deserialize)]
pub struct NewCommentRequest {
    pub comment: NewCommentBody,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewCommentBody {
    pub body: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct CommentResponse {
    pub comment: CommentBody,
}

#[derive(Debug, Clone, Serialize)]
pub struct MultipleCommentsResponse {
    pub comments: Vec<CommentBody>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentBody {
    pub id: CommentId,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub body: String,
    pub author: ProfileBody,
}

impl From<CommentView> for CommentBody {
    fn from(view: CommentView) -> Self {
        let comment = view.comment;
        Self {
            id: comment.id,
            created_at: comment.created_at,
            updated_at: comment.updated_at,
            body: comment.body,
            author: ProfileBody::author(comment.author, view.author_following),
        }
    }
}

// ============================================================================
// Tags
// ============================================================================

#[derive(Debug, Clone, Serialize)]
pub struct TagsResponse {
    pub tags: Vec<String>,
}
