//! Comment Entity

use chrono::{DateTime, Utc};
use kernel::id::{ArticleId, CommentId, UserId};
use kernel::validation::ValidationErrors;

use super::user::UserSummary;

pub const COMMENT_MAX_LENGTH: usize = 10_000;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Comment {
    pub id: CommentId,
    pub article_id: ArticleId,
    pub author: UserSummary,
    pub body: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Comment {
    pub fn is_authored_by(&self, user_id: UserId) -> bool {
        self.author.id == user_id
    }
}

#[derive(Debug, Clone)]
pub struct NewComment {
    pub article_id: ArticleId,
    pub author_id: UserId,
    pub body: String,
}

impl NewComment {
    pub fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        errors.check_text("body", &self.body, COMMENT_MAX_LENGTH);
        errors.into_result()
    }
}
