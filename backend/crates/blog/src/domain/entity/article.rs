//! Article Entity

use chrono::{DateTime, Utc};
use kernel::id::{ArticleId, TagId, UserId};
use kernel::validation::{ValidationErrors, Violation};

use super::user::UserSummary;

pub const TITLE_MAX_LENGTH: usize = 256;
pub const DESCRIPTION_MAX_LENGTH: usize = 1_024;
pub const BODY_MAX_LENGTH: usize = 100_000;
pub const TAG_MAX_LENGTH: usize = 64;

/// Persisted article with its author and tags
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Article {
    pub id: ArticleId,
    pub author: UserSummary,
    pub title: String,
    pub description: String,
    pub body: String,
    /// Sorted by name
    pub tags: Vec<Tag>,
    pub favorites_count: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Article {
    pub fn is_authored_by(&self, user_id: UserId) -> bool {
        self.author.id == user_id
    }

    pub fn tag_names(&self) -> Vec<String> {
        self.tags.iter().map(|tag| tag.name.clone()).collect()
    }

    pub fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        validate_content(&self.title, &self.description, &self.body, &mut errors);
        errors.into_result()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tag {
    pub id: TagId,
    pub name: String,
}

/// Result of adding or removing a favorite
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FavoriteOutcome {
    /// False when the relation was already in the requested state
    pub relation_changed: bool,
    pub favorites_count: i64,
}

// ============================================================================
// Creation
// ============================================================================

#[derive(Debug, Clone)]
pub struct NewArticle {
    pub author_id: UserId,
    pub title: String,
    pub description: String,
    pub body: String,
    pub tag_names: Vec<String>,
}

impl NewArticle {
    pub fn new(
        author_id: UserId,
        title: &str,
        description: &str,
        body: &str,
        tag_names: &[String],
    ) -> Self {
        Self {
            author_id,
            title: title.trim().to_string(),
            description: description.trim().to_string(),
            body: body.to_string(),
            tag_names: dedup_tags(tag_names),
        }
    }

    pub fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        validate_content(&self.title, &self.description, &self.body, &mut errors);

        if self.tag_names.is_empty() {
            errors.push(Violation::Empty { field: "tagList" });
        }
        if self
            .tag_names
            .iter()
            .any(|tag| tag.chars().count() > TAG_MAX_LENGTH)
        {
            errors.push(Violation::TooLong {
                field: "tagList",
                max: TAG_MAX_LENGTH,
            });
        }

        errors.into_result()
    }
}

/// Trim, drop blanks and deduplicate, keeping first-seen order
fn dedup_tags(raw: &[String]) -> Vec<String> {
    let mut tags: Vec<String> = Vec::with_capacity(raw.len());
    for tag in raw.iter().map(|t| t.trim()).filter(|t| !t.is_empty()) {
        if !tags.iter().any(|seen| seen == tag) {
            tags.push(tag.to_string());
        }
    }
    tags
}

// ============================================================================
// Partial update
// ============================================================================

/// Title/description/body update; tags are immutable after creation
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ArticlePatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub body: Option<String>,
}

impl ArticlePatch {
    /// Trim and turn empty values into `None`
    pub fn normalized(&self) -> Self {
        let clean = |field: &Option<String>, trim: bool| {
            field
                .as_deref()
                .map(|v| if trim { v.trim() } else { v })
                .filter(|v| !v.is_empty())
                .map(str::to_string)
        };
        Self {
            title: clean(&self.title, true),
            description: clean(&self.description, true),
            body: clean(&self.body, false),
        }
    }

    pub fn is_empty(&self) -> bool {
        let patch = self.normalized();
        patch.title.is_none() && patch.description.is_none() && patch.body.is_none()
    }

    /// New article value with every supplied field overwritten
    pub fn merge(&self, article: &Article) -> Article {
        let patch = self.normalized();
        let mut merged = article.clone();
        if let Some(title) = patch.title {
            merged.title = title;
        }
        if let Some(description) = patch.description {
            merged.description = description;
        }
        if let Some(body) = patch.body {
            merged.body = body;
        }
        merged
    }
}

fn validate_content(title: &str, description: &str, body: &str, errors: &mut ValidationErrors) {
    errors.check_text("title", title, TITLE_MAX_LENGTH);
    errors.check_text("body", body, BODY_MAX_LENGTH);
    if description.chars().count() > DESCRIPTION_MAX_LENGTH {
        errors.push(Violation::TooLong {
            field: "description",
            max: DESCRIPTION_MAX_LENGTH,
        });
    }
}

// ============================================================================
// Listing
// ============================================================================

/// Any combination of filters; `None` means unfiltered
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ArticleFilter {
    pub tag: Option<String>,
    /// Author username
    pub author: Option<String>,
    /// Username of a user who favorited the article
    pub favorited_by: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ArticlePage {
    pub articles: Vec<Article>,
    /// Matches across all pages
    pub total: i64,
}
