//! Domain Entities

pub mod article;
pub mod comment;
pub mod page;
pub mod profile;
pub mod user;

pub use article::{Article, ArticleFilter, ArticlePage, ArticlePatch, FavoriteOutcome, NewArticle, Tag};
pub use comment::{Comment, NewComment};
pub use page::Page;
pub use profile::Profile;
pub use user::{NewUser, User, UserPatch, UserSummary};
