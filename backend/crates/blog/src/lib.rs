//! Blog Backend Module
//!
//! Clean Architecture structure:
//! - `domain/` - Entities, patches, validation, repository traits
//! - `application/` - Use cases (ownership, follow and favorite guards)
//! - `infra/` - PostgreSQL implementation of the repositories
//! - `presentation/` - HTTP handlers, DTOs, router
//!
//! ## Features
//! - Registration, login, token refresh and logout
//! - Profiles and follows
//! - Articles with tags, favorites and a personal feed
//! - Comments scoped to an article

pub mod application;
pub mod domain;
pub mod error;
pub mod infra;
pub mod presentation;

#[cfg(test)]
pub(crate) mod testing;

pub use application::config::BlogConfig;
pub use error::{BlogError, BlogResult};
pub use infra::postgres::PgBlogRepository;
pub use presentation::router::{blog_router, blog_router_generic};

// Re-export kernel error types for unified error handling
pub use kernel::error::{
    app_error::{AppError, AppResult},
    kind::ErrorKind,
};
