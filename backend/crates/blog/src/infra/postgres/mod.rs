//! PostgreSQL Repository Implementations
//!
//! One repository type implements every trait. Writes that touch more than
//! one row run in a single transaction; an early `?` drops the transaction,
//! which rolls it back.

mod articles;
mod comments;
mod users;

use sqlx::PgPool;

use crate::error::BlogError;

/// PostgreSQL-backed blog repository
#[derive(Clone)]
pub struct PgBlogRepository {
    pool: PgPool,
}

impl PgBlogRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

// ============================================================================
// Constraint mapping
// ============================================================================

const UNIQUE_VIOLATION: &str = "23505";
const FOREIGN_KEY_VIOLATION: &str = "23503";
const CHECK_VIOLATION: &str = "23514";

/// Map a constraint violation to a domain error via `map`, else `Database`
fn map_constraint(
    err: sqlx::Error,
    map: impl Fn(&str, Option<&str>) -> Option<BlogError>,
) -> BlogError {
    if let sqlx::Error::Database(db_err) = &err {
        let code = db_err.code();
        if let Some(mapped) = code
            .as_deref()
            .and_then(|code| map(code, db_err.constraint()))
        {
            return mapped;
        }
    }
    BlogError::Database(err)
}

/// Unique violation on the users table
fn map_user_conflict(err: sqlx::Error) -> BlogError {
    map_constraint(err, |code, constraint| match (code, constraint) {
        (UNIQUE_VIOLATION, Some("users_username_key")) => Some(BlogError::UsernameTaken),
        (UNIQUE_VIOLATION, Some("users_email_key")) => Some(BlogError::EmailTaken),
        _ => None,
    })
}
