//! Users and follows

use chrono::{DateTime, Utc};
use kernel::id::UserId;
use platform::password::HashedPassword;

use super::{CHECK_VIOLATION, FOREIGN_KEY_VIOLATION, PgBlogRepository, map_constraint, map_user_conflict};
use crate::domain::entity::{NewUser, User};
use crate::domain::repository::{FollowRepository, UserRepository};
use crate::error::{BlogError, BlogResult};

const USER_COLUMNS: &str =
    "id, username, email, password_hash, display_name, bio, image, created_at, updated_at";

// ============================================================================
// User Repository Implementation
// ============================================================================

impl UserRepository for PgBlogRepository {
    async fn find_by_id(&self, id: UserId) -> BlogResult<User> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id = $1"
        ))
        .bind(id.get())
        .fetch_optional(&self.pool)
        .await?;

        row.ok_or(BlogError::UserNotFound)?.into_user()
    }

    async fn find_by_email(&self, email: &str) -> BlogResult<User> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE email = $1"
        ))
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        row.ok_or(BlogError::UserNotFound)?.into_user()
    }

    async fn find_by_username(&self, username: &str) -> BlogResult<User> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE username = $1"
        ))
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;

        row.ok_or(BlogError::UserNotFound)?.into_user()
    }

    async fn create(&self, user: NewUser) -> BlogResult<User> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            r#"
            INSERT INTO users (username, email, password_hash)
            VALUES ($1, $2, $3)
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(&user.username)
        .bind(&user.email)
        .bind(user.password_hash.as_phc_string())
        .fetch_one(&self.pool)
        .await
        .map_err(map_user_conflict)?;

        row.into_user()
    }

    async fn update(&self, user: &User) -> BlogResult<User> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            r#"
            UPDATE users
            SET username = $2,
                email = $3,
                password_hash = $4,
                display_name = $5,
                bio = $6,
                image = $7,
                updated_at = NOW()
            WHERE id = $1
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(user.id.get())
        .bind(&user.username)
        .bind(&user.email)
        .bind(user.password_hash.as_phc_string())
        .bind(&user.display_name)
        .bind(&user.bio)
        .bind(&user.image)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_user_conflict)?;

        row.ok_or(BlogError::UserNotFound)?.into_user()
    }
}

// ============================================================================
// Follow Repository Implementation
// ============================================================================

impl FollowRepository for PgBlogRepository {
    async fn is_following(
        &self,
        follower: Option<UserId>,
        followee: Option<UserId>,
    ) -> BlogResult<bool> {
        let (Some(follower), Some(followee)) = (follower, followee) else {
            return Ok(false);
        };

        let exists: bool = sqlx::query_scalar(
            "SELECT EXISTS (SELECT 1 FROM follows WHERE follower_id = $1 AND followee_id = $2)",
        )
        .bind(follower.get())
        .bind(followee.get())
        .fetch_one(&self.pool)
        .await?;

        Ok(exists)
    }

    async fn follow(&self, follower: UserId, followee: UserId) -> BlogResult<bool> {
        let inserted = sqlx::query(
            r#"
            INSERT INTO follows (follower_id, followee_id)
            VALUES ($1, $2)
            ON CONFLICT DO NOTHING
            "#,
        )
        .bind(follower.get())
        .bind(followee.get())
        .execute(&self.pool)
        .await
        .map_err(|e| {
            map_constraint(e, |code, _| match code {
                CHECK_VIOLATION => Some(BlogError::CannotFollowSelf),
                FOREIGN_KEY_VIOLATION => Some(BlogError::UserNotFound),
                _ => None,
            })
        })?
        .rows_affected();

        Ok(inserted == 1)
    }

    async fn unfollow(&self, follower: UserId, followee: UserId) -> BlogResult<bool> {
        let deleted = sqlx::query("DELETE FROM follows WHERE follower_id = $1 AND followee_id = $2")
            .bind(follower.get())
            .bind(followee.get())
            .execute(&self.pool)
            .await?
            .rows_affected();

        Ok(deleted == 1)
    }

    async fn following_ids(&self, follower: UserId) -> BlogResult<Vec<UserId>> {
        let ids: Vec<i64> =
            sqlx::query_scalar("SELECT followee_id FROM follows WHERE follower_id = $1")
                .bind(follower.get())
                .fetch_all(&self.pool)
                .await?;

        Ok(ids.into_iter().map(UserId::new).collect())
    }
}

// ============================================================================
// Row types
// ============================================================================

#[derive(sqlx::FromRow)]
struct UserRow {
    id: i64,
    username: String,
    email: String,
    password_hash: String,
    display_name: String,
    bio: String,
    image: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl UserRow {
    fn into_user(self) -> BlogResult<User> {
        Ok(User {
            id: UserId::new(self.id),
            username: self.username,
            email: self.email,
            password_hash: HashedPassword::from_phc_string(self.password_hash)?,
            display_name: self.display_name,
            bio: self.bio,
            image: self.image,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}
