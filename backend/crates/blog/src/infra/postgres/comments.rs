//! Comments

use chrono::{DateTime, Utc};
use kernel::id::{ArticleId, CommentId, UserId};

use super::{FOREIGN_KEY_VIOLATION, PgBlogRepository, map_constraint};
use crate::domain::entity::{Comment, NewComment, UserSummary};
use crate::domain::repository::CommentRepository;
use crate::error::{BlogError, BlogResult};

const COMMENT_SELECT: &str = r#"
    SELECT
        c.id,
        c.article_id,
        c.body,
        c.created_at,
        c.updated_at,
        u.id AS author_id,
        u.username AS author_username,
        u.bio AS author_bio,
        u.image AS author_image
    FROM comments c
    JOIN users u ON u.id = c.author_id
"#;

impl CommentRepository for PgBlogRepository {
    async fn create(&self, comment: NewComment) -> BlogResult<Comment> {
        let row = sqlx::query_as::<_, CommentRow>(
            r#"
            WITH inserted AS (
                INSERT INTO comments (article_id, author_id, body)
                VALUES ($1, $2, $3)
                RETURNING id, article_id, author_id, body, created_at, updated_at
            )
            SELECT
                c.id,
                c.article_id,
                c.body,
                c.created_at,
                c.updated_at,
                u.id AS author_id,
                u.username AS author_username,
                u.bio AS author_bio,
                u.image AS author_image
            FROM inserted c
            JOIN users u ON u.id = c.author_id
            "#,
        )
        .bind(comment.article_id.get())
        .bind(comment.author_id.get())
        .bind(&comment.body)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            map_constraint(e, |code, constraint| match (code, constraint) {
                (FOREIGN_KEY_VIOLATION, Some("comments_author_id_fkey")) => {
                    Some(BlogError::UserNotFound)
                }
                (FOREIGN_KEY_VIOLATION, _) => Some(BlogError::ArticleNotFound),
                _ => None,
            })
        })?;

        Ok(row.into_comment())
    }

    async fn list_for_article(&self, article: ArticleId) -> BlogResult<Vec<Comment>> {
        let mut conn = self.pool.acquire().await?;

        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM articles WHERE id = $1)")
                .bind(article.get())
                .fetch_one(&mut *conn)
                .await?;
        if !exists {
            return Err(BlogError::ArticleNotFound);
        }

        let rows = sqlx::query_as::<_, CommentRow>(&format!(
            "{COMMENT_SELECT} WHERE c.article_id = $1 ORDER BY c.created_at, c.id"
        ))
        .bind(article.get())
        .fetch_all(&mut *conn)
        .await?;

        Ok(rows.into_iter().map(CommentRow::into_comment).collect())
    }

    async fn find_by_id(&self, id: CommentId) -> BlogResult<Comment> {
        let row = sqlx::query_as::<_, CommentRow>(&format!("{COMMENT_SELECT} WHERE c.id = $1"))
            .bind(id.get())
            .fetch_optional(&self.pool)
            .await?
            .ok_or(BlogError::CommentNotFound)?;

        Ok(row.into_comment())
    }

    async fn delete(&self, id: CommentId) -> BlogResult<()> {
        let deleted = sqlx::query("DELETE FROM comments WHERE id = $1")
            .bind(id.get())
            .execute(&self.pool)
            .await?
            .rows_affected();

        if deleted == 0 {
            return Err(BlogError::CommentNotFound);
        }
        Ok(())
    }
}

#[derive(sqlx::FromRow)]
struct CommentRow {
    id: i64,
    article_id: i64,
    body: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    author_id: i64,
    author_username: String,
    author_bio: String,
    author_image: String,
}

impl CommentRow {
    fn into_comment(self) -> Comment {
        Comment {
            id: CommentId::new(self.id),
            article_id: ArticleId::new(self.article_id),
            author: UserSummary {
                id: UserId::new(self.author_id),
                username: self.author_username,
                bio: self.author_bio,
                image: self.author_image,
            },
            body: self.body,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}
