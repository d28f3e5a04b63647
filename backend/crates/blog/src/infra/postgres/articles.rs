//! Articles, tags and favorites

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use kernel::id::{ArticleId, TagId, UserId};
use sqlx::PgConnection;

use super::{FOREIGN_KEY_VIOLATION, PgBlogRepository, map_constraint};
use crate::domain::entity::{
    Article, ArticleFilter, ArticlePage, ArticlePatch, FavoriteOutcome, NewArticle, Page, Tag,
    UserSummary,
};
use crate::domain::repository::{ArticleRepository, FavoriteRepository, TagRepository};
use crate::error::{BlogError, BlogResult};

const ARTICLE_SELECT: &str = r#"
    SELECT
        a.id,
        a.title,
        a.description,
        a.body,
        a.favorites_count,
        a.created_at,
        a.updated_at,
        u.id AS author_id,
        u.username AS author_username,
        u.bio AS author_bio,
        u.image AS author_image
    FROM articles a
    JOIN users u ON u.id = a.author_id
"#;

/// $1 tag name, $2 author username, $3 favorited-by username
const LIST_FILTER: &str = r#"
    WHERE ($1::TEXT IS NULL OR EXISTS (
            SELECT 1
            FROM article_tags atg
            JOIN tags t ON t.id = atg.tag_id
            WHERE atg.article_id = a.id AND t.name = $1
        ))
      AND ($2::TEXT IS NULL OR u.username = $2)
      AND ($3::TEXT IS NULL OR EXISTS (
            SELECT 1
            FROM favorites f
            JOIN users fu ON fu.id = f.user_id
            WHERE f.article_id = a.id AND fu.username = $3
        ))
"#;

const NEWEST_FIRST: &str = "ORDER BY a.created_at DESC, a.id DESC";

// ============================================================================
// Article Repository Implementation
// ============================================================================

impl ArticleRepository for PgBlogRepository {
    async fn create(&self, article: NewArticle) -> BlogResult<Article> {
        let mut tx = self.pool.begin().await?;

        let id: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO articles (author_id, title, description, body)
            VALUES ($1, $2, $3, $4)
            RETURNING id
            "#,
        )
        .bind(article.author_id.get())
        .bind(&article.title)
        .bind(&article.description)
        .bind(&article.body)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| {
            map_constraint(e, |code, _| {
                (code == FOREIGN_KEY_VIOLATION).then_some(BlogError::UserNotFound)
            })
        })?;

        for name in &article.tag_names {
            // DO UPDATE (not DO NOTHING) so RETURNING yields the existing id
            let tag_id: i64 = sqlx::query_scalar(
                r#"
                INSERT INTO tags (name)
                VALUES ($1)
                ON CONFLICT (name) DO UPDATE SET updated_at = NOW()
                RETURNING id
                "#,
            )
            .bind(name)
            .fetch_one(&mut *tx)
            .await?;

            sqlx::query(
                r#"
                INSERT INTO article_tags (article_id, tag_id)
                VALUES ($1, $2)
                ON CONFLICT DO NOTHING
                "#,
            )
            .bind(id)
            .bind(tag_id)
            .execute(&mut *tx)
            .await?;
        }

        let created = fetch_article(&mut tx, ArticleId::new(id)).await?;
        tx.commit().await?;

        tracing::debug!(article_id = id, tags = article.tag_names.len(), "Article row created");

        Ok(created)
    }

    async fn find_by_id(&self, id: ArticleId) -> BlogResult<Article> {
        let mut conn = self.pool.acquire().await?;
        fetch_article(&mut conn, id).await
    }

    async fn update(&self, id: ArticleId, patch: &ArticlePatch) -> BlogResult<Article> {
        let patch = patch.normalized();
        let mut tx = self.pool.begin().await?;

        let updated = sqlx::query(
            r#"
            UPDATE articles
            SET title = COALESCE($2, title),
                description = COALESCE($3, description),
                body = COALESCE($4, body),
                updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(id.get())
        .bind(patch.title.as_deref())
        .bind(patch.description.as_deref())
        .bind(patch.body.as_deref())
        .execute(&mut *tx)
        .await?
        .rows_affected();

        if updated == 0 {
            return Err(BlogError::ArticleNotFound);
        }

        let article = fetch_article(&mut tx, id).await?;
        tx.commit().await?;

        Ok(article)
    }

    async fn list(&self, filter: &ArticleFilter, page: Page) -> BlogResult<ArticlePage> {
        let mut conn = self.pool.acquire().await?;

        let total: i64 = sqlx::query_scalar(&format!(
            "SELECT COUNT(*) FROM articles a JOIN users u ON u.id = a.author_id {LIST_FILTER}"
        ))
        .bind(filter.tag.as_deref())
        .bind(filter.author.as_deref())
        .bind(filter.favorited_by.as_deref())
        .fetch_one(&mut *conn)
        .await?;

        let rows = sqlx::query_as::<_, ArticleRow>(&format!(
            "{ARTICLE_SELECT} {LIST_FILTER} {NEWEST_FIRST} LIMIT $4 OFFSET $5"
        ))
        .bind(filter.tag.as_deref())
        .bind(filter.author.as_deref())
        .bind(filter.favorited_by.as_deref())
        .bind(page.limit())
        .bind(page.offset())
        .fetch_all(&mut *conn)
        .await?;

        let articles = with_tags(&mut conn, rows).await?;
        Ok(ArticlePage { articles, total })
    }

    async fn feed(&self, authors: &[UserId], page: Page) -> BlogResult<ArticlePage> {
        if authors.is_empty() {
            return Ok(ArticlePage::default());
        }
        let author_ids: Vec<i64> = authors.iter().map(|id| id.get()).collect();
        let mut conn = self.pool.acquire().await?;

        let total: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM articles WHERE author_id = ANY($1)")
                .bind(&author_ids)
                .fetch_one(&mut *conn)
                .await?;

        let rows = sqlx::query_as::<_, ArticleRow>(&format!(
            "{ARTICLE_SELECT} WHERE a.author_id = ANY($1) {NEWEST_FIRST} LIMIT $2 OFFSET $3"
        ))
        .bind(&author_ids)
        .bind(page.limit())
        .bind(page.offset())
        .fetch_all(&mut *conn)
        .await?;

        let articles = with_tags(&mut conn, rows).await?;
        Ok(ArticlePage { articles, total })
    }

    async fn delete(&self, id: ArticleId) -> BlogResult<()> {
        let mut tx = self.pool.begin().await?;

        for statement in [
            "DELETE FROM comments WHERE article_id = $1",
            "DELETE FROM favorites WHERE article_id = $1",
            "DELETE FROM article_tags WHERE article_id = $1",
        ] {
            sqlx::query(statement)
                .bind(id.get())
                .execute(&mut *tx)
                .await?;
        }

        let deleted = sqlx::query("DELETE FROM articles WHERE id = $1")
            .bind(id.get())
            .execute(&mut *tx)
            .await?
            .rows_affected();

        if deleted == 0 {
            return Err(BlogError::ArticleNotFound);
        }

        tx.commit().await?;
        Ok(())
    }
}

// ============================================================================
// Favorite Repository Implementation
// ============================================================================

impl FavoriteRepository for PgBlogRepository {
    async fn is_favorited(&self, article: ArticleId, user: Option<UserId>) -> BlogResult<bool> {
        let Some(user) = user else {
            return Ok(false);
        };

        let exists: bool = sqlx::query_scalar(
            "SELECT EXISTS (SELECT 1 FROM favorites WHERE user_id = $1 AND article_id = $2)",
        )
        .bind(user.get())
        .bind(article.get())
        .fetch_one(&self.pool)
        .await?;

        Ok(exists)
    }

    async fn favorited_among(
        &self,
        user: UserId,
        articles: &[ArticleId],
    ) -> BlogResult<Vec<ArticleId>> {
        if articles.is_empty() {
            return Ok(Vec::new());
        }
        let article_ids: Vec<i64> = articles.iter().map(|id| id.get()).collect();

        let ids: Vec<i64> = sqlx::query_scalar(
            "SELECT article_id FROM favorites WHERE user_id = $1 AND article_id = ANY($2)",
        )
        .bind(user.get())
        .bind(&article_ids)
        .fetch_all(&self.pool)
        .await?;

        Ok(ids.into_iter().map(ArticleId::new).collect())
    }

    async fn add_favorite(&self, article: ArticleId, user: UserId) -> BlogResult<FavoriteOutcome> {
        let mut tx = self.pool.begin().await?;
        let current = current_favorites_count(&mut tx, article).await?;

        let inserted = sqlx::query(
            r#"
            INSERT INTO favorites (user_id, article_id)
            VALUES ($1, $2)
            ON CONFLICT DO NOTHING
            "#,
        )
        .bind(user.get())
        .bind(article.get())
        .execute(&mut *tx)
        .await
        .map_err(map_favorite_fk)?
        .rows_affected();

        let outcome = if inserted == 1 {
            FavoriteOutcome {
                relation_changed: true,
                favorites_count: adjust_favorites_count(&mut tx, article, 1).await?,
            }
        } else {
            FavoriteOutcome {
                relation_changed: false,
                favorites_count: current,
            }
        };

        tx.commit().await?;
        Ok(outcome)
    }

    async fn remove_favorite(
        &self,
        article: ArticleId,
        user: UserId,
    ) -> BlogResult<FavoriteOutcome> {
        let mut tx = self.pool.begin().await?;
        let current = current_favorites_count(&mut tx, article).await?;

        let deleted = sqlx::query("DELETE FROM favorites WHERE user_id = $1 AND article_id = $2")
            .bind(user.get())
            .bind(article.get())
            .execute(&mut *tx)
            .await?
            .rows_affected();

        let outcome = if deleted == 1 {
            FavoriteOutcome {
                relation_changed: true,
                favorites_count: adjust_favorites_count(&mut tx, article, -1).await?,
            }
        } else {
            FavoriteOutcome {
                relation_changed: false,
                favorites_count: current,
            }
        };

        tx.commit().await?;
        Ok(outcome)
    }
}

// ============================================================================
// Tag Repository Implementation
// ============================================================================

impl TagRepository for PgBlogRepository {
    async fn all_names(&self) -> BlogResult<Vec<String>> {
        let names: Vec<String> = sqlx::query_scalar("SELECT name FROM tags ORDER BY name")
            .fetch_all(&self.pool)
            .await?;

        Ok(names)
    }
}

// ============================================================================
// Helpers
// ============================================================================

async fn fetch_article(conn: &mut PgConnection, id: ArticleId) -> BlogResult<Article> {
    let row = sqlx::query_as::<_, ArticleRow>(&format!("{ARTICLE_SELECT} WHERE a.id = $1"))
        .bind(id.get())
        .fetch_optional(&mut *conn)
        .await?
        .ok_or(BlogError::ArticleNotFound)?;

    with_tags(conn, vec![row])
        .await?
        .pop()
        .ok_or(BlogError::ArticleNotFound)
}

/// Attach tags to every row with one query
async fn with_tags(conn: &mut PgConnection, rows: Vec<ArticleRow>) -> BlogResult<Vec<Article>> {
    if rows.is_empty() {
        return Ok(Vec::new());
    }
    let ids: Vec<i64> = rows.iter().map(|row| row.id).collect();

    let tag_rows = sqlx::query_as::<_, TagRow>(
        r#"
        SELECT atg.article_id, t.id AS tag_id, t.name
        FROM article_tags atg
        JOIN tags t ON t.id = atg.tag_id
        WHERE atg.article_id = ANY($1)
        ORDER BY t.name
        "#,
    )
    .bind(&ids)
    .fetch_all(&mut *conn)
    .await?;

    let mut tags: HashMap<i64, Vec<Tag>> = HashMap::new();
    for row in tag_rows {
        tags.entry(row.article_id).or_default().push(Tag {
            id: TagId::new(row.tag_id),
            name: row.name,
        });
    }

    Ok(rows
        .into_iter()
        .map(|row| {
            let article_tags = tags.remove(&row.id).unwrap_or_default();
            row.into_article(article_tags)
        })
        .collect())
}

async fn current_favorites_count(conn: &mut PgConnection, article: ArticleId) -> BlogResult<i64> {
    sqlx::query_scalar("SELECT favorites_count FROM articles WHERE id = $1")
        .bind(article.get())
        .fetch_optional(&mut *conn)
        .await?
        .ok_or(BlogError::ArticleNotFound)
}

/// Atomic `favorites_count + delta`; never read-modify-write
async fn adjust_favorites_count(
    conn: &mut PgConnection,
    article: ArticleId,
    delta: i64,
) -> BlogResult<i64> {
    let count: i64 = sqlx::query_scalar(
        r#"
        UPDATE articles
        SET favorites_count = favorites_count + $2
        WHERE id = $1
        RETURNING favorites_count
        "#,
    )
    .bind(article.get())
    .bind(delta)
    .fetch_optional(&mut *conn)
    .await?
    .ok_or(BlogError::ArticleNotFound)?;

    Ok(count)
}

fn map_favorite_fk(err: sqlx::Error) -> BlogError {
    map_constraint(err, |code, constraint| match (code, constraint) {
        (FOREIGN_KEY_VIOLATION, Some("favorites_user_id_fkey")) => Some(BlogError::UserNotFound),
        (FOREIGN_KEY_VIOLATION, _) => Some(BlogError::ArticleNotFound),
        _ => None,
    })
}

// ============================================================================
// Row types
// ============================================================================

#[derive(sqlx::FromRow)]
struct ArticleRow {
    id: i64,
    title: String,
    description: String,
    body: String,
    favorites_count: i64,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    author_id: i64,
    author_username: String,
    author_bio: String,
    author_image: String,
}

impl ArticleRow {
    fn into_article(self, tags: Vec<Tag>) -> Article {
        Article {
            id: ArticleId::new(self.id),
            author: UserSummary {
                id: UserId::new(self.author_id),
                username: self.author_username,
                bio: self.author_bio,
                image: self.author_image,
            },
            title: self.title,
            description: self.description,
            body: self.body,
            tags,
            favorites_count: self.favorites_count,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

#[derive(sqlx::FromRow)]
struct TagRow {
    article_id: i64,
    tag_id: i64,
    name: String,
}
