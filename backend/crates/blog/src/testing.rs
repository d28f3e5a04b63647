//! In-memory repository for use-case and handler tests
//!
//! Mirrors the PostgreSQL semantics the use cases rely on: unique
//! username/email, idempotent relations, the favorites counter and the
//! article delete cascade. Timestamps come from a fake clock that ticks once
//! per write so "newest first" ordering is deterministic.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::{Arc, Mutex, MutexGuard};

use auth::{TokenConfig, TokenService};
use chrono::{DateTime, TimeZone, Utc};
use kernel::id::{ArticleId, CommentId, TagId, UserId};
use platform::password::{ClearTextPassword, HashCost};

use crate::domain::entity::{
    Article, ArticleFilter, ArticlePage, ArticlePatch, Comment, FavoriteOutcome, NewArticle,
    NewComment, NewUser, Page, Tag, User, UserSummary,
};
use crate::domain::repository::{
    ArticleRepository, CommentRepository, FavoriteRepository, FollowRepository, TagRepository,
    UserRepository,
};
use crate::error::{BlogError, BlogResult};

pub const TEST_SECRET: &str = "blog-test-secret";

pub fn token_service() -> Arc<TokenService> {
    Arc::new(TokenService::new(TokenConfig::new(TEST_SECRET)).unwrap())
}

#[derive(Clone)]
struct StoredArticle {
    author_id: UserId,
    title: String,
    description: String,
    body: String,
    tag_ids: Vec<TagId>,
    favorites_count: i64,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

#[derive(Clone)]
struct StoredComment {
    article_id: ArticleId,
    author_id: UserId,
    body: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

#[derive(Default)]
struct State {
    next_id: i64,
    tick: i64,
    users: BTreeMap<UserId, User>,
    follows: BTreeSet<(UserId, UserId)>,
    articles: BTreeMap<ArticleId, StoredArticle>,
    tags: BTreeMap<TagId, String>,
    favorites: BTreeSet<(UserId, ArticleId)>,
    comments: BTreeMap<CommentId, StoredComment>,
    user_updates: usize,
    follow_writes: usize,
    stale_relation_reads: bool,
}

impl State {
    fn next_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }

    fn now(&mut self) -> DateTime<Utc> {
        self.tick += 1;
        Utc.timestamp_opt(1_700_000_000 + self.tick, 0).unwrap()
    }

    fn check_unique(&self, id: Option<UserId>, username: &str, email: &str) -> BlogResult<()> {
        let others = self.users.values().filter(|u| Some(u.id) != id);
        for other in others {
            if other.username == username {
                return Err(BlogError::UsernameTaken);
            }
            if other.email == email {
                return Err(BlogError::EmailTaken);
            }
        }
        Ok(())
    }

    fn summary(&self, id: UserId) -> UserSummary {
        self.users[&id].summary()
    }

    fn article(&self, id: ArticleId) -> BlogResult<Article> {
        let stored = self.articles.get(&id).ok_or(BlogError::ArticleNotFound)?;
        let mut tags: Vec<Tag> = stored
            .tag_ids
            .iter()
            .map(|tag_id| Tag {
                id: *tag_id,
                name: self.tags[tag_id].clone(),
            })
            .collect();
        tags.sort_by(|a, b| a.name.cmp(&b.name));

        Ok(Article {
            id,
            author: self.summary(stored.author_id),
            title: stored.title.clone(),
            description: stored.description.clone(),
            body: stored.body.clone(),
            tags,
            favorites_count: stored.favorites_count,
            created_at: stored.created_at,
            updated_at: stored.updated_at,
        })
    }

    fn comment(&self, id: CommentId) -> BlogResult<Comment> {
        let stored = self.comments.get(&id).ok_or(BlogError::CommentNotFound)?;
        Ok(Comment {
            id,
            article_id: stored.article_id,
            author: self.summary(stored.author_id),
            body: stored.body.clone(),
            created_at: stored.created_at,
            updated_at: stored.updated_at,
        })
    }

    fn user_id_by_name(&self, username: &str) -> Option<UserId> {
        self.users
            .values()
            .find(|u| u.username == username)
            .map(|u| u.id)
    }

    fn page(&self, mut ids: Vec<ArticleId>, page: Page) -> BlogResult<ArticlePage> {
        ids.sort_by(|a, b| {
            let (x, y) = (&self.articles[a], &self.articles[b]);
            y.created_at.cmp(&x.created_at).then(b.cmp(a))
        });
        let total = ids.len() as i64;
        let articles = ids
            .into_iter()
            .skip(page.offset() as usize)
            .take(page.limit() as usize)
            .map(|id| self.article(id))
            .collect::<BlogResult<Vec<_>>>()?;
        Ok(ArticlePage { articles, total })
    }
}

#[derive(Default)]
pub struct InMemoryBlogRepository {
    state: Mutex<State>,
}

impl InMemoryBlogRepository {
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap()
    }

    /// User `username` with email `username@example.com`
    pub fn seed_user(&self, username: &str, password: &str) -> User {
        let hash = ClearTextPassword::new(password)
            .unwrap()
            .hash(HashCost::minimal())
            .unwrap();
        let mut state = self.state();
        let id = UserId::new(state.next_id());
        let now = state.now();
        let user = User {
            id,
            username: username.to_string(),
            email: format!("{username}@example.com"),
            password_hash: hash,
            display_name: String::new(),
            bio: String::new(),
            image: String::new(),
            created_at: now,
            updated_at: now,
        };
        state.users.insert(id, user.clone());
        user
    }

    pub fn seed_article(&self, author: UserId, title: &str, tags: &[&str]) -> Article {
        let tags: Vec<String> = tags.iter().map(|t| t.to_string()).collect();
        let new_article = NewArticle::new(author, title, "", "Body", &tags);
        self.insert_article(new_article).unwrap()
    }

    pub fn user_update_count(&self) -> usize {
        self.state().user_updates
    }

    /// Make `is_following`/`is_favorited` report the opposite of the stored
    /// relation, as a request that lost a race against a concurrent write would
    pub fn set_stale_relation_reads(&self, stale: bool) {
        self.state().stale_relation_reads = stale;
    }

    pub fn follow_write_count(&self) -> usize {
        self.state().follow_writes
    }

    fn insert_article(&self, article: NewArticle) -> BlogResult<Article> {
        let mut state = self.state();
        if !state.users.contains_key(&article.author_id) {
            return Err(BlogError::UserNotFound);
        }

        let mut tag_ids = Vec::new();
        for name in &article.tag_names {
            let existing = state
                .tags
                .iter()
                .find(|(_, tag)| *tag == name)
                .map(|(id, _)| *id);
            let tag_id = match existing {
                Some(id) => id,
                None => {
                    let id = TagId::new(state.next_id());
                    state.tags.insert(id, name.clone());
                    id
                }
            };
            tag_ids.push(tag_id);
        }

        let id = ArticleId::new(state.next_id());
        let now = state.now();
        state.articles.insert(
            id,
            StoredArticle {
                author_id: article.author_id,
                title: article.title,
                description: article.description,
                body: article.body,
                tag_ids,
                favorites_count: 0,
                created_at: now,
                updated_at: now,
            },
        );
        state.article(id)
    }
}

// ============================================================================
// Repository implementations
// ============================================================================

impl UserRepository for InMemoryBlogRepository {
    async fn find_by_id(&self, id: UserId) -> BlogResult<User> {
        self.state()
            .users
            .get(&id)
            .cloned()
            .ok_or(BlogError::UserNotFound)
    }

    async fn find_by_email(&self, email: &str) -> BlogResult<User> {
        self.state()
            .users
            .values()
            .find(|u| u.email == email)
            .cloned()
            .ok_or(BlogError::UserNotFound)
    }

    async fn find_by_username(&self, username: &str) -> BlogResult<User> {
        self.state()
            .users
            .values()
            .find(|u| u.username == username)
            .cloned()
            .ok_or(BlogError::UserNotFound)
    }

    async fn create(&self, user: NewUser) -> BlogResult<User> {
        let mut state = self.state();
        state.check_unique(None, &user.username, &user.email)?;

        let id = UserId::new(state.next_id());
        let now = state.now();
        let user = User {
            id,
            username: user.username,
            email: user.email,
            password_hash: user.password_hash,
            display_name: String::new(),
            bio: String::new(),
            image: String::new(),
            created_at: now,
            updated_at: now,
        };
        state.users.insert(id, user.clone());
        Ok(user)
    }

    async fn update(&self, user: &User) -> BlogResult<User> {
        let mut state = self.state();
        if !state.users.contains_key(&user.id) {
            return Err(BlogError::UserNotFound);
        }
        state.check_unique(Some(user.id), &user.username, &user.email)?;

        let updated = User {
            updated_at: state.now(),
            ..user.clone()
        };
        state.users.insert(user.id, updated.clone());
        state.user_updates += 1;
        Ok(updated)
    }
}

impl FollowRepository for InMemoryBlogRepository {
    async fn is_following(
        &self,
        follower: Option<UserId>,
        followee: Option<UserId>,
    ) -> BlogResult<bool> {
        let (Some(follower), Some(followee)) = (follower, followee) else {
            return Ok(false);
        };
        let state = self.state();
        Ok(state.follows.contains(&(follower, followee)) != state.stale_relation_reads)
    }

    async fn follow(&self, follower: UserId, followee: UserId) -> BlogResult<bool> {
        let mut state = self.state();
        if follower == followee {
            return Err(BlogError::CannotFollowSelf);
        }
        if !state.users.contains_key(&follower) || !state.users.contains_key(&followee) {
            return Err(BlogError::UserNotFound);
        }
        state.follow_writes += 1;
        Ok(state.follows.insert((follower, followee)))
    }

    async fn unfollow(&self, follower: UserId, followee: UserId) -> BlogResult<bool> {
        let mut state = self.state();
        state.follow_writes += 1;
        Ok(state.follows.remove(&(follower, followee)))
    }

    async fn following_ids(&self, follower: UserId) -> BlogResult<Vec<UserId>> {
        Ok(self
            .state()
            .follows
            .iter()
            .filter(|(from, _)| *from == follower)
            .map(|(_, to)| *to)
            .collect())
    }
}

impl ArticleRepository for InMemoryBlogRepository {
    async fn create(&self, article: NewArticle) -> BlogResult<Article> {
        self.insert_article(article)
    }

    async fn find_by_id(&self, id: ArticleId) -> BlogResult<Article> {
        self.state().article(id)
    }

    async fn update(&self, id: ArticleId, patch: &ArticlePatch) -> BlogResult<Article> {
        let mut state = self.state();
        let now = state.now();
        let stored = state
            .articles
            .get_mut(&id)
            .ok_or(BlogError::ArticleNotFound)?;

        let patch = patch.normalized();
        if let Some(title) = patch.title {
            stored.title = title;
        }
        if let Some(description) = patch.description {
            stored.description = description;
        }
        if let Some(body) = patch.body {
            stored.body = body;
        }
        stored.updated_at = now;

        state.article(id)
    }

    async fn list(&self, filter: &ArticleFilter, page: Page) -> BlogResult<ArticlePage> {
        let state = self.state();

        let tag_id = filter.tag.as_ref().map(|name| {
            state
                .tags
                .iter()
                .find(|(_, tag)| *tag == name)
                .map(|(id, _)| *id)
        });
        let author = filter.author.as_deref().map(|name| state.user_id_by_name(name));
        let favoriter = filter
            .favorited_by
            .as_deref()
            .map(|name| state.user_id_by_name(name));

        let ids = state
            .articles
            .iter()
            .filter(|(_, a)| match tag_id {
                Some(tag_id) => tag_id.is_some_and(|t| a.tag_ids.contains(&t)),
                None => true,
            })
            .filter(|(_, a)| match author {
                Some(author) => author == Some(a.author_id),
                None => true,
            })
            .filter(|(id, _)| match favoriter {
                Some(user) => user.is_some_and(|u| state.favorites.contains(&(u, **id))),
                None => true,
            })
            .map(|(id, _)| *id)
            .collect();

        state.page(ids, page)
    }

    async fn feed(&self, authors: &[UserId], page: Page) -> BlogResult<ArticlePage> {
        let state = self.state();
        let ids = state
            .articles
            .iter()
            .filter(|(_, a)| authors.contains(&a.author_id))
            .map(|(id, _)| *id)
            .collect();
        state.page(ids, page)
    }

    async fn delete(&self, id: ArticleId) -> BlogResult<()> {
        let mut state = self.state();
        if state.articles.remove(&id).is_none() {
            return Err(BlogError::ArticleNotFound);
        }
        state.comments.retain(|_, c| c.article_id != id);
        state.favorites.retain(|(_, article)| *article != id);
        Ok(())
    }
}

impl FavoriteRepository for InMemoryBlogRepository {
    async fn is_favorited(&self, article: ArticleId, user: Option<UserId>) -> BlogResult<bool> {
        let Some(user) = user else {
            return Ok(false);
        };
        let state = self.state();
        Ok(state.favorites.contains(&(user, article)) != state.stale_relation_reads)
    }

    async fn favorited_among(
        &self,
        user: UserId,
        articles: &[ArticleId],
    ) -> BlogResult<Vec<ArticleId>> {
        let state = self.state();
        Ok(articles
            .iter()
            .copied()
            .filter(|article| state.favorites.contains(&(user, *article)))
            .collect())
    }

    async fn add_favorite(&self, article: ArticleId, user: UserId) -> BlogResult<FavoriteOutcome> {
        let mut state = self.state();
        if !state.articles.contains_key(&article) {
            return Err(BlogError::ArticleNotFound);
        }
        let relation_changed = state.favorites.insert((user, article));
        let stored = state
            .articles
            .get_mut(&article)
            .ok_or(BlogError::ArticleNotFound)?;
        if relation_changed {
            stored.favorites_count += 1;
        }
        Ok(FavoriteOutcome {
            relation_changed,
            favorites_count: stored.favorites_count,
        })
    }

    async fn remove_favorite(
        &self,
        article: ArticleId,
        user: UserId,
    ) -> BlogResult<FavoriteOutcome> {
        let mut state = self.state();
        if !state.articles.contains_key(&article) {
            return Err(BlogError::ArticleNotFound);
        }
        let relation_changed = state.favorites.remove(&(user, article));
        let stored = state
            .articles
            .get_mut(&article)
            .ok_or(BlogError::ArticleNotFound)?;
        if relation_changed {
            stored.favorites_count -= 1;
        }
        Ok(FavoriteOutcome {
            relation_changed,
            favorites_count: stored.favorites_count,
        })
    }
}

impl TagRepository for InMemoryBlogRepository {
    async fn all_names(&self) -> BlogResult<Vec<String>> {
        let mut names: Vec<String> = self.state().tags.values().cloned().collect();
        names.sort();
        Ok(names)
    }
}

impl CommentRepository for InMemoryBlogRepository {
    async fn create(&self, comment: NewComment) -> BlogResult<Comment> {
        let mut state = self.state();
        if !state.articles.contains_key(&comment.article_id) {
            return Err(BlogError::ArticleNotFound);
        }
        let id = CommentId::new(state.next_id());
        let now = state.now();
        state.comments.insert(
            id,
            StoredComment {
                article_id: comment.article_id,
                author_id: comment.author_id,
                body: comment.body,
                created_at: now,
                updated_at: now,
            },
        );
        state.comment(id)
    }

    async fn list_for_article(&self, article: ArticleId) -> BlogResult<Vec<Comment>> {
        let state = self.state();
        if !state.articles.contains_key(&article) {
            return Err(BlogError::ArticleNotFound);
        }
        state
            .comments
            .iter()
            .filter(|(_, c)| c.article_id == article)
            .map(|(id, _)| state.comment(*id))
            .collect()
    }

    async fn find_by_id(&self, id: CommentId) -> BlogResult<Comment> {
        self.state().comment(id)
    }

    async fn delete(&self, id: CommentId) -> BlogResult<()> {
        self.state()
            .comments
            .remove(&id)
            .map(|_| ())
            .ok_or(BlogError::CommentNotFound)
    }
}
