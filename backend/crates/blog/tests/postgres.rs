//! PostgreSQL repository tests
//!
//! Each test gets a fresh database with migrations applied. They need a
//! running server: `DATABASE_URL=... cargo test -p blog -- --ignored`.

use std::sync::Arc;

use blog::application::{ArticleUseCase, ProfileUseCase};
use blog::domain::entity::{ArticleFilter, ArticlePatch, NewArticle, NewComment, NewUser, Page};
use blog::domain::repository::{
    ArticleRepository, CommentRepository, FavoriteRepository, FollowRepository, TagRepository,
    UserRepository,
};
use blog::{BlogError, PgBlogRepository};
use kernel::id::{ArticleId, UserId};
use platform::password::{ClearTextPassword, HashCost};
use sqlx::PgPool;

async fn user(repo: &PgBlogRepository, username: &str) -> UserId {
    let hash = ClearTextPassword::new("correct horse battery")
        .unwrap()
        .hash(HashCost::minimal())
        .unwrap();
    let new_user = NewUser::new(username, &format!("{username}@example.com"), hash);
    UserRepository::create(repo, new_user).await.unwrap().id
}

async fn article(repo: &PgBlogRepository, author: UserId, title: &str, tags: &[&str]) -> ArticleId {
    let tags: Vec<String> = tags.iter().map(|t| t.to_string()).collect();
    let new_article = NewArticle::new(author, title, "description", "body", &tags);
    ArticleRepository::create(repo, new_article).await.unwrap().id
}

#[sqlx::test(migrations = "../../../database/migrations")]
#[ignore = "requires DATABASE_URL"]
async fn test_duplicate_username_and_email_are_distinguished(pool: PgPool) {
    let repo = PgBlogRepository::new(pool);
    user(&repo, "alice").await;

    let hash = ClearTextPassword::new("correct horse battery")
        .unwrap()
        .hash(HashCost::minimal())
        .unwrap();

    let same_name = NewUser::new("alice", "other@example.com", hash.clone());
    assert!(matches!(
        UserRepository::create(&repo, same_name).await,
        Err(BlogError::UsernameTaken)
    ));

    let same_email = NewUser::new("other", "ALICE@example.com", hash);
    assert!(matches!(
        UserRepository::create(&repo, same_email).await,
        Err(BlogError::EmailTaken)
    ));
}

#[sqlx::test(migrations = "../../../database/migrations")]
#[ignore = "requires DATABASE_URL"]
async fn test_missing_user_is_not_found(pool: PgPool) {
    let repo = PgBlogRepository::new(pool);

    assert!(matches!(
        UserRepository::find_by_id(&repo, UserId::new(999)).await,
        Err(BlogError::UserNotFound)
    ));
    assert!(matches!(
        repo.find_by_email("nobody@example.com").await,
        Err(BlogError::UserNotFound)
    ));
}

#[sqlx::test(migrations = "../../../database/migrations")]
#[ignore = "requires DATABASE_URL"]
async fn test_user_update_persists_fields(pool: PgPool) {
    let repo = PgBlogRepository::new(pool);
    let id = user(&repo, "alice").await;

    let mut stored = UserRepository::find_by_id(&repo, id).await.unwrap();
    stored.bio = "writes things".to_string();
    let updated = UserRepository::update(&repo, &stored).await.unwrap();

    assert_eq!(updated.bio, "writes things");
    assert_eq!(updated.password_hash, stored.password_hash);
    assert!(updated.updated_at >= stored.updated_at);
}

#[sqlx::test(migrations = "../../../database/migrations")]
#[ignore = "requires DATABASE_URL"]
async fn test_follow_is_idempotent(pool: PgPool) {
    let repo = PgBlogRepository::new(pool);
    let alice = user(&repo, "alice").await;
    let bob = user(&repo, "bob").await;

    assert!(!repo.is_following(Some(alice), Some(bob)).await.unwrap());
    assert!(repo.follow(alice, bob).await.unwrap());
    assert!(!repo.follow(alice, bob).await.unwrap());
    assert!(repo.is_following(Some(alice), Some(bob)).await.unwrap());
    assert!(!repo.is_following(None, Some(bob)).await.unwrap());
    assert_eq!(repo.following_ids(alice).await.unwrap(), vec![bob]);

    assert!(repo.unfollow(alice, bob).await.unwrap());
    assert!(!repo.unfollow(alice, bob).await.unwrap());
}

#[sqlx::test(migrations = "../../../database/migrations")]
#[ignore = "requires DATABASE_URL"]
async fn test_tags_are_shared_between_articles(pool: PgPool) {
    let repo = PgBlogRepository::new(pool);
    let alice = user(&repo, "alice").await;

    let first = article(&repo, alice, "First", &["a", "b"]).await;
    article(&repo, alice, "Second", &["a"]).await;

    let fetched = ArticleRepository::find_by_id(&repo, first).await.unwrap();
    let mut names = fetched.tag_names();
    names.sort();
    assert_eq!(names, vec!["a".to_string(), "b".to_string()]);

    assert_eq!(repo.all_names().await.unwrap(), vec!["a".to_string(), "b".to_string()]);

    let filter = ArticleFilter {
        tag: Some("a".to_string()),
        ..ArticleFilter::default()
    };
    let page = repo.list(&filter, Page::default()).await.unwrap();
    assert_eq!(page.total, 2);
}

#[sqlx::test(migrations = "../../../database/migrations")]
#[ignore = "requires DATABASE_URL"]
async fn test_favorite_counter_round_trip(pool: PgPool) {
    let repo = PgBlogRepository::new(pool);
    let alice = user(&repo, "alice").await;
    let bob = user(&repo, "bob").await;
    let id = article(&repo, alice, "Hello", &["intro"]).await;

    let added = repo.add_favorite(id, bob).await.unwrap();
    assert!(added.relation_changed);
    assert_eq!(added.favorites_count, 1);

    let again = repo.add_favorite(id, bob).await.unwrap();
    assert!(!again.relation_changed);
    assert_eq!(again.favorites_count, 1);

    assert!(repo.is_favorited(id, Some(bob)).await.unwrap());
    assert_eq!(repo.favorited_among(bob, &[id]).await.unwrap(), vec![id]);

    let removed = repo.remove_favorite(id, bob).await.unwrap();
    assert!(removed.relation_changed);
    assert_eq!(removed.favorites_count, 0);

    let missing = repo.add_favorite(ArticleId::new(999), bob).await;
    assert!(matches!(missing, Err(BlogError::ArticleNotFound)));
}

#[sqlx::test(migrations = "../../../database/migrations")]
#[ignore = "requires DATABASE_URL"]
async fn test_delete_article_cascades(pool: PgPool) {
    let repo = PgBlogRepository::new(pool);
    let alice = user(&repo, "alice").await;
    let bob = user(&repo, "bob").await;
    let id = article(&repo, alice, "Hello", &["intro"]).await;

    let comment = CommentRepository::create(
        &repo,
        NewComment {
            article_id: id,
            author_id: bob,
            body: "Nice".to_string(),
        },
    )
    .await
    .unwrap();
    repo.add_favorite(id, bob).await.unwrap();

    ArticleRepository::delete(&repo, id).await.unwrap();

    assert!(matches!(
        ArticleRepository::find_by_id(&repo, id).await,
        Err(BlogError::ArticleNotFound)
    ));
    assert!(matches!(
        CommentRepository::find_by_id(&repo, comment.id).await,
        Err(BlogError::CommentNotFound)
    ));
    assert!(!repo.is_favorited(id, Some(bob)).await.unwrap());
}

#[sqlx::test(migrations = "../../../database/migrations")]
#[ignore = "requires DATABASE_URL"]
async fn test_article_patch_and_comment_order(pool: PgPool) {
    let repo = PgBlogRepository::new(pool);
    let alice = user(&repo, "alice").await;
    let id = article(&repo, alice, "Hello", &["intro"]).await;

    let patch = ArticlePatch {
        title: Some("Hello again".to_string()),
        description: None,
        body: None,
    };
    let updated = ArticleRepository::update(&repo, id, &patch).await.unwrap();
    assert_eq!(updated.title, "Hello again");
    assert_eq!(updated.body, "body");

    for body in ["first", "second"] {
        CommentRepository::create(
            &repo,
            NewComment {
                article_id: id,
                author_id: alice,
                body: body.to_string(),
            },
        )
        .await
        .unwrap();
    }

    let bodies: Vec<String> = repo
        .list_for_article(id)
        .await
        .unwrap()
        .into_iter()
        .map(|c| c.body)
        .collect();
    assert_eq!(bodies, vec!["first".to_string(), "second".to_string()]);
}

#[sqlx::test(migrations = "../../../database/migrations")]
#[ignore = "requires DATABASE_URL"]
async fn test_concurrent_duplicate_favorites_conflict(pool: PgPool) {
    let repo = PgBlogRepository::new(pool);
    let alice = user(&repo, "alice").await;
    let bob = user(&repo, "bob").await;
    let id = article(&repo, alice, "Hello", &["intro"]).await;

    let uc = Arc::new(ArticleUseCase::new(Arc::new(repo.clone())));
    let handles: Vec<_> = (0..16)
        .map(|_| {
            let uc = uc.clone();
            tokio::spawn(async move { uc.favorite(bob, id).await })
        })
        .collect();

    let mut ok = 0;
    let mut conflicts = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(_) => ok += 1,
            Err(BlogError::AlreadyFavorited) => conflicts += 1,
            Err(other) => panic!("unexpected error: {other}"),
        }
    }

    assert_eq!(ok, 1);
    assert_eq!(conflicts, 15);
    let stored = ArticleRepository::find_by_id(&repo, id).await.unwrap();
    assert_eq!(stored.favorites_count, 1);
}

#[sqlx::test(migrations = "../../../database/migrations")]
#[ignore = "requires DATABASE_URL"]
async fn test_concurrent_duplicate_follows_conflict(pool: PgPool) {
    let repo = PgBlogRepository::new(pool);
    let alice = user(&repo, "alice").await;
    user(&repo, "bob").await;

    let uc = Arc::new(ProfileUseCase::new(Arc::new(repo.clone())));
    let handles: Vec<_> = (0..8)
        .map(|_| {
            let uc = uc.clone();
            tokio::spawn(async move { uc.follow(alice, "bob").await })
        })
        .collect();

    let mut ok = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(_) => ok += 1,
            Err(BlogError::AlreadyFollowing) => {}
            Err(other) => panic!("unexpected error: {other}"),
        }
    }

    assert_eq!(ok, 1);
}
