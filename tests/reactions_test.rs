/// Integration tests for the reaction ledger
///
/// These exercise the real state machine against PostgreSQL and are ignored
/// by default; run them with `cargo test -- --ignored` and a DATABASE_URL.
mod common;

use common::fixtures;
use feed_service::db::interaction_repo;
use feed_service::error::AppError;
use feed_service::models::Reaction;
use feed_service::services::ReactionService;
use uuid::Uuid;

#[tokio::test]
#[ignore = "requires PostgreSQL (set DATABASE_URL)"]
async fn first_like_succeeds_second_conflicts() {
    let pool = fixtures::create_test_pool().await;
    fixtures::cleanup_test_data(&pool).await;

    let user = fixtures::create_test_user(&pool, "liker@example.com").await;
    let post = fixtures::create_test_post(&pool, user.id, "hello").await;

    let reactions = ReactionService::new(pool.clone());

    reactions.like(user.id, post.id).await.expect("first like");
    assert_eq!(fixtures::counters(&pool, post.id).await, (1, 0));

    let err = reactions
        .like(user.id, post.id)
        .await
        .expect_err("second like should fail");
    assert!(matches!(err, AppError::Conflict(_)));

    // Counter unchanged by the rejected repeat
    assert_eq!(fixtures::counters(&pool, post.id).await, (1, 0));

    fixtures::cleanup_test_data(&pool).await;
}

#[tokio::test]
#[ignore = "requires PostgreSQL (set DATABASE_URL)"]
async fn dislike_to_like_swaps_counters_and_keeps_one_row() {
    let pool = fixtures::create_test_pool().await;
    fixtures::cleanup_test_data(&pool).await;

    let user = fixtures::create_test_user(&pool, "swapper@example.com").await;
    let post = fixtures::create_test_post(&pool, user.id, "hello").await;

    let reactions = ReactionService::new(pool.clone());

    reactions.dislike(user.id, post.id).await.expect("dislike");
    assert_eq!(fixtures::counters(&pool, post.id).await, (0, 1));

    reactions.like(user.id, post.id).await.expect("like");
    assert_eq!(fixtures::counters(&pool, post.id).await, (1, 0));

    let row = interaction_repo::find_by_pair(&pool, user.id, post.id)
        .await
        .expect("pair lookup")
        .expect("exactly one interaction row remains");
    assert_eq!(row.reaction, Reaction::Like);

    fixtures::cleanup_test_data(&pool).await;
}

#[tokio::test]
#[ignore = "requires PostgreSQL (set DATABASE_URL)"]
async fn unlike_without_prior_like_keeps_row_and_floors_counter() {
    let pool = fixtures::create_test_pool().await;
    fixtures::cleanup_test_data(&pool).await;

    let user = fixtures::create_test_user(&pool, "floor@example.com").await;
    let post = fixtures::create_test_post(&pool, user.id, "hello").await;

    let reactions = ReactionService::new(pool.clone());

    // No prior interaction: the operation succeeds, creates no row, and the
    // floored decrement leaves the counter at zero.
    reactions.unlike(user.id, post.id).await.expect("unlike");
    assert_eq!(fixtures::counters(&pool, post.id).await, (0, 0));
    assert!(interaction_repo::find_by_pair(&pool, user.id, post.id)
        .await
        .expect("pair lookup")
        .is_none());

    // With an existing Dislike row, unlike leaves the row untouched.
    reactions.dislike(user.id, post.id).await.expect("dislike");
    reactions.unlike(user.id, post.id).await.expect("unlike again");

    let row = interaction_repo::find_by_pair(&pool, user.id, post.id)
        .await
        .expect("pair lookup")
        .expect("dislike row should survive");
    assert_eq!(row.reaction, Reaction::Dislike);
    assert_eq!(fixtures::counters(&pool, post.id).await, (0, 1));

    fixtures::cleanup_test_data(&pool).await;
}

#[tokio::test]
#[ignore = "requires PostgreSQL (set DATABASE_URL)"]
async fn unlike_after_like_removes_the_row() {
    let pool = fixtures::create_test_pool().await;
    fixtures::cleanup_test_data(&pool).await;

    let user = fixtures::create_test_user(&pool, "undo@example.com").await;
    let post = fixtures::create_test_post(&pool, user.id, "hello").await;

    let reactions = ReactionService::new(pool.clone());

    reactions.like(user.id, post.id).await.expect("like");
    reactions.unlike(user.id, post.id).await.expect("unlike");

    assert_eq!(fixtures::counters(&pool, post.id).await, (0, 0));
    assert!(interaction_repo::find_by_pair(&pool, user.id, post.id)
        .await
        .expect("pair lookup")
        .is_none());

    fixtures::cleanup_test_data(&pool).await;
}

#[tokio::test]
#[ignore = "requires PostgreSQL (set DATABASE_URL)"]
async fn counters_track_ledger_across_users() {
    let pool = fixtures::create_test_pool().await;
    fixtures::cleanup_test_data(&pool).await;

    let author = fixtures::create_test_user(&pool, "author@example.com").await;
    let alice = fixtures::create_test_user(&pool, "alice@example.com").await;
    let bob = fixtures::create_test_user(&pool, "bob@example.com").await;
    let post = fixtures::create_test_post(&pool, author.id, "popular").await;

    let reactions = ReactionService::new(pool.clone());

    reactions.like(alice.id, post.id).await.expect("alice likes");
    reactions.like(bob.id, post.id).await.expect("bob likes");
    reactions.dislike(alice.id, post.id).await.expect("alice flips to dislike");
    reactions.undislike(alice.id, post.id).await.expect("alice clears");

    let likes = interaction_repo::count_by_post_and_reaction(&pool, post.id, Reaction::Like)
        .await
        .expect("like count");
    let dislikes = interaction_repo::count_by_post_and_reaction(&pool, post.id, Reaction::Dislike)
        .await
        .expect("dislike count");

    let (likes_count, unlikes_count) = fixtures::counters(&pool, post.id).await;
    assert_eq!(likes_count as i64, likes);
    assert_eq!(unlikes_count as i64, dislikes);
    assert_eq!((likes_count, unlikes_count), (1, 0));

    fixtures::cleanup_test_data(&pool).await;
}

#[tokio::test]
#[ignore = "requires PostgreSQL (set DATABASE_URL)"]
async fn reactions_on_unknown_user_or_post_are_not_found() {
    let pool = fixtures::create_test_pool().await;
    fixtures::cleanup_test_data(&pool).await;

    let user = fixtures::create_test_user(&pool, "ghosts@example.com").await;
    let post = fixtures::create_test_post(&pool, user.id, "hello").await;

    let reactions = ReactionService::new(pool.clone());

    let err = reactions
        .like(user.id, Uuid::new_v4())
        .await
        .expect_err("unknown post");
    assert!(matches!(err, AppError::NotFound(_)));

    let err = reactions
        .like(Uuid::new_v4(), post.id)
        .await
        .expect_err("unknown user");
    assert!(matches!(err, AppError::NotFound(_)));

    assert_eq!(fixtures::counters(&pool, post.id).await, (0, 0));

    fixtures::cleanup_test_data(&pool).await;
}
