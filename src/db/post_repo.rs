/// Post repository - post rows and their engagement counters
use crate::models::{Post, PostKind};
use chrono::Utc;
use sqlx::{PgConnection, PgPool};
use uuid::Uuid;

pub async fn create_post(
    pool: &PgPool,
    user_id: Uuid,
    content: &str,
    images: Option<&str>,
    video_url: Option<&str>,
    post_kind: PostKind,
    category_id: Option<i32>,
) -> Result<Post, sqlx::Error> {
    let id = Uuid::new_v4();
    let now = Utc::now();

    sqlx::query_as::<_, Post>(
        r#"
        INSERT INTO posts (id, user_id, content, images, video_url, post_kind, category_id, created_at)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
        RETURNING id, user_id, content, images, video_url, likes_count, unlikes_count,
                  comments_count, post_kind, category_id, created_at
        "#,
    )
    .bind(id)
    .bind(user_id)
    .bind(content)
    .bind(images)
    .bind(video_url)
    .bind(post_kind)
    .bind(category_id)
    .bind(now)
    .fetch_one(pool)
    .await
}

pub async fn find_post_by_id(pool: &PgPool, post_id: Uuid) -> Result<Option<Post>, sqlx::Error> {
    sqlx::query_as::<_, Post>(
        r#"
        SELECT id, user_id, content, images, video_url, likes_count, unlikes_count,
               comments_count, post_kind, category_id, created_at
        FROM posts
        WHERE id = $1
        "#,
    )
    .bind(post_id)
    .fetch_optional(pool)
    .await
}

/// Same lookup on a bare connection, for use inside the reaction transaction.
pub async fn find_post_on(
    conn: &mut PgConnection,
    post_id: Uuid,
) -> Result<Option<Post>, sqlx::Error> {
    sqlx::query_as::<_, Post>(
        r#"
        SELECT id, user_id, content, images, video_url, likes_count, unlikes_count,
               comments_count, post_kind, category_id, created_at
        FROM posts
        WHERE id = $1
        "#,
    )
    .bind(post_id)
    .fetch_optional(conn)
    .await
}

/// One feed page, newest first. Filters are optional; a NULL bind disables
/// the corresponding predicate.
pub async fn list_page(
    pool: &PgPool,
    filter_user_id: Option<Uuid>,
    filter_category_id: Option<i32>,
    page: i64,
    limit: i64,
) -> Result<Vec<Post>, sqlx::Error> {
    sqlx::query_as::<_, Post>(
        r#"
        SELECT id, user_id, content, images, video_url, likes_count, unlikes_count,
               comments_count, post_kind, category_id, created_at
        FROM posts
        WHERE ($1::uuid IS NULL OR user_id = $1)
          AND ($2::int4 IS NULL OR category_id = $2)
        ORDER BY created_at DESC
        LIMIT $3 OFFSET $4
        "#,
    )
    .bind(filter_user_id)
    .bind(filter_category_id)
    .bind(limit)
    .bind(page * limit)
    .fetch_all(pool)
    .await
}

// Counter mutations below are invoked only by the reaction service, inside
// its transaction. Decrements are floored at zero per operation.

pub async fn increment_likes(conn: &mut PgConnection, post_id: Uuid) -> Result<(), sqlx::Error> {
    sqlx::query("UPDATE posts SET likes_count = likes_count + 1 WHERE id = $1")
        .bind(post_id)
        .execute(conn)
        .await?;

    Ok(())
}

pub async fn decrement_likes(conn: &mut PgConnection, post_id: Uuid) -> Result<(), sqlx::Error> {
    sqlx::query("UPDATE posts SET likes_count = GREATEST(likes_count - 1, 0) WHERE id = $1")
        .bind(post_id)
        .execute(conn)
        .await?;

    Ok(())
}

pub async fn increment_unlikes(conn: &mut PgConnection, post_id: Uuid) -> Result<(), sqlx::Error> {
    sqlx::query("UPDATE posts SET unlikes_count = unlikes_count + 1 WHERE id = $1")
        .bind(post_id)
        .execute(conn)
        .await?;

    Ok(())
}

pub async fn decrement_unlikes(conn: &mut PgConnection, post_id: Uuid) -> Result<(), sqlx::Error> {
    sqlx::query("UPDATE posts SET unlikes_count = GREATEST(unlikes_count - 1, 0) WHERE id = $1")
        .bind(post_id)
        .execute(conn)
        .await?;

    Ok(())
}
