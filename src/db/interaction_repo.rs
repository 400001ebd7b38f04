/// Interaction repository - one row per (user, post) pair
///
/// The pair is protected by a UNIQUE constraint; callers treat a 23505
/// violation on insert as "already reacted", not as a storage failure.
use crate::models::{Interaction, Reaction};
use chrono::Utc;
use sqlx::{PgConnection, PgPool};
use uuid::Uuid;

pub async fn find_by_pair(
    pool: &PgPool,
    user_id: Uuid,
    post_id: Uuid,
) -> Result<Option<Interaction>, sqlx::Error> {
    sqlx::query_as::<_, Interaction>(
        r#"
        SELECT id, user_id, post_id, reaction, updated_at
        FROM post_interactions
        WHERE user_id = $1 AND post_id = $2
        "#,
    )
    .bind(user_id)
    .bind(post_id)
    .fetch_optional(pool)
    .await
}

/// Pair lookup with a row lock, serializing concurrent reactions on the same
/// (user, post) pair for the duration of the transaction.
pub async fn find_by_pair_for_update(
    conn: &mut PgConnection,
    user_id: Uuid,
    post_id: Uuid,
) -> Result<Option<Interaction>, sqlx::Error> {
    sqlx::query_as::<_, Interaction>(
        r#"
        SELECT id, user_id, post_id, reaction, updated_at
        FROM post_interactions
        WHERE user_id = $1 AND post_id = $2
        FOR UPDATE
        "#,
    )
    .bind(user_id)
    .bind(post_id)
    .fetch_optional(conn)
    .await
}

pub async fn insert(
    conn: &mut PgConnection,
    user_id: Uuid,
    post_id: Uuid,
    reaction: Reaction,
) -> Result<Interaction, sqlx::Error> {
    let id = Uuid::new_v4();
    let now = Utc::now();

    sqlx::query_as::<_, Interaction>(
        r#"
        INSERT INTO post_interactions (id, user_id, post_id, reaction, updated_at)
        VALUES ($1, $2, $3, $4, $5)
        RETURNING id, user_id, post_id, reaction, updated_at
        "#,
    )
    .bind(id)
    .bind(user_id)
    .bind(post_id)
    .bind(reaction)
    .bind(now)
    .fetch_one(conn)
    .await
}

pub async fn set_reaction(
    conn: &mut PgConnection,
    interaction_id: Uuid,
    reaction: Reaction,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        UPDATE post_interactions
        SET reaction = $1, updated_at = $2
        WHERE id = $3
        "#,
    )
    .bind(reaction)
    .bind(Utc::now())
    .bind(interaction_id)
    .execute(conn)
    .await?;

    Ok(())
}

pub async fn delete(conn: &mut PgConnection, interaction_id: Uuid) -> Result<(), sqlx::Error> {
    sqlx::query("DELETE FROM post_interactions WHERE id = $1")
        .bind(interaction_id)
        .execute(conn)
        .await?;

    Ok(())
}

/// True ledger count for a post and reaction, for reconciliation checks.
pub async fn count_by_post_and_reaction(
    pool: &PgPool,
    post_id: Uuid,
    reaction: Reaction,
) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar::<_, i64>(
        r#"
        SELECT COUNT(*) FROM post_interactions
        WHERE post_id = $1 AND reaction = $2
        "#,
    )
    .bind(post_id)
    .bind(reaction)
    .fetch_one(pool)
    .await
}
