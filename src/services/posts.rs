/// Post submission rules
use crate::db::{post_repo, user_repo};
use crate::error::{AppError, Result};
use crate::models::{encode_image_refs, Post, PostKind};
use sqlx::PgPool;
use uuid::Uuid;

/// A fully-received submission: text plus stored media references.
#[derive(Debug, Clone, Default)]
pub struct NewPost {
    pub content: String,
    pub image_refs: Vec<String>,
    pub video_ref: Option<String>,
    pub category_id: Option<i32>,
}

#[derive(Clone)]
pub struct PostService {
    pool: PgPool,
}

impl PostService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create a post for an existing author. A submission must carry text or
    /// at least one media reference; counters start at zero.
    pub async fn create(&self, author_id: Uuid, new_post: NewPost) -> Result<Post> {
        if user_repo::find_by_id(&self.pool, author_id).await?.is_none() {
            return Err(AppError::NotFound("user not found".to_string()));
        }

        let has_video = new_post.video_ref.is_some();
        let has_images = !new_post.image_refs.is_empty();

        if new_post.content.trim().is_empty() && !has_images && !has_video {
            return Err(AppError::Validation(
                "post needs text content or at least one media file".to_string(),
            ));
        }

        let kind = PostKind::classify(has_video, has_images);
        let images = encode_image_refs(&new_post.image_refs);

        let post = post_repo::create_post(
            &self.pool,
            author_id,
            &new_post.content,
            images.as_deref(),
            new_post.video_ref.as_deref(),
            kind,
            new_post.category_id,
        )
        .await?;

        tracing::info!(post_id = %post.id, author_id = %author_id, kind = ?kind, "post created");

        Ok(post)
    }
}
