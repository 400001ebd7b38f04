/// Feed assembly: paginated posts enriched with author summaries and,
/// when a viewer is known, their current reaction flags.
use crate::db::{interaction_repo, post_repo, user_repo};
use crate::error::Result;
use crate::models::{decode_image_refs, Post, Reaction, UserSummary};
use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::PgPool;
use uuid::Uuid;

pub const DEFAULT_PAGE: i64 = 0;
pub const DEFAULT_LIMIT: i64 = 10;

#[derive(Debug, Serialize)]
pub struct FeedItem {
    pub id: Uuid,
    pub author: Option<UserSummary>,
    pub content: String,
    pub images: Vec<String>,
    pub video_url: Option<String>,
    pub likes_count: i32,
    pub unlikes_count: i32,
    pub comments_count: i32,
    pub post_kind: i32,
    pub category_id: Option<i32>,
    pub viewer_liked: bool,
    pub viewer_disliked: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Clone)]
pub struct FeedService {
    pool: PgPool,
}

impl FeedService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Assemble one feed page. `category_id = 0` means "no category filter",
    /// matching the clients this API grew up with. Ordering comes from the
    /// post store (newest first) and is preserved.
    pub async fn get_feed(
        &self,
        viewer_id: Option<Uuid>,
        filter_user_id: Option<Uuid>,
        category_id: Option<i32>,
        page: Option<i64>,
        limit: Option<i64>,
    ) -> Result<Vec<FeedItem>> {
        let page = page.unwrap_or(DEFAULT_PAGE).max(0);
        let limit = limit.unwrap_or(DEFAULT_LIMIT).max(0);
        let category = category_id.filter(|c| *c != 0);

        let posts =
            post_repo::list_page(&self.pool, filter_user_id, category, page, limit).await?;

        let mut items = Vec::with_capacity(posts.len());
        for post in posts {
            items.push(self.enrich(post, viewer_id).await?);
        }

        Ok(items)
    }

    // One author lookup and one interaction lookup per post. Fine at this
    // scale; batch variants are the upgrade path if feeds grow.
    async fn enrich(&self, post: Post, viewer_id: Option<Uuid>) -> Result<FeedItem> {
        let author = user_repo::find_by_id(&self.pool, post.user_id)
            .await?
            .map(UserSummary::from);

        let (viewer_liked, viewer_disliked) = match viewer_id {
            Some(viewer) => {
                let interaction =
                    interaction_repo::find_by_pair(&self.pool, viewer, post.id).await?;
                match interaction.map(|i| i.reaction) {
                    Some(Reaction::Like) => (true, false),
                    Some(Reaction::Dislike) => (false, true),
                    None => (false, false),
                }
            }
            None => (false, false),
        };

        Ok(FeedItem {
            id: post.id,
            author,
            content: post.content,
            images: decode_image_refs(post.images.as_deref()),
            video_url: post.video_url,
            likes_count: post.likes_count,
            unlikes_count: post.unlikes_count,
            comments_count: post.comments_count,
            post_kind: post.post_kind as i32,
            category_id: post.category_id,
            viewer_liked,
            viewer_disliked,
            created_at: post.created_at,
        })
    }
}
