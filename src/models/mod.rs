use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub age: Option<i32>,
    pub email: String,
    pub password_hash: String,
    pub avatar: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Public view of a user, safe to embed in feed items and auth responses.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UserSummary {
    pub id: Uuid,
    pub name: String,
    pub age: Option<i32>,
    pub email: Option<String>,
    pub avatar: Option<String>,
}

impl From<User> for UserSummary {
    fn from(user: User) -> Self {
        UserSummary {
            id: user.id,
            name: user.name,
            age: user.age,
            email: Some(user.email),
            avatar: user.avatar,
        }
    }
}

/// What a post primarily carries. Stored as an INT column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::Type)]
#[repr(i32)]
pub enum PostKind {
    Text = 0,
    Image = 1,
    Video = 2,
}

impl PostKind {
    pub fn classify(has_video: bool, has_images: bool) -> Self {
        if has_video {
            PostKind::Video
        } else if has_images {
            PostKind::Image
        } else {
            PostKind::Text
        }
    }
}

/// A user's current disposition toward a post. "No reaction" is the absence
/// of a post_interactions row, so it has no variant here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::Type)]
#[repr(i32)]
pub enum Reaction {
    Like = 1,
    Dislike = 2,
}

#[derive(Debug, Clone, FromRow)]
pub struct Post {
    pub id: Uuid,
    pub user_id: Uuid,
    pub content: String,
    /// JSON-encoded array of media references; decode with [`decode_image_refs`].
    pub images: Option<String>,
    pub video_url: Option<String>,
    pub likes_count: i32,
    pub unlikes_count: i32,
    pub comments_count: i32,
    pub post_kind: PostKind,
    pub category_id: Option<i32>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, FromRow)]
pub struct Interaction {
    pub id: Uuid,
    pub user_id: Uuid,
    pub post_id: Uuid,
    pub reaction: Reaction,
    pub updated_at: DateTime<Utc>,
}

/// Encode an ordered list of media references into the opaque blob stored on
/// the posts row. An empty list is stored as NULL.
pub fn encode_image_refs(refs: &[String]) -> Option<String> {
    if refs.is_empty() {
        return None;
    }
    serde_json::to_string(refs).ok()
}

/// Decode the stored blob back into an ordered list. NULL, empty and
/// malformed blobs all decode to an empty list, never an error.
pub fn decode_image_refs(raw: Option<&str>) -> Vec<String> {
    match raw {
        Some(blob) if !blob.trim().is_empty() => serde_json::from_str(blob).unwrap_or_default(),
        _ => Vec::new(),
    }
}
