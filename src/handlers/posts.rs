/// Post endpoints: multipart submission and the feed listing
use actix_multipart::{Field, Multipart};
use actix_web::{web, HttpResponse};
use futures_util::StreamExt;
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use tokio::io::AsyncWriteExt;
use uuid::Uuid;

use crate::db::user_repo;
use crate::error::{AppError, Result};
use crate::services::{FeedService, MediaStore, NewPost, PostService};

/// Posts carry at most this many images; extras are ignored.
const MAX_IMAGES_PER_POST: usize = 9;

#[derive(Debug, Serialize)]
pub struct CreatePostResponse {
    pub id: Uuid,
}

#[derive(Debug, Deserialize)]
pub struct FeedQuery {
    pub viewer_id: Option<Uuid>,
    pub user_id: Option<Uuid>,
    pub category_id: Option<i32>,
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

/// Create a post from a multipart submission
/// POST /posts/{user_id}
///
/// Text arrives in the `textContent` field; files are classified by their
/// declared content type (images in order, first video wins).
pub async fn create_post(
    pool: web::Data<PgPool>,
    media: web::Data<MediaStore>,
    post_service: web::Data<PostService>,
    path: web::Path<Uuid>,
    mut payload: Multipart,
) -> Result<HttpResponse> {
    let user_id = path.into_inner();

    if user_repo::find_by_id(&pool, user_id).await?.is_none() {
        return Err(AppError::NotFound("user not found".to_string()));
    }

    let mut content = String::new();
    let mut category_id: Option<i32> = None;
    let mut image_refs: Vec<String> = Vec::new();
    let mut video_ref: Option<String> = None;

    while let Some(item) = payload.next().await {
        let mut field =
            item.map_err(|e| AppError::BadRequest(format!("multipart error: {}", e)))?;

        let disposition = field.content_disposition();
        let field_name = disposition
            .and_then(|cd| cd.get_name())
            .unwrap_or("")
            .to_string();
        let file_name = disposition
            .and_then(|cd| cd.get_filename())
            .map(|s| s.to_string());
        let content_type = field.content_type().map(|m| m.essence_str().to_string());

        if file_name.is_none() {
            let value = read_field_string(&mut field).await?;
            match field_name.as_str() {
                "textContent" => content = value,
                "category_id" => category_id = value.trim().parse().ok(),
                _ => {}
            }
            continue;
        }

        match content_type.as_deref() {
            Some(ct) if ct.starts_with("image/") => {
                if image_refs.len() >= MAX_IMAGES_PER_POST {
                    tracing::warn!(?file_name, "image limit reached, ignoring extra image");
                    drain_field(&mut field).await?;
                    continue;
                }
                let reference = store_field(&media, file_name.as_deref(), &mut field).await?;
                image_refs.push(reference);
            }
            Some(ct) if ct.starts_with("video/") => {
                if video_ref.is_some() {
                    tracing::warn!(?file_name, "video already attached, ignoring extra video");
                    drain_field(&mut field).await?;
                    continue;
                }
                video_ref = Some(store_field(&media, file_name.as_deref(), &mut field).await?);
            }
            other => {
                tracing::warn!(content_type = ?other, ?file_name, "unsupported file type ignored");
                drain_field(&mut field).await?;
            }
        }
    }

    let post = post_service
        .create(
            user_id,
            NewPost {
                content,
                image_refs,
                video_ref,
                category_id,
            },
        )
        .await?;

    Ok(HttpResponse::Ok().json(CreatePostResponse { id: post.id }))
}

/// List the feed
/// GET /posts?viewer_id&user_id&category_id&page&limit
pub async fn get_feed(
    feed: web::Data<FeedService>,
    query: web::Query<FeedQuery>,
) -> Result<HttpResponse> {
    let q = query.into_inner();
    let items = feed
        .get_feed(q.viewer_id, q.user_id, q.category_id, q.page, q.limit)
        .await?;

    Ok(HttpResponse::Ok().json(items))
}

async fn read_field_string(field: &mut Field) -> Result<String> {
    let mut data = Vec::new();
    while let Some(chunk) = field.next().await {
        let bytes =
            chunk.map_err(|e| AppError::BadRequest(format!("multipart read error: {}", e)))?;
        data.extend_from_slice(&bytes);
    }

    Ok(String::from_utf8_lossy(&data).into_owned())
}

async fn drain_field(field: &mut Field) -> Result<()> {
    while let Some(chunk) = field.next().await {
        chunk.map_err(|e| AppError::BadRequest(format!("multipart read error: {}", e)))?;
    }

    Ok(())
}

async fn store_field(
    media: &MediaStore,
    original_name: Option<&str>,
    field: &mut Field,
) -> Result<String> {
    let (mut file, reference) = media.create(original_name).await?;

    while let Some(chunk) = field.next().await {
        let bytes =
            chunk.map_err(|e| AppError::BadRequest(format!("multipart read error: {}", e)))?;
        file.write_all(&bytes)
            .await
            .map_err(|e| AppError::Internal(format!("failed to write upload: {}", e)))?;
    }

    file.flush()
        .await
        .map_err(|e| AppError::Internal(format!("failed to flush upload: {}", e)))?;

    Ok(reference)
}
