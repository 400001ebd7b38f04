/// Reaction endpoints: the like/dislike toggles per (user, post) pair
///
/// All four take the pair in the path and answer a success boolean; unknown
/// user or post is a 404, repeating the current reaction a 409.
use actix_web::{web, HttpResponse};
use serde::Serialize;
use uuid::Uuid;

use crate::error::Result;
use crate::services::ReactionService;

#[derive(Debug, Serialize)]
pub struct ReactionResponse {
    pub success: bool,
}

/// POST /posts/{post_id}/like/{user_id}
pub async fn like_post(
    reactions: web::Data<ReactionService>,
    path: web::Path<(Uuid, Uuid)>,
) -> Result<HttpResponse> {
    let (post_id, user_id) = path.into_inner();
    reactions.like(user_id, post_id).await?;

    Ok(HttpResponse::Ok().json(ReactionResponse { success: true }))
}

/// DELETE /posts/{post_id}/like/{user_id}
pub async fn unlike_post(
    reactions: web::Data<ReactionService>,
    path: web::Path<(Uuid, Uuid)>,
) -> Result<HttpResponse> {
    let (post_id, user_id) = path.into_inner();
    reactions.unlike(user_id, post_id).await?;

    Ok(HttpResponse::Ok().json(ReactionResponse { success: true }))
}

/// POST /posts/{post_id}/dislike/{user_id}
pub async fn dislike_post(
    reactions: web::Data<ReactionService>,
    path: web::Path<(Uuid, Uuid)>,
) -> Result<HttpResponse> {
    let (post_id, user_id) = path.into_inner();
    reactions.dislike(user_id, post_id).await?;

    Ok(HttpResponse::Ok().json(ReactionResponse { success: true }))
}

/// DELETE /posts/{post_id}/dislike/{user_id}
pub async fn undislike_post(
    reactions: web::Data<ReactionService>,
    path: web::Path<(Uuid, Uuid)>,
) -> Result<HttpResponse> {
    let (post_id, user_id) = path.into_inner();
    reactions.undislike(user_id, post_id).await?;

    Ok(HttpResponse::Ok().json(ReactionResponse { success: true }))
}
