/// User endpoints: registration, login and profile CRUD
use actix_web::{web, HttpResponse};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;
use validator::Validate;

use crate::db::user_repo;
use crate::error::{is_unique_violation, AppError, Result};
use crate::models::UserSummary;
use crate::security::jwt::JwtSigner;
use crate::security::password;

#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    #[validate(length(min = 1, max = 50))]
    pub name: String,
    pub age: Option<i32>,
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 8))]
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct AuthResponse {
    #[serde(flatten)]
    pub user: UserSummary,
    pub token: String,
}

#[derive(Debug, Deserialize)]
pub struct UpdateUserRequest {
    pub name: Option<String>,
    pub age: Option<i32>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub avatar: Option<String>,
}

/// Register a new user
/// POST /users
pub async fn register(
    pool: web::Data<PgPool>,
    signer: web::Data<JwtSigner>,
    req: web::Json<RegisterRequest>,
) -> Result<HttpResponse> {
    req.validate()?;

    if user_repo::email_exists(&pool, &req.email).await? {
        return Err(AppError::Conflict("email already registered".to_string()));
    }

    let password_hash = password::hash_password(&req.password)?;

    let user = match user_repo::create_user(&pool, &req.name, req.age, &req.email, &password_hash)
        .await
    {
        Ok(user) => user,
        // Registration raced another request for the same email
        Err(e) if is_unique_violation(&e) => {
            return Err(AppError::Conflict("email already registered".to_string()))
        }
        Err(e) => return Err(e.into()),
    };

    let token = signer.issue(user.id)?;

    tracing::info!(user_id = %user.id, "user registered");

    Ok(HttpResponse::Created().json(AuthResponse {
        user: user.into(),
        token,
    }))
}

/// Exchange credentials for a token
/// POST /login
pub async fn login(
    pool: web::Data<PgPool>,
    signer: web::Data<JwtSigner>,
    req: web::Json<LoginRequest>,
) -> Result<HttpResponse> {
    let user = user_repo::find_by_email(&pool, &req.email)
        .await?
        .ok_or_else(|| AppError::Authentication("invalid credentials".to_string()))?;

    if !password::verify_password(&req.password, &user.password_hash)? {
        return Err(AppError::Authentication("invalid credentials".to_string()));
    }

    let token = signer.issue(user.id)?;

    Ok(HttpResponse::Ok().json(AuthResponse {
        user: user.into(),
        token,
    }))
}

/// List all users
/// GET /users
pub async fn list_users(pool: web::Data<PgPool>) -> Result<HttpResponse> {
    let users = user_repo::list_users(&pool).await?;
    let summaries: Vec<UserSummary> = users.into_iter().map(UserSummary::from).collect();

    Ok(HttpResponse::Ok().json(summaries))
}

/// Fetch one user
/// GET /users/{id}
pub async fn get_user(pool: web::Data<PgPool>, path: web::Path<Uuid>) -> Result<HttpResponse> {
    let user = user_repo::find_by_id(&pool, *path)
        .await?
        .ok_or_else(|| AppError::NotFound("user not found".to_string()))?;

    Ok(HttpResponse::Ok().json(UserSummary::from(user)))
}

/// Partial profile update; blank fields are ignored
/// PUT /users/{id}
pub async fn update_user(
    pool: web::Data<PgPool>,
    path: web::Path<Uuid>,
    req: web::Json<UpdateUserRequest>,
) -> Result<HttpResponse> {
    let req = req.into_inner();

    let name = req.name.as_deref().filter(|s| !s.trim().is_empty());
    let email = req.email.as_deref().filter(|s| !s.trim().is_empty());
    let avatar = req.avatar.as_deref().filter(|s| !s.trim().is_empty());
    // age 0 means "leave unchanged", a contract kept for existing clients
    let age = req.age.filter(|a| *a != 0);

    let password_hash = match req.password.as_deref().filter(|s| !s.trim().is_empty()) {
        Some(raw) => Some(password::hash_password(raw)?),
        None => None,
    };

    let user = user_repo::update_user(
        &pool,
        *path,
        name,
        age,
        email,
        password_hash.as_deref(),
        avatar,
    )
    .await?
    .ok_or_else(|| AppError::NotFound("user not found".to_string()))?;

    Ok(HttpResponse::Ok().json(UserSummary::from(user)))
}

/// Delete a user
/// DELETE /users/{id}
pub async fn delete_user(pool: web::Data<PgPool>, path: web::Path<Uuid>) -> Result<HttpResponse> {
    if user_repo::delete_user(&pool, *path).await? {
        Ok(HttpResponse::NoContent().finish())
    } else {
        Err(AppError::NotFound("user not found".to_string()))
    }
}
